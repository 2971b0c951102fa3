// src/replay.rs
//
// Recorded landmark sessions. Stands in for a live pose detector: each
// session file is a JSON array of frames, one frame per detector call.
//
// A frame is either positional (detector order, `null` for a joint that
// was not reported):
//     [[0.51, 0.22, 0.98], [0.50, 0.20], null, ...]
// or keyed by joint name:
//     {"left_hip": {"x": 0.5, "y": 0.5, "visibility": 0.9}, ...}
// Missing visibility defaults to 1.0.

use crate::detection::{RepCounter, RepUpdate, SessionStatistics};
use crate::error::{RepCounterError, Result};
use crate::landmarks::{LandmarkName, LandmarkSet};
use crate::types::{Landmark, ReplayConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FrameRecord {
    Indexed(Vec<Option<Vec<f64>>>),
    Named(HashMap<String, Landmark>),
}

impl FrameRecord {
    fn into_landmarks(self, frame_index: usize) -> LandmarkSet {
        match self {
            FrameRecord::Indexed(entries) => {
                let mut set = LandmarkSet::new();
                for (i, entry) in entries.into_iter().enumerate() {
                    let Some(values) = entry else { continue };
                    let Some(name) = LandmarkName::from_index(i) else {
                        break;
                    };
                    match values.as_slice() {
                        [x, y] => set.insert(name, Landmark::new(*x, *y, 1.0)),
                        [x, y, visibility, ..] => {
                            set.insert(name, Landmark::new(*x, *y, *visibility))
                        }
                        _ => warn!(
                            "Frame {}: {} has {} values, expected 2 or 3",
                            frame_index,
                            name,
                            values.len()
                        ),
                    }
                }
                set
            }
            FrameRecord::Named(joints) => LandmarkSet::from_named(
                joints
                    .iter()
                    .map(|(name, landmark)| (name.as_str(), *landmark)),
            ),
        }
    }
}

/// Parses a session document into per-frame landmark sets.
pub fn parse_session(json: &str) -> Result<Vec<LandmarkSet>> {
    let records: Vec<FrameRecord> = serde_json::from_str(json)?;
    Ok(records
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_landmarks(i))
        .collect())
}

pub fn load_session(path: &Path) -> Result<Vec<LandmarkSet>> {
    let contents = fs::read_to_string(path).map_err(|source| RepCounterError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_session(&contents)
}

/// Feeds every frame through `counter`, returning the per-frame results.
pub fn replay(counter: &mut RepCounter, frames: &[LandmarkSet]) -> Vec<RepUpdate> {
    frames.iter().map(|frame| counter.update(frame)).collect()
}

pub struct SessionReplayer {
    config: ReplayConfig,
}

impl SessionReplayer {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    pub fn find_session_files(&self) -> Result<Vec<PathBuf>> {
        let mut sessions = Vec::new();

        for entry in WalkDir::new(&self.config.input_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || is_summary(path) {
                continue;
            }
            let is_json = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json {
                sessions.push(path.to_path_buf());
            }
        }

        info!(
            "Found {} session file(s) in {}",
            sessions.len(),
            self.config.input_dir
        );
        Ok(sessions)
    }

    /// Replays one file through `counter` after resetting it.
    pub fn replay_file(&self, path: &Path, counter: &mut RepCounter) -> Result<SessionStatistics> {
        let frames = load_session(path)?;
        info!("Replaying {} ({} frames)", path.display(), frames.len());

        counter.reset();
        replay(counter, &frames);
        Ok(counter.statistics())
    }

    /// Where the summary for `session` is written. The session's
    /// subdirectory under `input_dir` is mirrored under `output_dir`, so
    /// files sharing a stem in different folders keep separate summaries.
    pub fn summary_path(&self, session: &Path) -> PathBuf {
        let stem = session
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("session");
        let subdir = session
            .strip_prefix(&self.config.input_dir)
            .ok()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""));
        Path::new(&self.config.output_dir)
            .join(subdir)
            .join(format!("{stem}.summary.json"))
    }
}

fn is_summary(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".summary.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExercisePhase;

    #[test]
    fn test_parse_indexed_frame() {
        let frames = parse_session("[[[0.5, 0.1, 0.9], [0.4, 0.1], null, [0.1]]]").unwrap();
        assert_eq!(frames.len(), 1);

        let frame = &frames[0];
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(LandmarkName::Nose).unwrap().visibility, 0.9);
        assert_eq!(
            frame.get(LandmarkName::LeftEyeInner).unwrap().visibility,
            1.0
        );
        assert!(!frame.contains(LandmarkName::LeftEye));
        assert!(!frame.contains(LandmarkName::LeftEyeOuter));
    }

    #[test]
    fn test_parse_named_frame() {
        let json = r#"[{"left_ankle": {"x": 0.4, "y": 0.8}, "right_ankle": {"x": 0.6, "y": 0.8, "visibility": 0.7}}]"#;
        let frames = parse_session(json).unwrap();
        let frame = &frames[0];
        assert_eq!(frame.len(), 2);
        assert!(frame.usable(LandmarkName::RightAnkle).is_some());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_session("{\"frames\": 3}"),
            Err(RepCounterError::Json(_))
        ));
    }

    #[test]
    fn test_replay_jump_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("jumps.json");
        let frame = |y: f64| format!(r#"{{"left_ankle": {{"x": 0.4, "y": {y}}}, "right_ankle": {{"x": 0.6, "y": {y}}}}}"#);
        let frames: Vec<String> = [0.8, 0.8, 0.6, 0.9, 0.8, 0.6, 0.9, 0.8]
            .iter()
            .map(|y| frame(*y))
            .collect();
        fs::write(&session, format!("[{}]", frames.join(","))).unwrap();
        fs::write(dir.path().join("jumps.summary.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let replayer = SessionReplayer::new(ReplayConfig {
            input_dir: dir.path().to_string_lossy().into_owned(),
            output_dir: "out".to_string(),
            save_summaries: false,
        });
        let files = replayer.find_session_files().unwrap();
        assert_eq!(files, vec![session.clone()]);

        let mut counter = RepCounter::new("jump", 0.7).unwrap();
        let stats = replayer.replay_file(&session, &mut counter).unwrap();
        assert_eq!(stats.total_reps, 2);
        assert_eq!(stats.current_phase, ExercisePhase::Neutral);
        assert_eq!(stats.metrics.total_frames, 8);

        assert_eq!(
            replayer.summary_path(&session),
            Path::new("out").join("jumps.summary.json")
        );
    }

    #[test]
    fn test_same_stem_in_subdirectories_gets_distinct_summaries() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
            fs::write(dir.path().join(sub).join("s1.json"), "[]").unwrap();
        }

        let replayer = SessionReplayer::new(ReplayConfig {
            input_dir: dir.path().to_string_lossy().into_owned(),
            output_dir: "out".to_string(),
            save_summaries: true,
        });
        let files = replayer.find_session_files().unwrap();
        assert_eq!(files.len(), 2);

        let summaries: Vec<PathBuf> = files.iter().map(|f| replayer.summary_path(f)).collect();
        assert_eq!(
            summaries,
            vec![
                Path::new("out").join("a").join("s1.summary.json"),
                Path::new("out").join("b").join("s1.summary.json"),
            ]
        );
    }
}
