// src/types.rs

use crate::error::{RepCounterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Joints at or below this visibility are treated as not usable.
pub const MIN_VISIBILITY: f64 = 0.5;

// ============================================================================
// LANDMARK
// ============================================================================

/// One tracked joint for one frame, in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Visible enough and with a finite position.
    pub fn is_usable(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.visibility > MIN_VISIBILITY
    }
}

// ============================================================================
// EXERCISE KIND / PHASE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Squat,
    #[serde(rename = "pushup")]
    PushUp,
    Jump,
    /// Accepted at construction, but has no counting logic yet.
    #[serde(rename = "pullup")]
    PullUp,
}

impl ExerciseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::PushUp => "pushup",
            ExerciseKind::Jump => "jump",
            ExerciseKind::PullUp => "pullup",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseKind {
    type Err = RepCounterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "squat" => Ok(ExerciseKind::Squat),
            "pushup" | "push-up" | "push_up" => Ok(ExerciseKind::PushUp),
            "jump" => Ok(ExerciseKind::Jump),
            "pullup" | "pull-up" | "pull_up" => Ok(ExerciseKind::PullUp),
            _ => Err(RepCounterError::UnsupportedExercise(s.to_string())),
        }
    }
}

/// Discrete stage of a repetition cycle.
///
/// The labels are shared across exercises but their roles differ:
/// for squat and push-up `Down` is the bottom of the movement, for jump
/// it is the landing. `Extended` is part of the output vocabulary but no
/// current cycle enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExercisePhase {
    #[default]
    Neutral,
    Down,
    Up,
    Extended,
}

impl ExercisePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ExercisePhase::Neutral => "neutral",
            ExercisePhase::Down => "down",
            ExercisePhase::Up => "up",
            ExercisePhase::Extended => "extended",
        }
    }
}

impl fmt::Display for ExercisePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Per-exercise transition thresholds.
///
/// Squat and push-up thresholds are joint angles in degrees; jump
/// thresholds are vertical displacements in normalized image units
/// (positive when rising).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdProfile {
    pub down_threshold: f64,
    pub up_threshold: f64,
    /// Only enforced when `SessionConfig::enforce_min_hold` is set.
    pub min_hold_frames: u32,
}

impl ThresholdProfile {
    pub const fn squat() -> Self {
        Self {
            down_threshold: 110.0,
            up_threshold: 160.0,
            min_hold_frames: 3,
        }
    }

    pub const fn pushup() -> Self {
        Self {
            down_threshold: 90.0,
            up_threshold: 160.0,
            min_hold_frames: 2,
        }
    }

    pub const fn jump() -> Self {
        Self {
            down_threshold: -0.05,
            up_threshold: 0.1,
            min_hold_frames: 2,
        }
    }

    pub fn validate(&self, exercise: ExerciseKind) -> Result<()> {
        let invalid = |reason: String| RepCounterError::InvalidThresholds { exercise, reason };

        if !self.down_threshold.is_finite() || !self.up_threshold.is_finite() {
            return Err(invalid(format!(
                "thresholds must be finite (down={}, up={})",
                self.down_threshold, self.up_threshold
            )));
        }
        if self.down_threshold >= self.up_threshold {
            return Err(invalid(format!(
                "down_threshold ({}) must be below up_threshold ({})",
                self.down_threshold, self.up_threshold
            )));
        }
        Ok(())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub thresholds: ThresholdConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub exercise: String,
    /// Recorded with the session; the posture gate uses the fixed
    /// `MIN_VISIBILITY` regardless of this value.
    pub confidence_threshold: f64,
    pub enforce_min_hold: bool,
    pub record_phase_history: bool,
    pub phase_history_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exercise: "squat".to_string(),
            confidence_threshold: 0.7,
            enforce_min_hold: false,
            record_phase_history: false,
            phase_history_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub squat: ThresholdProfile,
    pub pushup: ThresholdProfile,
    pub jump: ThresholdProfile,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            squat: ThresholdProfile::squat(),
            pushup: ThresholdProfile::pushup(),
            jump: ThresholdProfile::jump(),
        }
    }
}

impl ThresholdConfig {
    /// Profile for `exercise`, or `None` for kinds without counting logic.
    pub fn profile_for(&self, exercise: ExerciseKind) -> Option<ThresholdProfile> {
        match exercise {
            ExerciseKind::Squat => Some(self.squat),
            ExerciseKind::PushUp => Some(self.pushup),
            ExerciseKind::Jump => Some(self.jump),
            ExerciseKind::PullUp => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub save_summaries: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input_dir: "sessions".to_string(),
            output_dir: "output".to_string(),
            save_summaries: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_kind_parsing() {
        assert_eq!("squat".parse::<ExerciseKind>().unwrap(), ExerciseKind::Squat);
        assert_eq!("Push-Up".parse::<ExerciseKind>().unwrap(), ExerciseKind::PushUp);
        assert_eq!(" jump ".parse::<ExerciseKind>().unwrap(), ExerciseKind::Jump);
        assert_eq!("pull_up".parse::<ExerciseKind>().unwrap(), ExerciseKind::PullUp);

        let err = "burpee".parse::<ExerciseKind>().unwrap_err();
        assert!(matches!(err, RepCounterError::UnsupportedExercise(ref s) if s == "burpee"));
    }

    #[test]
    fn test_phase_vocabulary_is_stable() {
        let names: Vec<&str> = [
            ExercisePhase::Neutral,
            ExercisePhase::Down,
            ExercisePhase::Up,
            ExercisePhase::Extended,
        ]
        .iter()
        .map(|p| p.as_str())
        .collect();
        assert_eq!(names, vec!["neutral", "down", "up", "extended"]);

        let json = serde_json::to_string(&ExercisePhase::Up).unwrap();
        assert_eq!(json, "\"up\"");
    }

    #[test]
    fn test_default_profiles_validate() {
        let cfg = ThresholdConfig::default();
        for kind in [ExerciseKind::Squat, ExerciseKind::PushUp, ExerciseKind::Jump] {
            let profile = cfg.profile_for(kind).unwrap();
            assert!(profile.validate(kind).is_ok());
        }
        assert!(cfg.profile_for(ExerciseKind::PullUp).is_none());
    }

    #[test]
    fn test_inverted_profile_rejected() {
        let profile = ThresholdProfile {
            down_threshold: 170.0,
            up_threshold: 160.0,
            min_hold_frames: 1,
        };
        assert!(matches!(
            profile.validate(ExerciseKind::Squat),
            Err(RepCounterError::InvalidThresholds { .. })
        ));

        let nan = ThresholdProfile {
            down_threshold: f64::NAN,
            ..ThresholdProfile::squat()
        };
        assert!(nan.validate(ExerciseKind::Squat).is_err());
    }

    #[test]
    fn test_landmark_visibility_gate() {
        assert!(Landmark::new(0.1, 0.2, 0.51).is_usable());
        assert!(!Landmark::new(0.1, 0.2, 0.5).is_usable());
    }

    #[test]
    fn test_non_finite_position_is_not_usable() {
        assert!(!Landmark::new(f64::NAN, 0.2, 0.99).is_usable());
        assert!(!Landmark::new(0.1, f64::INFINITY, 0.99).is_usable());
        assert!(!Landmark::new(0.1, 0.2, f64::NAN).is_usable());
    }
}
