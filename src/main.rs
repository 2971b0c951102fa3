// src/main.rs

use anyhow::{Context, Result};
use rep_counter::replay::SessionReplayer;
use rep_counter::{Config, RepCounter};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    let config = if Path::new(&config_path).exists() {
        Some(Config::load(&config_path).with_context(|| format!("Failed to load {config_path}"))?)
    } else {
        None
    };
    let config_found = config.is_some();
    let config = config.unwrap_or_default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rep_counter={}", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏋️ Rep counter starting");
    if config_found {
        info!("✓ Configuration loaded from {}", config_path);
    } else {
        warn!("{} not found, using defaults", config_path);
    }

    info!(
        "Exercise: {} | confidence threshold: {:.2}",
        config.session.exercise, config.session.confidence_threshold
    );

    let mut counter = RepCounter::from_config(&config).context("Invalid session configuration")?;

    let replayer = SessionReplayer::new(config.replay.clone());
    let sessions = replayer.find_session_files()?;

    if sessions.is_empty() {
        error!("No session files found in {}", config.replay.input_dir);
        return Ok(());
    }

    if config.replay.save_summaries {
        fs::create_dir_all(&config.replay.output_dir)
            .with_context(|| format!("Failed to create {}", config.replay.output_dir))?;
    }

    let mut total_reps = 0u64;
    let mut replayed = 0usize;

    for (idx, session) in sessions.iter().enumerate() {
        info!("\n========================================");
        info!(
            "Session {}/{}: {}",
            idx + 1,
            sessions.len(),
            session.display()
        );
        info!("========================================\n");

        let stats = match replayer.replay_file(session, &mut counter) {
            Ok(stats) => stats,
            Err(e) => {
                error!("Skipping {}: {}", session.display(), e);
                continue;
            }
        };

        replayed += 1;
        total_reps += u64::from(stats.total_reps);

        let m = &stats.metrics;
        info!("✓ Session complete");
        info!("  Reps: {} ({})", stats.total_reps, stats.exercise_kind);
        info!("  Final phase: {}", stats.current_phase);
        info!(
            "  Frames: {} total, {} scored, {} not visible, {} empty",
            m.total_frames, m.scored_frames, m.gated_frames, m.empty_frames
        );
        match m.average_score {
            Some(avg) => info!(
                "  Posture score: avg {:.1}, lowest {}",
                avg,
                m.lowest_score.unwrap_or(0)
            ),
            None => warn!("  No frame had a clearly visible pose"),
        }
        for (violation, count) in &m.violations {
            info!("  ⚠️  {}: {} frame(s)", violation, count);
        }

        if config.replay.save_summaries {
            let path = replayer.summary_path(session);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let json = serde_json::to_string_pretty(&stats)?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("  Summary saved to {}", path.display());
        }
    }

    info!(
        "Done: {} session(s) replayed, {} rep(s) total",
        replayed, total_reps
    );
    Ok(())
}
