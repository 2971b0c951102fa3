// src/error.rs

use crate::types::ExerciseKind;
use std::path::PathBuf;
use thiserror::Error;

/// Construction-time and loading failures.
///
/// Per-frame problems (occluded joints, degenerate geometry) are never
/// reported here; they are folded into the returned `PostureAnalysis`.
#[derive(Debug, Error)]
pub enum RepCounterError {
    #[error("Unsupported exercise kind: {0:?}")]
    UnsupportedExercise(String),

    #[error("Confidence threshold must be a finite value in [0, 1], got {0}")]
    InvalidConfidence(f64),

    #[error("Invalid {exercise} thresholds: {reason}")]
    InvalidThresholds {
        exercise: ExerciseKind,
        reason: String,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed session data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RepCounterError>;
