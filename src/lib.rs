//! Exercise repetition counting from 2-D pose landmarks.
//!
//! Signal flow, once per frame:
//!   detector output → `LandmarkSet` → `PostureAnalyzer` (angles + score)
//!     → `PhaseStateMachine` (phase, rep edge) → `RepUpdate`
//!
//! `RepCounter` owns one session and ties the stages together.

pub mod analysis;
mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod pipeline;
pub mod replay;
pub mod types;

pub use analysis::{PostureAnalysis, PostureAnalyzer, PostureMetrics};
pub use detection::{RepCounter, RepUpdate, SessionStatistics};
pub use error::{RepCounterError, Result};
pub use landmarks::{LandmarkName, LandmarkSet};
pub use types::{Config, ExerciseKind, ExercisePhase, Landmark, ThresholdProfile};
