// src/analysis/mod.rs

pub mod posture;

pub use posture::{
    required_joints, PostureAnalysis, PostureAnalyzer, PostureMetrics, POSE_NOT_VISIBLE,
};
