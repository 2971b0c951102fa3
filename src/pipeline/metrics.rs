// src/pipeline/metrics.rs
//
// Per-session frame and form-quality counters. Owned by the counter,
// so plain integers are enough.

use crate::analysis::PostureAnalysis;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SessionMetrics {
    pub total_frames: u64,
    pub empty_frames: u64,
    pub scored_frames: u64,
    pub gated_frames: u64,
    score_sum: u64,
    lowest_score: Option<u32>,
    violations: BTreeMap<String, u64>,
    started_at: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            empty_frames: 0,
            scored_frames: 0,
            gated_frames: 0,
            score_sum: 0,
            lowest_score: None,
            violations: BTreeMap::new(),
            started_at: Instant::now(),
        }
    }

    /// A frame with no landmarks at all.
    pub fn record_empty(&mut self) {
        self.total_frames += 1;
        self.empty_frames += 1;
    }

    /// A frame that went through the posture analyzer. Gated frames are
    /// counted but left out of the score statistics.
    pub fn record(&mut self, analysis: &PostureAnalysis) {
        self.total_frames += 1;
        if analysis.is_gated() {
            self.gated_frames += 1;
            return;
        }

        self.scored_frames += 1;
        self.score_sum += u64::from(analysis.score);
        self.lowest_score = Some(
            self.lowest_score
                .map_or(analysis.score, |low| low.min(analysis.score)),
        );
        for error in &analysis.errors {
            *self.violations.entry(error.clone()).or_insert(0) += 1;
        }
    }

    /// A frame the counter could not interpret (no rules for the exercise).
    pub fn record_unscored(&mut self) {
        self.total_frames += 1;
    }

    pub fn average_score(&self) -> Option<f64> {
        if self.scored_frames == 0 {
            return None;
        }
        Some(self.score_sum as f64 / self.scored_frames as f64)
    }

    pub fn fps(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            self.total_frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            empty_frames: self.empty_frames,
            scored_frames: self.scored_frames,
            gated_frames: self.gated_frames,
            average_score: self.average_score(),
            lowest_score: self.lowest_score,
            violations: self.violations.clone(),
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub empty_frames: u64,
    pub scored_frames: u64,
    pub gated_frames: u64,
    pub average_score: Option<f64>,
    pub lowest_score: Option<u32>,
    pub violations: BTreeMap<String, u64>,
    pub fps: f64,
    pub elapsed_secs: f64,
}
