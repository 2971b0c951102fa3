// src/detection/rep_counter.rs
//
// Session owner: landmarks in, (rep count, phase, analysis) out.
//
// One counter per landmark stream. Not shared between threads; a second
// camera gets its own counter.

use super::state_machine::{PhaseStateMachine, RepCycle, Transition};
use crate::analysis::{PostureAnalysis, PostureAnalyzer, PostureMetrics};
use crate::error::Result;
use crate::landmarks::LandmarkSet;
use crate::pipeline::{MetricsSummary, SessionMetrics};
use crate::types::{Config, ExerciseKind, ExercisePhase, Landmark};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Mutable state of one exercise session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub exercise: ExerciseKind,
    pub phase: ExercisePhase,
    pub rep_count: u32,
    /// Jump reference ankle height; captured once from the first usable
    /// frame and only cleared by `reset`.
    pub baseline: Option<f64>,
}

impl SessionState {
    fn new(exercise: ExerciseKind) -> Self {
        Self {
            exercise,
            phase: ExercisePhase::Neutral,
            rep_count: 0,
            baseline: None,
        }
    }
}

/// Result of one `update` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepUpdate {
    pub rep_count: u32,
    pub phase: ExercisePhase,
    /// `None` when the frame carried no landmarks or the exercise has no
    /// scoring rules.
    pub analysis: Option<PostureAnalysis>,
}

impl RepUpdate {
    pub fn phase_name(&self) -> &'static str {
        self.phase.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseTransition {
    pub frame_index: u64,
    pub from: ExercisePhase,
    pub to: ExercisePhase,
    pub rep_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatistics {
    pub total_reps: u32,
    pub current_phase: ExercisePhase,
    pub exercise_kind: ExerciseKind,
    pub phase_history: Vec<PhaseTransition>,
    pub metrics: MetricsSummary,
}

pub struct RepCounter {
    state: SessionState,
    confidence_threshold: f64,
    analyzer: PostureAnalyzer,
    machine: Option<PhaseStateMachine>,
    record_phase_history: bool,
    phase_history_capacity: usize,
    phase_history: VecDeque<PhaseTransition>,
    metrics: SessionMetrics,
    frame_index: u64,
}

impl RepCounter {
    /// Counter with the default threshold profiles.
    ///
    /// Fails on an unknown exercise name or a confidence threshold outside
    /// [0, 1]. The threshold is kept with the session but does not gate
    /// transitions; posture scoring applies its own fixed visibility gate.
    pub fn new(exercise: &str, confidence_threshold: f64) -> Result<Self> {
        let mut config = Config::default();
        config.session.exercise = exercise.to_string();
        config.session.confidence_threshold = confidence_threshold;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let exercise: ExerciseKind = config.session.exercise.parse()?;
        let session = &config.session;

        let machine = match (
            RepCycle::for_exercise(exercise),
            config.thresholds.profile_for(exercise),
        ) {
            (Some(cycle), Some(profile)) => Some(PhaseStateMachine::new(
                cycle,
                profile,
                session.enforce_min_hold,
            )),
            _ => None,
        };

        info!(
            "Rep counter ready: exercise={}, confidence_threshold={:.2}, min_hold={}",
            exercise,
            session.confidence_threshold,
            if session.enforce_min_hold { "enforced" } else { "off" }
        );

        Ok(Self {
            state: SessionState::new(exercise),
            confidence_threshold: session.confidence_threshold,
            analyzer: PostureAnalyzer::new(exercise),
            machine,
            record_phase_history: session.record_phase_history,
            phase_history_capacity: session.phase_history_capacity,
            phase_history: VecDeque::new(),
            metrics: SessionMetrics::new(),
            frame_index: 0,
        })
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.state.exercise
    }

    pub fn rep_count(&self) -> u32 {
        self.state.rep_count
    }

    pub fn phase(&self) -> ExercisePhase {
        self.state.phase
    }

    pub fn baseline(&self) -> Option<f64> {
        self.state.baseline
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Processes one frame of positional detector output.
    pub fn update_indexed(&mut self, landmarks: &[Landmark]) -> RepUpdate {
        self.update(&LandmarkSet::from_indexed(landmarks))
    }

    /// Processes one frame. Frames without the required joints never move
    /// the phase or the count.
    pub fn update(&mut self, landmarks: &LandmarkSet) -> RepUpdate {
        self.frame_index += 1;

        if landmarks.is_empty() {
            self.metrics.record_empty();
            return self.snapshot(None);
        }

        let Some(mut analysis) = self.analyzer.analyze(landmarks, self.state.baseline) else {
            self.metrics.record_unscored();
            return self.snapshot(None);
        };
        self.metrics.record(&analysis);

        let Some(metrics) = analysis.metrics else {
            debug!(
                "Frame {}: required joints not visible, holding {}",
                self.frame_index, self.state.phase
            );
            return self.snapshot(Some(analysis));
        };

        if let PostureMetrics::Jump { ankle_height, .. } = metrics {
            if self.state.baseline.is_none() {
                self.state.baseline = Some(ankle_height);
                info!("Jump baseline captured at ankle height {:.3}", ankle_height);
            }
        }

        let phase = self.state.phase;
        let transition = self
            .machine
            .as_mut()
            .and_then(|machine| machine.update(phase, metrics.signal()));
        if let Some(transition) = transition {
            self.apply(transition);
        }

        analysis.rep_count = Some(self.state.rep_count);
        analysis.phase = Some(self.state.phase);
        self.snapshot(Some(analysis))
    }

    fn apply(&mut self, transition: Transition) {
        self.state.phase = transition.to;
        if transition.completes_rep {
            self.state.rep_count += 1;
            info!(
                "✓ {} rep {} completed (frame {})",
                self.state.exercise, self.state.rep_count, self.frame_index
            );
        } else {
            debug!(
                "Frame {}: {} → {}",
                self.frame_index, transition.from, transition.to
            );
        }

        if self.record_phase_history && self.phase_history_capacity > 0 {
            if self.phase_history.len() >= self.phase_history_capacity {
                self.phase_history.pop_front();
            }
            self.phase_history.push_back(PhaseTransition {
                frame_index: self.frame_index,
                from: transition.from,
                to: transition.to,
                rep_count: self.state.rep_count,
            });
        }
    }

    fn snapshot(&self, analysis: Option<PostureAnalysis>) -> RepUpdate {
        RepUpdate {
            rep_count: self.state.rep_count,
            phase: self.state.phase,
            analysis,
        }
    }

    /// Back to a fresh session: zero reps, neutral phase, no jump baseline,
    /// empty history and metrics. Safe to call repeatedly.
    pub fn reset(&mut self) {
        self.state = SessionState::new(self.state.exercise);
        if let Some(machine) = self.machine.as_mut() {
            machine.reset();
        }
        self.phase_history.clear();
        self.metrics.reset();
        self.frame_index = 0;
        debug!("Rep counter reset ({})", self.state.exercise);
    }

    pub fn statistics(&self) -> SessionStatistics {
        SessionStatistics {
            total_reps: self.state.rep_count,
            current_phase: self.state.phase,
            exercise_kind: self.state.exercise,
            phase_history: self.phase_history.iter().copied().collect(),
            metrics: self.metrics.summary(),
        }
    }
}
