// src/detection/state_machine.rs
//
// Repetition phase transitions.
//
// Transition table (signal → next phase):
//
//   Descending cycle (squat: knee angle, push-up: elbow angle)
//     NEUTRAL  signal < down  → DOWN
//     DOWN     signal > up    → UP       (rep counted)
//     UP       signal > up    → NEUTRAL
//
//   Ascending cycle (jump: vertical displacement from baseline)
//     NEUTRAL  signal > up              → UP
//     UP       signal < down            → DOWN  (rep counted, DOWN = landed)
//     DOWN     |signal| < SETTLE_EPSILON → NEUTRAL
//
// EXTENDED is never entered.

use crate::types::{ExerciseKind, ExercisePhase, ThresholdProfile};
use tracing::debug;

/// A landed jump counts as settled once back within this displacement.
pub const JUMP_SETTLE_EPSILON: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepCycle {
    /// neutral → down → up → neutral
    Descending,
    /// neutral → up → down → neutral
    Ascending,
}

impl RepCycle {
    pub fn for_exercise(exercise: ExerciseKind) -> Option<Self> {
        match exercise {
            ExerciseKind::Squat | ExerciseKind::PushUp => Some(RepCycle::Descending),
            ExerciseKind::Jump => Some(RepCycle::Ascending),
            ExerciseKind::PullUp => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ExercisePhase,
    pub to: ExercisePhase,
    pub completes_rep: bool,
}

impl Transition {
    fn step(from: ExercisePhase, to: ExercisePhase) -> Self {
        Self {
            from,
            to,
            completes_rep: false,
        }
    }

    fn counted(from: ExercisePhase, to: ExercisePhase) -> Self {
        Self {
            from,
            to,
            completes_rep: true,
        }
    }
}

/// The transition `signal` would trigger from `phase`, if any.
pub fn next_transition(
    cycle: RepCycle,
    profile: &ThresholdProfile,
    phase: ExercisePhase,
    signal: f64,
) -> Option<Transition> {
    use crate::types::ExercisePhase::{Down, Extended, Neutral, Up};

    match (cycle, phase) {
        (RepCycle::Descending, Neutral) if signal < profile.down_threshold => {
            Some(Transition::step(Neutral, Down))
        }
        (RepCycle::Descending, Down) if signal > profile.up_threshold => {
            Some(Transition::counted(Down, Up))
        }
        (RepCycle::Descending, Up) if signal > profile.up_threshold => {
            Some(Transition::step(Up, Neutral))
        }

        (RepCycle::Ascending, Neutral) if signal > profile.up_threshold => {
            Some(Transition::step(Neutral, Up))
        }
        (RepCycle::Ascending, Up) if signal < profile.down_threshold => {
            Some(Transition::counted(Up, Down))
        }
        (RepCycle::Ascending, Down) if signal.abs() < JUMP_SETTLE_EPSILON => {
            Some(Transition::step(Down, Neutral))
        }

        (_, Neutral | Down | Up | Extended) => None,
    }
}

/// Transition gate for one session.
///
/// The current phase lives with the session and is passed in on every
/// update. With `enforce_min_hold` a transition fires only after its
/// condition has held for `min_hold_frames` consecutive updates; otherwise
/// it fires on the first qualifying update.
#[derive(Debug, Clone)]
pub struct PhaseStateMachine {
    cycle: RepCycle,
    profile: ThresholdProfile,
    enforce_min_hold: bool,
    frames_qualifying: u32,
}

impl PhaseStateMachine {
    pub fn new(cycle: RepCycle, profile: ThresholdProfile, enforce_min_hold: bool) -> Self {
        Self {
            cycle,
            profile,
            enforce_min_hold,
            frames_qualifying: 0,
        }
    }

    pub fn profile(&self) -> &ThresholdProfile {
        &self.profile
    }

    pub fn update(&mut self, phase: ExercisePhase, signal: f64) -> Option<Transition> {
        let Some(transition) = next_transition(self.cycle, &self.profile, phase, signal) else {
            self.frames_qualifying = 0;
            return None;
        };

        if self.enforce_min_hold {
            self.frames_qualifying += 1;
            if self.frames_qualifying < self.profile.min_hold_frames {
                debug!(
                    "Holding {} → {} ({}/{})",
                    transition.from,
                    transition.to,
                    self.frames_qualifying,
                    self.profile.min_hold_frames
                );
                return None;
            }
        }

        self.frames_qualifying = 0;
        Some(transition)
    }

    /// Drops any partially held transition.
    pub fn reset(&mut self) {
        self.frames_qualifying = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExercisePhase::{Down, Neutral, Up};

    /// Machine plus the phase a session would keep alongside it.
    struct Tracker {
        machine: PhaseStateMachine,
        phase: ExercisePhase,
    }

    impl Tracker {
        fn new(cycle: RepCycle, profile: ThresholdProfile, enforce_min_hold: bool) -> Self {
            Self {
                machine: PhaseStateMachine::new(cycle, profile, enforce_min_hold),
                phase: Neutral,
            }
        }

        fn update(&mut self, signal: f64) -> Option<Transition> {
            let transition = self.machine.update(self.phase, signal);
            if let Some(t) = transition {
                self.phase = t.to;
            }
            transition
        }

        fn run(&mut self, signals: &[f64]) -> (Vec<ExercisePhase>, u32) {
            let mut phases = Vec::new();
            let mut reps = 0;
            for &s in signals {
                if let Some(t) = self.update(s) {
                    if t.completes_rep {
                        reps += 1;
                    }
                }
                phases.push(self.phase);
            }
            (phases, reps)
        }
    }

    #[test]
    fn test_squat_cycle() {
        let mut tracker = Tracker::new(RepCycle::Descending, ThresholdProfile::squat(), false);
        let (phases, reps) = tracker.run(&[170.0, 100.0, 60.0, 170.0]);

        assert_eq!(phases, vec![Neutral, Down, Down, Up]);
        assert_eq!(reps, 1);

        // One more frame above the up threshold closes the cycle.
        assert_eq!(tracker.update(170.0), Some(Transition::step(Up, Neutral)));
        assert_eq!(tracker.phase, Neutral);
    }

    #[test]
    fn test_rep_counted_only_on_down_to_up_edge() {
        let mut tracker = Tracker::new(RepCycle::Descending, ThresholdProfile::squat(), false);
        assert!(!tracker.update(100.0).unwrap().completes_rep);
        assert!(tracker.update(165.0).unwrap().completes_rep);
        assert!(!tracker.update(165.0).unwrap().completes_rep);
    }

    #[test]
    fn test_hysteresis_band_holds_phase() {
        let mut tracker = Tracker::new(RepCycle::Descending, ThresholdProfile::pushup(), false);
        tracker.update(80.0);
        assert_eq!(tracker.phase, Down);

        // Between 90 and 160 nothing moves.
        for s in [95.0, 130.0, 160.0, 120.0] {
            assert!(tracker.update(s).is_none());
            assert_eq!(tracker.phase, Down);
        }
        assert!(tracker.update(161.0).unwrap().completes_rep);
    }

    #[test]
    fn test_up_phase_waits_for_full_extension() {
        let mut tracker = Tracker::new(RepCycle::Descending, ThresholdProfile::squat(), false);
        tracker.run(&[100.0, 170.0]);
        assert_eq!(tracker.phase, Up);

        // Dropping again before standing tall does not start a new rep.
        assert!(tracker.update(100.0).is_none());
        assert_eq!(tracker.phase, Up);
    }

    #[test]
    fn test_jump_cycle() {
        let mut tracker = Tracker::new(RepCycle::Ascending, ThresholdProfile::jump(), false);
        let (phases, reps) = tracker.run(&[0.0, 0.15, 0.05, -0.08, -0.03, 0.01]);

        assert_eq!(phases, vec![Neutral, Up, Up, Down, Down, Neutral]);
        assert_eq!(reps, 1);
    }

    #[test]
    fn test_nan_signal_never_transitions() {
        for phase in [Neutral, Down, Up] {
            assert!(next_transition(
                RepCycle::Descending,
                &ThresholdProfile::squat(),
                phase,
                f64::NAN
            )
            .is_none());
            assert!(next_transition(
                RepCycle::Ascending,
                &ThresholdProfile::jump(),
                phase,
                f64::NAN
            )
            .is_none());
        }
    }

    #[test]
    fn test_min_hold_ignored_unless_enforced() {
        let profile = ThresholdProfile {
            min_hold_frames: 3,
            ..ThresholdProfile::squat()
        };

        let mut free = Tracker::new(RepCycle::Descending, profile, false);
        assert!(free.update(100.0).is_some());

        let mut held = Tracker::new(RepCycle::Descending, profile, true);
        assert!(held.update(100.0).is_none());
        assert!(held.update(100.0).is_none());
        assert_eq!(held.phase, Neutral);
        assert_eq!(held.update(100.0), Some(Transition::step(Neutral, Down)));
    }

    #[test]
    fn test_min_hold_streak_resets_on_break() {
        let profile = ThresholdProfile {
            min_hold_frames: 2,
            ..ThresholdProfile::squat()
        };
        let mut tracker = Tracker::new(RepCycle::Descending, profile, true);

        assert!(tracker.update(100.0).is_none());
        assert!(tracker.update(140.0).is_none());
        assert!(tracker.update(100.0).is_none());
        assert!(tracker.update(100.0).is_some());
        assert_eq!(tracker.phase, Down);
    }

    #[test]
    fn test_reset_drops_partial_hold() {
        let profile = ThresholdProfile {
            min_hold_frames: 2,
            ..ThresholdProfile::squat()
        };
        let mut machine = PhaseStateMachine::new(RepCycle::Descending, profile, true);
        assert!(machine.update(Neutral, 100.0).is_none());
        machine.reset();
        assert!(machine.update(Neutral, 100.0).is_none());
        assert!(machine.update(Neutral, 100.0).is_some());
    }

    #[test]
    fn test_pullup_has_no_cycle() {
        assert!(RepCycle::for_exercise(ExerciseKind::PullUp).is_none());
        assert_eq!(
            RepCycle::for_exercise(ExerciseKind::Jump),
            Some(RepCycle::Ascending)
        );
    }
}
