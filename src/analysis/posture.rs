// src/analysis/posture.rs
//
// Per-exercise form scoring. Every frame starts at 100 and loses points
// for each violation found; a frame without the required joints is gated
// to a score of 0 before any angle is computed.

use crate::geometry::angle;
use crate::landmarks::{LandmarkName, LandmarkSet};
use crate::types::{ExerciseKind, ExercisePhase};
use serde::Serialize;

// ============================================================================
// SCORING
// ============================================================================
const FULL_SCORE: i32 = 100;

// ============================================================================
// SQUAT LIMITS (degrees)
// ============================================================================
const SQUAT_TOO_DEEP_ANGLE: f64 = 70.0;
const SQUAT_TOO_SHALLOW_ANGLE: f64 = 160.0;
const SQUAT_MIN_BACK_ANGLE: f64 = 160.0;

const SQUAT_TOO_DEEP_PENALTY: i32 = 10;
const SQUAT_TOO_SHALLOW_PENALTY: i32 = 15;
const BACK_BENT_PENALTY: i32 = 20;

// ============================================================================
// PUSH-UP LIMITS (degrees)
// ============================================================================
const PUSHUP_ARMS_LOCKED_ANGLE: f64 = 170.0;
const PUSHUP_TOO_LOW_ANGLE: f64 = 45.0;
const PUSHUP_MIN_BODY_ANGLE: f64 = 160.0;

const PUSHUP_ARMS_LOCKED_PENALTY: i32 = 15;
const PUSHUP_TOO_LOW_PENALTY: i32 = 10;
const BODY_LINE_PENALTY: i32 = 20;

// ============================================================================
// MESSAGES
// ============================================================================
pub const POSE_NOT_VISIBLE: &str = "Pose not clearly visible";
pub const SQUAT_TOO_DEEP: &str = "Squat too deep";
pub const SQUAT_NOT_DEEP_ENOUGH: &str = "Squat not deep enough";
pub const BACK_BENT_FORWARD: &str = "Back bent forward";
pub const LOWER_CHEST: &str = "Lower chest closer to ground";
pub const CHEST_TOO_LOW: &str = "Chest too close to ground";
pub const KEEP_BODY_STRAIGHT: &str = "Keep body in straight line";

const SQUAT_JOINTS: [LandmarkName; 4] = [
    LandmarkName::LeftHip,
    LandmarkName::LeftKnee,
    LandmarkName::LeftAnkle,
    LandmarkName::LeftShoulder,
];

const PUSHUP_JOINTS: [LandmarkName; 4] = [
    LandmarkName::LeftShoulder,
    LandmarkName::LeftElbow,
    LandmarkName::LeftWrist,
    LandmarkName::LeftHip,
];

const JUMP_JOINTS: [LandmarkName; 2] = [LandmarkName::LeftAnkle, LandmarkName::RightAnkle];

/// Joints that must all be usable before an exercise is scored.
pub fn required_joints(exercise: ExerciseKind) -> &'static [LandmarkName] {
    match exercise {
        ExerciseKind::Squat => &SQUAT_JOINTS,
        ExerciseKind::PushUp => &PUSHUP_JOINTS,
        ExerciseKind::Jump => &JUMP_JOINTS,
        ExerciseKind::PullUp => &[],
    }
}

/// Exercise-specific measurements behind a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "exercise", rename_all = "lowercase")]
pub enum PostureMetrics {
    Squat {
        knee_angle: f64,
        back_angle: f64,
    },
    #[serde(rename = "pushup")]
    PushUp {
        elbow_angle: f64,
        body_angle: f64,
    },
    Jump {
        /// Mean ankle height this frame.
        ankle_height: f64,
        /// Baseline ankle height minus current, positive when rising.
        displacement: f64,
    },
}

impl PostureMetrics {
    /// The scalar that drives the repetition cycle.
    pub fn signal(&self) -> f64 {
        match *self {
            PostureMetrics::Squat { knee_angle, .. } => knee_angle,
            PostureMetrics::PushUp { elbow_angle, .. } => elbow_angle,
            PostureMetrics::Jump { displacement, .. } => displacement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostureAnalysis {
    pub score: u32,
    pub errors: Vec<String>,
    /// Absent when the frame was gated.
    #[serde(flatten)]
    pub metrics: Option<PostureMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<ExercisePhase>,
}

impl PostureAnalysis {
    pub fn not_visible() -> Self {
        Self {
            score: 0,
            errors: vec![POSE_NOT_VISIBLE.to_string()],
            metrics: None,
            rep_count: None,
            phase: None,
        }
    }

    fn scored(score: i32, errors: Vec<String>, metrics: PostureMetrics) -> Self {
        Self {
            score: score.max(0) as u32,
            errors,
            metrics: Some(metrics),
            rep_count: None,
            phase: None,
        }
    }

    pub fn is_gated(&self) -> bool {
        self.metrics.is_none()
    }

    pub fn signal(&self) -> Option<f64> {
        self.metrics.as_ref().map(PostureMetrics::signal)
    }
}

pub struct PostureAnalyzer {
    exercise: ExerciseKind,
}

impl PostureAnalyzer {
    pub fn new(exercise: ExerciseKind) -> Self {
        Self { exercise }
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    /// Scores one frame. `jump_baseline` is the session's reference ankle
    /// height; without one the current frame is its own baseline.
    ///
    /// Returns `None` for exercises without scoring rules.
    pub fn analyze(
        &self,
        landmarks: &LandmarkSet,
        jump_baseline: Option<f64>,
    ) -> Option<PostureAnalysis> {
        match self.exercise {
            ExerciseKind::Squat => Some(self.analyze_squat(landmarks)),
            ExerciseKind::PushUp => Some(self.analyze_pushup(landmarks)),
            ExerciseKind::Jump => Some(self.analyze_jump(landmarks, jump_baseline)),
            ExerciseKind::PullUp => None,
        }
    }

    pub fn analyze_squat(&self, landmarks: &LandmarkSet) -> PostureAnalysis {
        let Some([hip, knee, ankle, shoulder]) = usable_positions(landmarks, &SQUAT_JOINTS) else {
            return PostureAnalysis::not_visible();
        };

        let mut score = FULL_SCORE;
        let mut errors = Vec::new();

        let knee_angle = angle(hip, knee, ankle);
        if knee_angle < SQUAT_TOO_DEEP_ANGLE {
            errors.push(SQUAT_TOO_DEEP.to_string());
            score -= SQUAT_TOO_DEEP_PENALTY;
        } else if knee_angle > SQUAT_TOO_SHALLOW_ANGLE {
            errors.push(SQUAT_NOT_DEEP_ENOUGH.to_string());
            score -= SQUAT_TOO_SHALLOW_PENALTY;
        }

        let back_angle = angle(shoulder, hip, knee);
        if back_angle < SQUAT_MIN_BACK_ANGLE {
            errors.push(BACK_BENT_FORWARD.to_string());
            score -= BACK_BENT_PENALTY;
        }

        PostureAnalysis::scored(
            score,
            errors,
            PostureMetrics::Squat {
                knee_angle,
                back_angle,
            },
        )
    }

    pub fn analyze_pushup(&self, landmarks: &LandmarkSet) -> PostureAnalysis {
        let Some([shoulder, elbow, wrist, hip]) = usable_positions(landmarks, &PUSHUP_JOINTS)
        else {
            return PostureAnalysis::not_visible();
        };

        let mut score = FULL_SCORE;
        let mut errors = Vec::new();

        let elbow_angle = angle(shoulder, elbow, wrist);
        if elbow_angle > PUSHUP_ARMS_LOCKED_ANGLE {
            errors.push(LOWER_CHEST.to_string());
            score -= PUSHUP_ARMS_LOCKED_PENALTY;
        } else if elbow_angle < PUSHUP_TOO_LOW_ANGLE {
            errors.push(CHEST_TOO_LOW.to_string());
            score -= PUSHUP_TOO_LOW_PENALTY;
        }

        // Any reported knee is used, visible or not. Without one the line
        // collapses onto the hip and the angle is the degenerate 0.
        let far_point = landmarks
            .get(LandmarkName::LeftKnee)
            .map(|knee| knee.position())
            .unwrap_or(hip);
        let body_angle = angle(shoulder, hip, far_point);
        if body_angle < PUSHUP_MIN_BODY_ANGLE {
            errors.push(KEEP_BODY_STRAIGHT.to_string());
            score -= BODY_LINE_PENALTY;
        }

        PostureAnalysis::scored(
            score,
            errors,
            PostureMetrics::PushUp {
                elbow_angle,
                body_angle,
            },
        )
    }

    pub fn analyze_jump(&self, landmarks: &LandmarkSet, baseline: Option<f64>) -> PostureAnalysis {
        let Some([left, right]) = usable_positions(landmarks, &JUMP_JOINTS) else {
            return PostureAnalysis::not_visible();
        };

        let ankle_height = (left.1 + right.1) / 2.0;
        // Image y grows downward, so rising shrinks y.
        let displacement = baseline.unwrap_or(ankle_height) - ankle_height;

        PostureAnalysis::scored(
            FULL_SCORE,
            Vec::new(),
            PostureMetrics::Jump {
                ankle_height,
                displacement,
            },
        )
    }
}

fn usable_positions<const N: usize>(
    landmarks: &LandmarkSet,
    names: &[LandmarkName; N],
) -> Option<[(f64, f64); N]> {
    let mut positions = [(0.0, 0.0); N];
    for (slot, name) in positions.iter_mut().zip(names) {
        *slot = landmarks.usable(*name)?.position();
    }
    Some(positions)
}
