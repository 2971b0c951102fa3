// src/landmarks.rs
//
// The 33-joint pose vocabulary (MediaPipe Pose order) and the per-frame
// landmark set built from a detector's output.

use crate::types::Landmark;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const NUM_LANDMARKS: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LandmarkName {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl LandmarkName {
    /// Detector output order.
    pub const ALL: [LandmarkName; NUM_LANDMARKS] = [
        LandmarkName::Nose,
        LandmarkName::LeftEyeInner,
        LandmarkName::LeftEye,
        LandmarkName::LeftEyeOuter,
        LandmarkName::RightEyeInner,
        LandmarkName::RightEye,
        LandmarkName::RightEyeOuter,
        LandmarkName::LeftEar,
        LandmarkName::RightEar,
        LandmarkName::MouthLeft,
        LandmarkName::MouthRight,
        LandmarkName::LeftShoulder,
        LandmarkName::RightShoulder,
        LandmarkName::LeftElbow,
        LandmarkName::RightElbow,
        LandmarkName::LeftWrist,
        LandmarkName::RightWrist,
        LandmarkName::LeftPinky,
        LandmarkName::RightPinky,
        LandmarkName::LeftIndex,
        LandmarkName::RightIndex,
        LandmarkName::LeftThumb,
        LandmarkName::RightThumb,
        LandmarkName::LeftHip,
        LandmarkName::RightHip,
        LandmarkName::LeftKnee,
        LandmarkName::RightKnee,
        LandmarkName::LeftAnkle,
        LandmarkName::RightAnkle,
        LandmarkName::LeftHeel,
        LandmarkName::RightHeel,
        LandmarkName::LeftFootIndex,
        LandmarkName::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LandmarkName::Nose => "nose",
            LandmarkName::LeftEyeInner => "left_eye_inner",
            LandmarkName::LeftEye => "left_eye",
            LandmarkName::LeftEyeOuter => "left_eye_outer",
            LandmarkName::RightEyeInner => "right_eye_inner",
            LandmarkName::RightEye => "right_eye",
            LandmarkName::RightEyeOuter => "right_eye_outer",
            LandmarkName::LeftEar => "left_ear",
            LandmarkName::RightEar => "right_ear",
            LandmarkName::MouthLeft => "mouth_left",
            LandmarkName::MouthRight => "mouth_right",
            LandmarkName::LeftShoulder => "left_shoulder",
            LandmarkName::RightShoulder => "right_shoulder",
            LandmarkName::LeftElbow => "left_elbow",
            LandmarkName::RightElbow => "right_elbow",
            LandmarkName::LeftWrist => "left_wrist",
            LandmarkName::RightWrist => "right_wrist",
            LandmarkName::LeftPinky => "left_pinky",
            LandmarkName::RightPinky => "right_pinky",
            LandmarkName::LeftIndex => "left_index",
            LandmarkName::RightIndex => "right_index",
            LandmarkName::LeftThumb => "left_thumb",
            LandmarkName::RightThumb => "right_thumb",
            LandmarkName::LeftHip => "left_hip",
            LandmarkName::RightHip => "right_hip",
            LandmarkName::LeftKnee => "left_knee",
            LandmarkName::RightKnee => "right_knee",
            LandmarkName::LeftAnkle => "left_ankle",
            LandmarkName::RightAnkle => "right_ankle",
            LandmarkName::LeftHeel => "left_heel",
            LandmarkName::RightHeel => "right_heel",
            LandmarkName::LeftFootIndex => "left_foot_index",
            LandmarkName::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown landmark name: {s}"))
    }
}

// ============================================================================
// LANDMARK SET
// ============================================================================

/// Landmarks reported for one frame. Joints the detector did not report
/// are absent; lookups are O(1) by joint.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    joints: [Option<Landmark>; NUM_LANDMARKS],
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self {
            joints: [None; NUM_LANDMARKS],
        }
    }
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a detector's positional output onto the vocabulary.
    /// Entries past the 33rd are ignored; a short slice leaves the
    /// trailing joints absent.
    pub fn from_indexed(landmarks: &[Landmark]) -> Self {
        let mut set = Self::new();
        for (name, landmark) in LandmarkName::ALL.iter().zip(landmarks) {
            set.insert(*name, *landmark);
        }
        set
    }

    /// Builds a set from `(joint name, landmark)` pairs; unknown names are skipped.
    pub fn from_named<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Landmark)>,
    {
        let mut set = Self::new();
        for (key, landmark) in pairs {
            match key.parse::<LandmarkName>() {
                Ok(name) => set.insert(name, landmark),
                Err(e) => warn!("Skipping landmark: {}", e),
            }
        }
        set
    }

    pub fn insert(&mut self, name: LandmarkName, landmark: Landmark) {
        self.joints[name.index()] = Some(landmark);
    }

    pub fn remove(&mut self, name: LandmarkName) -> Option<Landmark> {
        self.joints[name.index()].take()
    }

    pub fn get(&self, name: LandmarkName) -> Option<&Landmark> {
        self.joints[name.index()].as_ref()
    }

    pub fn contains(&self, name: LandmarkName) -> bool {
        self.joints[name.index()].is_some()
    }

    /// The joint, if present and visible enough to use.
    pub fn usable(&self, name: LandmarkName) -> Option<&Landmark> {
        self.get(name).filter(|lm| lm.is_usable())
    }

    pub fn all_usable(&self, names: &[LandmarkName]) -> bool {
        names.iter().all(|name| self.usable(*name).is_some())
    }

    pub fn len(&self) -> usize {
        self.joints.iter().filter(|j| j.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.iter().all(|j| j.is_none())
    }

    pub fn iter(&self) -> impl Iterator<Item = (LandmarkName, &Landmark)> + '_ {
        LandmarkName::ALL
            .iter()
            .zip(self.joints.iter())
            .filter_map(|(name, joint)| joint.as_ref().map(|lm| (*name, lm)))
    }
}
