use crate::error::{RepCounterError, Result};
use crate::types::{Config, ExerciseKind};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| RepCounterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the exercise name, confidence threshold and every
    /// configured threshold profile.
    pub fn validate(&self) -> Result<()> {
        self.session.exercise.parse::<ExerciseKind>()?;

        let confidence = self.session.confidence_threshold;
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(RepCounterError::InvalidConfidence(confidence));
        }

        for kind in [ExerciseKind::Squat, ExerciseKind::PushUp, ExerciseKind::Jump] {
            if let Some(profile) = self.thresholds.profile_for(kind) {
                profile.validate(kind)?;
            }
        }
        Ok(())
    }
}
