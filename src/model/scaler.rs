//! Frozen feature scaler
//!
//! Mean/standard-deviation normalization fitted at training time. The
//! parameters never change after load.

use crate::{Result, UpsBetError};
use serde::Deserialize;

/// Scales below this are treated as zero-variance columns.
const SCALE_EPSILON: f64 = 1e-12;

/// Fitted mean/std scaler.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Number of columns the scaler was fitted on.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Check internal consistency; called once at artifact load.
    pub fn validate(&self) -> Result<()> {
        if self.mean.len() != self.scale.len() {
            return Err(UpsBetError::Artifact(format!(
                "scaler carries {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        Ok(())
    }

    /// Center and scale a feature vector column-wise. Zero-variance columns
    /// are centered but not divided.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.mean.len() {
            return Err(UpsBetError::FeatureMismatch {
                expected: self.mean.len(),
                got: features.len(),
            });
        }
        let scaled = features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                let centered = x - mean;
                if scale.abs() < SCALE_EPSILON {
                    centered
                } else {
                    centered / scale
                }
            })
            .collect();
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_centers_and_scales() {
        let scaler = StandardScaler {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 4.0],
        };
        let scaled = scaler.transform(&[14.0, -8.0]).unwrap();
        assert_eq!(scaled, vec![2.0, -2.0]);
    }

    #[test]
    fn test_zero_variance_column_is_only_centered() {
        let scaler = StandardScaler {
            mean: vec![5.0],
            scale: vec![0.0],
        };
        let scaled = scaler.transform(&[7.0]).unwrap();
        assert_eq!(scaled, vec![2.0]);
    }

    #[test]
    fn test_transform_rejects_wrong_length() {
        let scaler = StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        let err = scaler.transform(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            UpsBetError::FeatureMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let scaler = StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0],
        };
        assert!(scaler.validate().is_err());
    }
}
