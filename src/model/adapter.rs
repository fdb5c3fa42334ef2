//! Typed adapter over trained estimators

use crate::{Result, UpsBetError};

/// Inference interface for a trained estimator.
pub trait ModelAdapter {
    /// Run inference on a feature vector laid out in
    /// [`expected_feature_order`](ModelAdapter::expected_feature_order).
    /// Shape mismatches are reported as errors, never retried.
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Ordered feature names the estimator was trained on.
    fn expected_feature_order(&self) -> &[String];
}

/// Fitted linear regressor: per-feature coefficients plus an intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
    feature_order: Vec<String>,
}

impl LinearRegressor {
    /// Build a regressor, checking that the coefficient count matches the
    /// declared feature order.
    pub fn new(
        coefficients: Vec<f64>,
        intercept: f64,
        feature_order: Vec<String>,
    ) -> Result<Self> {
        if coefficients.len() != feature_order.len() {
            return Err(UpsBetError::Artifact(format!(
                "regressor declares {} features but carries {} coefficients",
                feature_order.len(),
                coefficients.len()
            )));
        }
        Ok(LinearRegressor {
            coefficients,
            intercept,
            feature_order,
        })
    }
}

impl ModelAdapter for LinearRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(UpsBetError::FeatureMismatch {
                expected: self.coefficients.len(),
                got: features.len(),
            });
        }
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(c, x)| c * x)
            .sum();
        Ok(self.intercept + dot)
    }

    fn expected_feature_order(&self) -> &[String] {
        &self.feature_order
    }
}
