//! Model artifact loading
//!
//! Artifacts are produced by the training pipeline and loaded read-only at
//! process start. A missing or malformed artifact leaves its slot empty;
//! the service keeps running and reports the gap on every prediction call
//! and through the health endpoint.

use crate::features::assemble::{AWAY_ID_FEATURE, HOME_ID_FEATURE};
use crate::model::adapter::{LinearRegressor, ModelAdapter};
use crate::model::scaler::StandardScaler;
use crate::{ModelsConfig, Result, UpsBetError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct RegressorParams {
    coefficients: Vec<f64>,
    intercept: f64,
}

#[derive(Debug, Deserialize)]
struct GoalsArtifact {
    version: String,
    model_type: String,
    feature_columns: Vec<String>,
    model_gl: RegressorParams,
    model_gv: RegressorParams,
}

#[derive(Debug, Deserialize)]
struct CornersArtifact {
    version: String,
    model_type: String,
    feature_columns: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    scaler_type: String,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Goal models: one regressor per side, sharing a single feature order.
#[derive(Debug, Clone)]
pub struct GoalsModel {
    pub version: String,
    pub model_type: String,
    pub home: LinearRegressor,
    pub away: LinearRegressor,
}

impl GoalsModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artifact: GoalsArtifact = read_artifact(path.as_ref())?;
        let home = LinearRegressor::new(
            artifact.model_gl.coefficients,
            artifact.model_gl.intercept,
            artifact.feature_columns.clone(),
        )?;
        let away = LinearRegressor::new(
            artifact.model_gv.coefficients,
            artifact.model_gv.intercept,
            artifact.feature_columns,
        )?;
        Ok(GoalsModel {
            version: artifact.version,
            model_type: artifact.model_type,
            home,
            away,
        })
    }

    /// Shared feature order for both side regressors.
    pub fn feature_order(&self) -> &[String] {
        self.home.expected_feature_order()
    }
}

/// Corners regressor. The artifact declares the scaled statistic columns;
/// the regressor consumes those followed by the two raw team ids.
#[derive(Debug, Clone)]
pub struct CornersModel {
    pub version: String,
    pub model_type: String,
    scaled_columns: Vec<String>,
    pub regressor: LinearRegressor,
}

impl CornersModel {
    /// Build the model from its artifact parts. The regressor's input is
    /// the scaled columns followed by the two raw team ids.
    pub fn new(
        version: String,
        model_type: String,
        scaled_columns: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> Result<Self> {
        let mut full_order = scaled_columns.clone();
        full_order.push(HOME_ID_FEATURE.to_string());
        full_order.push(AWAY_ID_FEATURE.to_string());
        let regressor = LinearRegressor::new(coefficients, intercept, full_order)?;
        Ok(CornersModel {
            version,
            model_type,
            scaled_columns,
            regressor,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artifact: CornersArtifact = read_artifact(path.as_ref())?;
        CornersModel::new(
            artifact.version,
            artifact.model_type,
            artifact.feature_columns,
            artifact.coefficients,
            artifact.intercept,
        )
    }

    /// Statistic columns that pass through the scaler, in input order.
    pub fn scaled_columns(&self) -> &[String] {
        &self.scaled_columns
    }
}

/// Fitted corners scaler plus its artifact metadata.
#[derive(Debug, Clone)]
pub struct CornersScaler {
    pub scaler_type: String,
    pub scaler: StandardScaler,
}

impl CornersScaler {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artifact: ScalerArtifact = read_artifact(path.as_ref())?;
        let scaler = StandardScaler {
            mean: artifact.mean,
            scale: artifact.scale,
        };
        scaler.validate()?;
        Ok(CornersScaler {
            scaler_type: artifact.scaler_type,
            scaler,
        })
    }
}

fn read_artifact<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        UpsBetError::Artifact(format!("failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        UpsBetError::Artifact(format!("failed to parse {}: {}", path.display(), e))
    })
}

/// Every artifact the service can hold, loaded once at startup and treated
/// as immutable for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    pub goals: Option<GoalsModel>,
    pub corners: Option<CornersModel>,
    pub corners_scaler: Option<CornersScaler>,
}

impl ModelSet {
    /// Load whatever artifacts exist. Failures are logged and leave the
    /// slot empty so the service can still start.
    pub fn load(config: &ModelsConfig) -> Self {
        let goals = match GoalsModel::load(&config.goals_path) {
            Ok(model) => {
                info!(
                    path = %config.goals_path,
                    version = %model.version,
                    features = model.feature_order().len(),
                    "goals model loaded"
                );
                Some(model)
            }
            Err(e) => {
                warn!(path = %config.goals_path, error = %e, "goals model unavailable");
                None
            }
        };

        let corners = match CornersModel::load(&config.corners_path) {
            Ok(model) => {
                info!(
                    path = %config.corners_path,
                    version = %model.version,
                    features = model.scaled_columns().len(),
                    "corners model loaded"
                );
                Some(model)
            }
            Err(e) => {
                warn!(path = %config.corners_path, error = %e, "corners model unavailable");
                None
            }
        };

        let corners_scaler = match CornersScaler::load(&config.corners_scaler_path) {
            Ok(scaler) => {
                info!(
                    path = %config.corners_scaler_path,
                    columns = scaler.scaler.len(),
                    "corners scaler loaded"
                );
                Some(scaler)
            }
            Err(e) => {
                warn!(
                    path = %config.corners_scaler_path,
                    error = %e,
                    "corners scaler unavailable"
                );
                None
            }
        };

        ModelSet {
            goals,
            corners,
            corners_scaler,
        }
    }

    /// Whether the primary (goals) model is available.
    pub fn loaded(&self) -> bool {
        self.goals.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_artifact(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_goals_artifact_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(
            &dir,
            "goals.json",
            r#"{
                "version": "ligapro_v1",
                "model_type": "LinearRegression",
                "feature_columns": ["equipo_local_id", "equipo_visitante_id", "posesion_local"],
                "model_gl": {"coefficients": [0.1, -0.1, 0.02], "intercept": 1.1},
                "model_gv": {"coefficients": [-0.05, 0.05, -0.01], "intercept": 0.9}
            }"#,
        );

        let model = GoalsModel::load(&path).unwrap();
        assert_eq!(model.version, "ligapro_v1");
        assert_eq!(model.feature_order().len(), 3);
    }

    #[test]
    fn test_goals_artifact_rejects_coefficient_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(
            &dir,
            "goals.json",
            r#"{
                "version": "ligapro_v1",
                "model_type": "LinearRegression",
                "feature_columns": ["equipo_local_id", "equipo_visitante_id"],
                "model_gl": {"coefficients": [0.1], "intercept": 1.1},
                "model_gv": {"coefficients": [0.1, 0.2], "intercept": 0.9}
            }"#,
        );

        assert!(matches!(
            GoalsModel::load(&path),
            Err(UpsBetError::Artifact(_))
        ));
    }

    #[test]
    fn test_corners_artifact_appends_id_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(
            &dir,
            "corners.json",
            r#"{
                "version": "corners_v1",
                "model_type": "LinearRegression",
                "feature_columns": ["local_avg_last3", "visitante_avg_last3"],
                "coefficients": [0.4, 0.3, 0.0, 0.0],
                "intercept": 8.5
            }"#,
        );

        let model = CornersModel::load(&path).unwrap();
        let order = model.regressor.expected_feature_order();
        assert_eq!(order.len(), 4);
        assert_eq!(order[2], "equipo_local_id");
        assert_eq!(order[3], "equipo_visitante_id");
        assert_eq!(model.scaled_columns().len(), 2);
    }

    #[test]
    fn test_scaler_artifact_validation() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_artifact(
            &dir,
            "scaler.json",
            r#"{"scaler_type": "StandardScaler", "mean": [1.0, 2.0], "scale": [1.0]}"#,
        );
        assert!(matches!(
            CornersScaler::load(&bad),
            Err(UpsBetError::Artifact(_))
        ));
    }

    #[test]
    fn test_model_set_survives_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelsConfig {
            goals_path: dir.path().join("missing_goals.json").to_string_lossy().into_owned(),
            corners_path: dir.path().join("missing_corners.json").to_string_lossy().into_owned(),
            corners_scaler_path: dir
                .path()
                .join("missing_scaler.json")
                .to_string_lossy()
                .into_owned(),
        };

        let models = ModelSet::load(&config);
        assert!(models.goals.is_none());
        assert!(models.corners.is_none());
        assert!(models.corners_scaler.is_none());
        assert!(!models.loaded());
    }
}
