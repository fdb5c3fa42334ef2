//! Corners pipeline
//!
//! Scales the engineered statistics, passes the team ids through unscaled,
//! and predicts total corner kicks for the fixture.

use crate::data::Database;
use crate::features::assemble::assemble;
use crate::features::defaults::FeatureDefaults;
use crate::model::adapter::ModelAdapter;
use crate::model::artifact::{CornersModel, CornersScaler};
use crate::{Fixture, Result, UpsBetError};

/// Outcome of the corners pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CornersPrediction {
    pub corners_totales: f64,
    pub features_used: Vec<String>,
}

/// Predict total corners for `fixture` from its historical averages.
///
/// The corners lookup carries no cutoff date. The scaled statistics occupy
/// positions 0..n and the raw team ids the final two positions. The
/// training matrix used this exact column order, and scaling the ids would
/// corrupt their meaning as categorical team codes.
pub fn predict(
    db: &Database,
    model: &CornersModel,
    scaler: &CornersScaler,
    fixture: &Fixture,
) -> Result<CornersPrediction> {
    let record = db
        .corner_averages(fixture.home, fixture.away)?
        .ok_or(UpsBetError::NoHistory)?;

    let defaults = FeatureDefaults::for_corners();
    let features = assemble(model.scaled_columns(), fixture, &record, &defaults);

    let mut final_vector = scaler.scaler.transform(&features.values)?;
    final_vector.push(fixture.home.0 as f64);
    final_vector.push(fixture.away.0 as f64);

    let corners_totales = model.regressor.predict(&final_vector)?;

    Ok(CornersPrediction {
        corners_totales,
        features_used: features.columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::scaler::StandardScaler;
    use crate::TeamId;
    use chrono::NaiveDate;

    fn test_model(coefficients: Vec<f64>, intercept: f64) -> CornersModel {
        CornersModel::new(
            "corners_v1".to_string(),
            "LinearRegression".to_string(),
            vec!["local_avg_last3".to_string(), "visitante_avg_last3".to_string()],
            coefficients,
            intercept,
        )
        .unwrap()
    }

    fn identity_scaler() -> CornersScaler {
        CornersScaler {
            scaler_type: "StandardScaler".to_string(),
            scaler: StandardScaler {
                mean: vec![0.0, 0.0],
                scale: vec![1.0, 1.0],
            },
        }
    }

    fn seeded_db(dir: &tempfile::TempDir) -> Database {
        let db = Database::open(dir.path().join("test.db")).unwrap();
        db.insert_corner_row(
            TeamId(4),
            TeamId(0),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            &[("local_avg_last3", 6.0), ("visitante_avg_last3", 4.0)],
        )
        .unwrap();
        db
    }

    #[test]
    fn test_ids_pass_through_unscaled() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir);
        // Only the home-id position contributes; a scaled id would shift it.
        let model = test_model(vec![0.0, 0.0, 1.0, 0.0], 0.0);
        let fixture = Fixture::new(TeamId(4), TeamId(0), None).unwrap();

        let prediction = predict(&db, &model, &identity_scaler(), &fixture).unwrap();
        assert!((prediction.corners_totales - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_are_scaled_before_inference() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir);
        let model = test_model(vec![1.0, 1.0, 0.0, 0.0], 9.0);
        let scaler = CornersScaler {
            scaler_type: "StandardScaler".to_string(),
            scaler: StandardScaler {
                mean: vec![6.0, 4.0],
                scale: vec![2.0, 2.0],
            },
        };
        let fixture = Fixture::new(TeamId(4), TeamId(0), None).unwrap();

        // Averages equal the scaler means, so both scaled inputs are zero.
        let prediction = predict(&db, &model, &scaler, &fixture).unwrap();
        assert!((prediction.corners_totales - 9.0).abs() < 1e-9);
        assert_eq!(prediction.features_used.len(), 2);
    }

    #[test]
    fn test_no_history_is_distinct_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db")).unwrap();
        let model = test_model(vec![0.0, 0.0, 0.0, 0.0], 9.0);
        let fixture = Fixture::new(TeamId(8), TeamId(9), None).unwrap();

        let err = predict(&db, &model, &identity_scaler(), &fixture).unwrap_err();
        assert!(matches!(err, UpsBetError::NoHistory));
    }

    #[test]
    fn test_scaler_shape_mismatch_is_inference_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir);
        let model = test_model(vec![0.0, 0.0, 0.0, 0.0], 9.0);
        // Scaler fitted on a different column count than the model declares.
        let scaler = CornersScaler {
            scaler_type: "StandardScaler".to_string(),
            scaler: StandardScaler {
                mean: vec![0.0],
                scale: vec![1.0],
            },
        };
        let fixture = Fixture::new(TeamId(4), TeamId(0), None).unwrap();

        let err = predict(&db, &model, &scaler, &fixture).unwrap_err();
        assert!(matches!(err, UpsBetError::FeatureMismatch { .. }));
    }
}
