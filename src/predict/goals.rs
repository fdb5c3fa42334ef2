//! Goals pipeline
//!
//! Two independent regressors, one per side, run on the same
//! fixture-average feature vector. The rounded scoreline decides the
//! three-way outcome code.

use serde::Serialize;

use crate::data::Database;
use crate::features::assemble::assemble;
use crate::features::defaults::FeatureDefaults;
use crate::model::adapter::ModelAdapter;
use crate::model::artifact::GoalsModel;
use crate::{Fixture, Result, UpsBetError};

/// Raw and rounded goals for one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalLine {
    pub raw: f64,
    pub rounded: i64,
}

impl GoalLine {
    fn from_raw(raw: f64) -> Self {
        GoalLine {
            raw,
            rounded: raw.round() as i64,
        }
    }
}

/// Outcome of the goals pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalsPrediction {
    pub home: GoalLine,
    pub away: GoalLine,
    pub resultado_1x2: u8,
    pub features_used: Vec<String>,
}

/// Three-way outcome code from a rounded scoreline: 1 home win, 2 away win,
/// 0 draw.
pub fn outcome_code(home_goals: i64, away_goals: i64) -> u8 {
    match home_goals.cmp(&away_goals) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => 2,
        std::cmp::Ordering::Equal => 0,
    }
}

/// Predict the scoreline for `fixture` from its historical averages.
///
/// The fixture's cutoff restricts the averages to matches strictly before
/// that date. No history in either direction is a `NoHistory` outcome.
pub fn predict(db: &Database, model: &GoalsModel, fixture: &Fixture) -> Result<GoalsPrediction> {
    let record = db
        .result_averages(fixture.home, fixture.away, fixture.cutoff)?
        .ok_or(UpsBetError::NoHistory)?;

    let defaults = FeatureDefaults::for_results();
    let features = assemble(model.feature_order(), fixture, &record, &defaults);

    let home = GoalLine::from_raw(model.home.predict(&features.values)?);
    let away = GoalLine::from_raw(model.away.predict(&features.values)?);

    Ok(GoalsPrediction {
        resultado_1x2: outcome_code(home.rounded, away.rounded),
        home,
        away,
        features_used: features.columns,
    })
}
