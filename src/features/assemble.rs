//! Feature vector assembly
//!
//! Maps a model's declared feature order to numeric values. The model
//! artifact is the single source of truth for column order; team ids are
//! substituted literally, averaged statistics come from the aggregate
//! record, and the default table fills the holes.

use crate::data::database::AggregateRecord;
use crate::features::defaults::FeatureDefaults;
use crate::Fixture;

/// Feature name carrying the home team id.
pub const HOME_ID_FEATURE: &str = "equipo_local_id";

/// Feature name carrying the away team id.
pub const AWAY_ID_FEATURE: &str = "equipo_visitante_id";

/// Ordered numeric input for a model, with the feature names actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: Vec<f64>,
    pub columns: Vec<String>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build the feature vector for `fixture` in the model's declared order.
/// The output length always equals `order.len()`.
pub fn assemble(
    order: &[String],
    fixture: &Fixture,
    record: &AggregateRecord,
    defaults: &FeatureDefaults,
) -> FeatureVector {
    let mut values = Vec::with_capacity(order.len());
    for name in order {
        let value = match name.as_str() {
            HOME_ID_FEATURE => fixture.home.0 as f64,
            AWAY_ID_FEATURE => fixture.away.0 as f64,
            stat => record.get(stat).unwrap_or_else(|| defaults.get(stat)),
        };
        values.push(value);
    }
    FeatureVector {
        values,
        columns: order.to_vec(),
    }
}
