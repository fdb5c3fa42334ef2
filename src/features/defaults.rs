//! Default values for statistics missing from a fixture's history
//!
//! A single table consulted uniformly by the assembler, so the vector shape
//! stays stable when history is sparse.

use crate::data::database::{CORNER_STAT_COLUMNS, RESULT_STAT_COLUMNS};
use std::collections::HashMap;

/// Default substituted for result-model statistics with no historical value.
pub const RESULT_STAT_DEFAULT: f64 = 5.0;

/// Default substituted for corner-model statistics with no historical value.
pub const CORNER_STAT_DEFAULT: f64 = 0.0;

/// Per-feature-name default table.
#[derive(Debug, Clone)]
pub struct FeatureDefaults {
    values: HashMap<&'static str, f64>,
    fallback: f64,
}

impl FeatureDefaults {
    /// Defaults for the goals model's statistic columns.
    pub fn for_results() -> Self {
        Self::uniform(&RESULT_STAT_COLUMNS, RESULT_STAT_DEFAULT)
    }

    /// Defaults for the corners model's engineered columns.
    pub fn for_corners() -> Self {
        Self::uniform(&CORNER_STAT_COLUMNS, CORNER_STAT_DEFAULT)
    }

    fn uniform(columns: &[&'static str], value: f64) -> Self {
        FeatureDefaults {
            values: columns.iter().map(|c| (*c, value)).collect(),
            fallback: value,
        }
    }

    /// Default for a feature name; unknown names get the table's fallback.
    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(self.fallback)
    }
}
