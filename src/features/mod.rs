//! Feature preparation
//!
//! Turns fixture aggregates into model-ready feature vectors.

pub mod assemble;
pub mod defaults;
pub mod head_to_head;

pub use assemble::{assemble, FeatureVector};
pub use defaults::FeatureDefaults;
pub use head_to_head::HeadToHeadSummary;
