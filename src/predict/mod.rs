//! Prediction pipelines
//!
//! Orchestrate aggregate lookup, feature assembly, scaling and inference.

pub mod corners;
pub mod goals;

pub use corners::CornersPrediction;
pub use goals::GoalsPrediction;
