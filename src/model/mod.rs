//! Trained model artifacts and inference
//!
//! Artifacts arrive pre-serialized from the training pipeline; this module
//! loads them once at startup and exposes a typed inference interface.

pub mod adapter;
pub mod artifact;
pub mod scaler;

pub use adapter::{LinearRegressor, ModelAdapter};
pub use artifact::{CornersModel, CornersScaler, GoalsModel, ModelSet};
pub use scaler::StandardScaler;
