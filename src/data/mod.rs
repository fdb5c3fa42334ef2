//! Historical match data storage
//!
//! SQLite-backed accessor for fixture aggregates and head-to-head records.

pub mod database;

pub use database::{AggregateRecord, Database, HeadToHeadMatch};
