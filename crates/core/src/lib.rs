//! Clima domain logic.
//!
//! Everything in this crate is pure: no database access, no clocks read
//! behind the caller's back. Storage and delivery live in `clima-db`,
//! `clima-events` and `clima-pipeline`.

pub mod alert;
pub mod error;
pub mod measurement;
pub mod partition;
pub mod rules;
pub mod sensor;
pub mod stats;
pub mod thresholds;
pub mod types;
