//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the database row and,
//! where rows are created through this crate, a `Deserialize` create DTO.
//! Rows convert into the validated `clima_core` types at the boundary.

pub mod alert;
pub mod alert_rule;
pub mod measurement;
pub mod sensor;
pub mod stream;
