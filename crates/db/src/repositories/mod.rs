//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod alert_repo;
pub mod alert_rule_repo;
pub mod alert_stream_repo;
pub mod measurement_repo;
pub mod sensor_repo;

pub use alert_repo::AlertRepo;
pub use alert_rule_repo::AlertRuleRepo;
pub use alert_stream_repo::AlertStreamRepo;
pub use measurement_repo::MeasurementRepo;
pub use sensor_repo::SensorRepo;
