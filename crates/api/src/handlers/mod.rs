pub mod alert_rules;
pub mod alerts;
pub mod measurements;
pub mod stream;
