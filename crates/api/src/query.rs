//! Query parameter types shared across handler modules.

use clima_core::types::Timestamp;
use serde::Deserialize;

/// `?skip=&limit=` paging. Clamped in the repository layer.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// `?start=&end=` as RFC 3339 timestamps. Missing bounds fall back to the
/// default 24-hour window.
#[derive(Debug, Default, Deserialize)]
pub struct TimeWindowParams {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

/// `?country=&city=&start=&end=` for location reads.
#[derive(Debug, Deserialize)]
pub struct LocationWindowParams {
    pub country: String,
    pub city: String,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}
