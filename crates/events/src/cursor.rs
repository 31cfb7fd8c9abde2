//! Stream entry ids and the consumer cursor.

use std::fmt;
use std::str::FromStr;

use clima_core::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A stream entry id.
///
/// Ids are assigned by the store, strictly increasing in append order.
/// `EntryId::START` (`"0"`) is the cursor sentinel meaning "from the
/// beginning"; no real entry carries it. On the wire an id is a decimal
/// string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(i64);

impl EntryId {
    pub const START: EntryId = EntryId(0);

    pub fn new(raw: i64) -> Self {
        Self(raw.max(0))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_start(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::Validation(format!("Invalid stream cursor '{s}'")));
        }
        trimmed
            .parse::<i64>()
            .map(EntryId)
            .map_err(|_| CoreError::Validation(format!("Stream cursor out of range '{s}'")))
    }
}

impl Serialize for EntryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
