//! Alert stream and real-time delivery.
//!
//! - [`AlertStream`]: append-only, monotonically ordered log of created
//!   alerts with a bounded-wait (long-poll) read.
//! - [`EntryId`]: the resumable consumer cursor.
//! - [`AlertPayload`]: the wire format stored in each entry.
//! - [`AlertFeed`]: the delivery loop that keeps a subscriber fed from a
//!   cursor, retrying after transient read errors.

pub mod cursor;
pub mod error;
pub mod feed;
pub mod payload;
pub mod stream;

pub use cursor::EntryId;
pub use error::StreamError;
pub use feed::{AlertFeed, FeedConfig};
pub use payload::AlertPayload;
pub use stream::{AlertStream, StreamConfig, StreamEntry, StreamSource};
