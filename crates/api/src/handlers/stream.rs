//! Real-time alert delivery over HTTP.
//!
//! Two ways to follow the alert stream:
//! - `GET /alerts/stream` answers one bounded-wait read, for polling
//!   clients that keep their own cursor.
//! - `GET /alerts/stream/live` holds a Server-Sent Events connection fed by
//!   an [`AlertFeed`]. Each event's id is its stream entry id, so a
//!   reconnecting browser resumes through `Last-Event-ID`.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use clima_events::{AlertFeed, EntryId, StreamEntry};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Entries per long-poll read when `count` is not given.
const DEFAULT_READ_COUNT: usize = 10;

/// Cursor value meaning "only entries appended from now on".
const LATEST_CURSOR: &str = "$";

/// Entries buffered between a feed and its SSE connection.
const FEED_BUFFER: usize = 32;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Exclusive cursor: `0` (default) for the beginning, `$` for the
    /// newest entry, otherwise a previously seen entry id.
    pub after: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StreamBatch {
    pub entries: Vec<StreamEntry>,
    /// Pass back as `after` on the next read.
    pub cursor: EntryId,
}

/// GET /alerts/stream
///
/// Returns as soon as entries after the cursor exist, or an empty batch
/// once the stream's block timeout passes.
pub async fn read_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> AppResult<Json<DataResponse<StreamBatch>>> {
    let after = resolve_cursor(&state, query.after.as_deref()).await?;
    let count = query.count.unwrap_or(DEFAULT_READ_COUNT);

    let cancel = state.shutdown.child_token();
    let entries = state.stream().read(count, after, &cancel).await?;
    let cursor = entries.last().map_or(after, |e| e.entry_id);

    Ok(Json(DataResponse {
        data: StreamBatch { entries, cursor },
    }))
}

/// GET /alerts/stream/live
///
/// The feed stops when the client disconnects (the receiver is dropped) or
/// the server shuts down.
pub async fn live_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StreamQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let last_event_id = headers
        .get("last-event-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let raw = last_event_id.as_deref().or(query.after.as_deref());
    let from = resolve_cursor(&state, raw).await?;

    let (tx, rx) = mpsc::channel(FEED_BUFFER);
    let feed = AlertFeed::new(Arc::new(state.stream().clone()), state.config.feed());
    let cancel = state.shutdown.child_token();
    tokio::spawn(async move {
        feed.run(from, tx, cancel).await;
    });

    tracing::debug!(from = %from, "Live alert feed opened");

    let events = ReceiverStream::new(rx).map(|entry| Ok(to_event(&entry)));
    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)))
}

fn to_event(entry: &StreamEntry) -> Event {
    let event = Event::default()
        .id(entry.entry_id.to_string())
        .event("alert");
    match serde_json::to_string(&entry.alert) {
        Ok(json) => event.data(json),
        Err(e) => {
            tracing::error!(entry_id = %entry.entry_id, error = %e, "Failed to encode alert event");
            event.comment("unencodable entry")
        }
    }
}

async fn resolve_cursor(state: &AppState, raw: Option<&str>) -> AppResult<EntryId> {
    match raw.map(str::trim) {
        None | Some("") => Ok(EntryId::START),
        Some(LATEST_CURSOR) => Ok(state.stream().latest().await?),
        Some(other) => other.parse().map_err(AppError::Core),
    }
}
