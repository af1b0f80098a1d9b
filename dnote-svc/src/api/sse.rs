//! Server-Sent Events (SSE) broadcaster
//!
//! Each new client first receives a `SessionSnapshot`, then every
//! `IntakeEvent` published after it subscribed.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use dnote_common::events::IntakeEvent;
use dnote_common::time::Clock;
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::AppState;

fn to_sse(event: &IntakeEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_type()).data(json)),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}

/// GET /api/events
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    // Subscribe before the snapshot so nothing falls between them
    let rx = state.events.subscribe();
    let snapshot = state.controller.lock().await.snapshot();
    let connected_at = state.clock.now().with_timezone(&Utc);

    let stream = async_stream::stream! {
        let initial = IntakeEvent::SessionSnapshot {
            snapshot,
            timestamp: connected_at,
        };
        if let Some(event) = to_sse(&initial) {
            yield Ok(event);
        }

        let mut events = BroadcastStream::new(rx);
        while let Some(result) = events.next().await {
            match result {
                Ok(event) => {
                    debug!("Broadcasting SSE event: {}", event.event_type());
                    if let Some(event) = to_sse(&event) {
                        yield Ok(event);
                    }
                }
                Err(e) => warn!("SSE stream error: {:?}", e),
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
