//! dnote-svc library - scan intake HTTP service
//!
//! Hosts one intake session behind a single lock and exposes it over a JSON
//! API with an SSE event feed.

use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use dnote_common::config::TomlConfig;
use dnote_common::events::EventBus;
use dnote_common::intake::IntakeController;
use dnote_common::time::{Clock, SystemClock};
use dnote_common::tokens::{TokenSource, UuidTokenSource};

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The live session; every read-modify-write happens under this lock
    pub controller: Arc<Mutex<IntakeController>>,
    /// Event fan-out for SSE subscribers
    pub events: EventBus,
    /// Timestamps delivery notes
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// State on the system clock with UUID identities
    pub fn new(config: &TomlConfig) -> Self {
        Self::with_sources(config, Arc::new(SystemClock), Arc::new(UuidTokenSource))
    }

    /// State with injected clock and token source
    pub fn with_sources(
        config: &TomlConfig,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        let events = EventBus::new(config.events.capacity);
        let controller = IntakeController::new(&config.intake, clock.clone(), tokens)
            .with_event_bus(events.clone());

        Self {
            controller: Arc::new(Mutex::new(controller)),
            events,
            clock,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};

    let api = Router::new()
        .route("/api/scan", post(api::submit_scan))
        .route("/api/manual/payload", post(api::submit_manual_payload))
        .route("/api/manual", post(api::submit_manual))
        .route("/api/decode-error", post(api::decode_error))
        .route("/api/items", get(api::list_items).delete(api::clear_items))
        .route("/api/items/:identity", delete(api::remove_item))
        .route("/api/summary", get(api::get_summary))
        .route("/api/snapshot", get(api::get_snapshot))
        .route("/api/delivery-note", post(api::create_delivery_note))
        .route("/api/delivery-note/text", post(api::render_delivery_note))
        .route("/api/delivery-note/email", post(api::compose_email))
        .route("/api/events", get(api::event_stream));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
