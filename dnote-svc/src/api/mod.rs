//! HTTP API handlers for dnote-svc

pub mod health;
pub mod intake;
pub mod items;
pub mod report;
pub mod sse;

pub use health::health_routes;
pub use intake::{decode_error, submit_manual, submit_manual_payload, submit_scan};
pub use items::{clear_items, get_snapshot, get_summary, list_items, remove_item};
pub use report::{compose_email, create_delivery_note, render_delivery_note};
pub use sse::event_stream;
