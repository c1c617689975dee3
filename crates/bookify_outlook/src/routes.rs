// --- File: crates/bookify_outlook/src/routes.rs ---

use crate::handlers::{
    book_slot_handler, delete_event_handler, get_availability_handler, get_booked_events_handler,
    OutlookState,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the Outlook calendar feature.
///
/// The state carries the injected calendar service and mailer; callers build
/// it once at process start.
pub fn routes(state: Arc<OutlookState>) -> Router {
    Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/book", post(book_slot_handler))
        .route("/admin/bookings", get(get_booked_events_handler))
        .route("/admin/bookings/{event_id}", delete(delete_event_handler))
        .with_state(state)
}
