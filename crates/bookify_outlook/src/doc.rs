// File: crates/bookify_outlook/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    AvailabilityQuery, AvailabilityResponse, AvailableSlot, BookSlotRequest, BookedEventsQuery,
    BookedEventsResponse, BookingResponse, CalendarIntegration, CancellationResponse,
};

#[utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Available time slots, possibly in fallback mode", body = AvailabilityResponse),
        (status = 400, description = "Missing or malformed date range"),
        (status = 503, description = "Calendar integration disabled by configuration")
    )
)]
fn doc_get_availability_handler() {}

#[utoipa::path(
    post,
    path = "/book",
    request_body(content = BookSlotRequest, example = json!({
        "startTime": "2026-09-15T12:00:00Z",
        "endTime": "2026-09-15T12:30:00Z",
        "name": "Jamie Doe",
        "email": "jamie@example.com",
        "notes": "First visit"
    })),
    responses(
        (status = 200, description = "Booking result", body = BookingResponse),
        (status = 409, description = "Slot was taken between display and submission"),
        (status = 502, description = "Booking failed upstream")
    )
)]
fn doc_book_slot_handler() {}

#[utoipa::path(
    get,
    path = "/admin/bookings",
    params(BookedEventsQuery),
    responses(
        (status = 200, description = "Booked events in range", body = BookedEventsResponse),
        (status = 400, description = "Missing or malformed date range")
    )
)]
fn doc_get_booked_events_handler() {}

#[utoipa::path(
    delete,
    path = "/admin/bookings/{event_id}",
    params(
        ("event_id" = String, Path, description = "The ID of the event to cancel")
    ),
    responses(
        (status = 200, description = "Cancellation result", body = CancellationResponse),
        (status = 404, description = "Event not found")
    )
)]
fn doc_delete_event_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_get_availability_handler,
        doc_book_slot_handler,
        doc_get_booked_events_handler,
        doc_delete_event_handler
    ),
    components(
        schemas(
            AvailabilityQuery,
            AvailabilityResponse,
            AvailableSlot,
            CalendarIntegration,
            BookSlotRequest,
            BookingResponse,
            BookedEventsQuery,
            BookedEventsResponse,
            CancellationResponse
        )
    ),
    tags(
        (name = "outlook", description = "Appointment availability and booking API")
    ),
    servers(
        (url = "/api", description = "Main API prefix")
    )
)]
pub struct OutlookApiDoc;
