// File: crates/bookify_outlook/src/handlers.rs
use crate::logic::{
    overlaps, parse_date_range, range_window, resolve_availability, AvailabilityQuery,
    AvailabilityResponse, BookSlotRequest, BookedEventsQuery, BookedEventsResponse,
    BookingResponse, BusinessHoursPolicy, CalendarIntegration, CancellationResponse,
};
use crate::notify::GraphMailer;
use crate::service::OutlookServiceError;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use bookify_common::services::{CalendarEvent, CalendarService};
use bookify_common::ApiError;
use bookify_config::{AppConfig, OutlookConfig};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

// Define shared state needed by the Outlook handlers
#[derive(Clone)]
pub struct OutlookState {
    pub config: Arc<AppConfig>,
    /// Calendar access behind the service trait so tests can inject a mock.
    pub calendar: Arc<dyn CalendarService<Error = OutlookServiceError>>,
    /// Absent when no notification sender is configured.
    pub mailer: Option<Arc<GraphMailer>>,
}

impl OutlookState {
    fn outlook_config(&self) -> Result<&OutlookConfig, ApiError> {
        // Ensure the Outlook feature is enabled via runtime config
        if !self.config.use_outlook {
            return Err(ApiError::service_unavailable(
                "Calendar integration is disabled.",
            ));
        }
        self.config.outlook.as_ref().ok_or_else(|| {
            warn!("use_outlook is set but the outlook config section is missing");
            ApiError::internal("Server configuration error: calendar settings missing.")
        })
    }
}

fn parse_rfc3339(value: &str, field: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::bad_request(format!("invalid {field} format (RFC 3339)")))
}

/// Handler to get available time slots.
#[axum::debug_handler]
pub async fn get_availability_handler(
    State(state): State<Arc<OutlookState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let outlook = state.outlook_config()?;
    let (range_start, range_end) =
        parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let policy = BusinessHoursPolicy::from_config(&state.config.scheduling)?;

    info!("availability request for {range_start} to {range_end}");
    let availability = resolve_availability(
        state.calendar.as_ref(),
        &outlook.mailbox,
        &policy,
        range_start,
        range_end,
    )
    .await;

    let (message, calendar_integration) = if availability.degraded {
        (
            "Calendar could not be reached; showing all business-hours slots.".to_string(),
            CalendarIntegration::Fallback,
        )
    } else {
        (
            format!("Found {} available slot(s).", availability.slots.len()),
            CalendarIntegration::Active,
        )
    };

    Ok(Json(AvailabilityResponse {
        success: true,
        available_slots: availability.slots,
        busy_slots: availability.busy_count,
        message,
        calendar_integration,
    }))
}

fn booking_description(payload: &BookSlotRequest) -> String {
    let mut description = format!("Booked by {} <{}>", payload.name, payload.email);
    if let Some(notes) = payload
        .notes
        .as_deref()
        .filter(|notes| !notes.trim().is_empty())
    {
        description.push_str("\n\n");
        description.push_str(notes.trim());
    }
    description
}

async fn send_confirmation(
    state: &OutlookState,
    payload: &BookSlotRequest,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) {
    let Some(mailer) = state.mailer.as_ref() else {
        return;
    };
    let policy = match BusinessHoursPolicy::from_config(&state.config.scheduling) {
        Ok(policy) => policy,
        Err(err) => {
            warn!("skipping confirmation mail: {err}");
            return;
        }
    };
    if let Err(err) = mailer
        .send_booking_confirmation(&payload.email, &payload.name, start, end, &policy.timezone)
        .await
    {
        // The calendar event already exists; the booking stands either way.
        warn!("confirmation mail failed: {err}");
    }
}

/// Handler to book a time slot.
#[axum::debug_handler]
pub async fn book_slot_handler(
    State(state): State<Arc<OutlookState>>,
    Json(payload): Json<BookSlotRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let outlook = state.outlook_config()?;
    let slot_start = parse_rfc3339(&payload.start_time, "startTime")?;
    let slot_end = parse_rfc3339(&payload.end_time, "endTime")?;
    if slot_end <= slot_start {
        return Err(ApiError::bad_request("endTime must be after startTime"));
    }

    // Re-check against fresh busy data: the slot may have been taken between
    // availability display and submission.
    match state
        .calendar
        .get_busy_slots(&outlook.mailbox, slot_start, slot_end)
        .await
    {
        Ok(busy) => {
            if busy
                .iter()
                .any(|b| overlaps(slot_start, slot_end, b.start, b.end))
            {
                return Err(ApiError::conflict(
                    "The requested time slot is no longer available. Please pick another time.",
                ));
            }
        }
        Err(err) => {
            // Cannot verify; let the create call below surface a hard
            // provider failure if there is one.
            warn!("could not re-check availability before booking: {err}");
        }
    }

    let event = CalendarEvent {
        start_time: slot_start.to_rfc3339(),
        end_time: slot_end.to_rfc3339(),
        summary: format!("Appointment with {}", payload.name),
        description: Some(booking_description(&payload)),
        attendee_name: Some(payload.name.clone()),
        attendee_email: Some(payload.email.clone()),
    };

    match state.calendar.create_event(&outlook.mailbox, event).await {
        Ok(created) => {
            info!("Successfully created event: {:?}", created.event_id);
            send_confirmation(&state, &payload, slot_start, slot_end).await;
            Ok(Json(BookingResponse {
                success: true,
                event_id: created.event_id,
                message: "Appointment booked successfully.".to_string(),
            }))
        }
        Err(err) => {
            warn!("Error booking slot: {err}");
            Err(ApiError::bad_gateway("Failed to book appointment."))
        }
    }
}

/// Handler to list booked events.
#[axum::debug_handler]
pub async fn get_booked_events_handler(
    State(state): State<Arc<OutlookState>>,
    Query(query): Query<BookedEventsQuery>,
) -> Result<Json<BookedEventsResponse>, ApiError> {
    let outlook = state.outlook_config()?;
    let (range_start, range_end) =
        parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let policy = BusinessHoursPolicy::from_config(&state.config.scheduling)?;
    let (window_start, window_end) = range_window(&policy, range_start, range_end);

    match state
        .calendar
        .get_booked_events(&outlook.mailbox, window_start, window_end)
        .await
    {
        Ok(events) => Ok(Json(BookedEventsResponse { events })),
        Err(err) => {
            warn!("Error fetching booked events: {err}");
            Err(ApiError::bad_gateway("Failed to fetch booked events."))
        }
    }
}

/// Handler to cancel a booking by deleting the calendar event.
#[axum::debug_handler]
pub async fn delete_event_handler(
    State(state): State<Arc<OutlookState>>,
    Path(event_id): Path<String>,
) -> Result<Json<CancellationResponse>, ApiError> {
    let outlook = state.outlook_config()?;

    match state
        .calendar
        .delete_event(&outlook.mailbox, &event_id)
        .await
    {
        Ok(()) => Ok(Json(CancellationResponse {
            success: true,
            message: "Booking cancelled.".to_string(),
        })),
        Err(OutlookServiceError::Provider { status: 404, .. }) => {
            Err(ApiError::not_found("Event not found."))
        }
        Err(err) => {
            warn!("Error deleting event {event_id}: {err}");
            Err(ApiError::bad_gateway("Failed to cancel booking."))
        }
    }
}
