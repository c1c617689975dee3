// --- File: crates/bookify_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! This module provides trait definitions for external services used by the
//! application. These traits allow for dependency injection and easier testing
//! by decoupling the application logic from specific provider implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// How the calendar owner reported a time range.
///
/// Only `busy` and `tentative` ranges block a slot; anything else the
/// provider reports (free, out-of-office, working elsewhere) is dropped
/// before it reaches this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyStatus {
    Busy,
    Tentative,
}

/// A time range during which the remote calendar reports the owner unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusySlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BusyStatus,
    pub subject: Option<String>,
}

/// An event to be created in the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start_time: String, // RFC 3339
    pub end_time: String,   // RFC 3339
    pub summary: String,
    pub description: Option<String>,
    pub attendee_name: Option<String>,
    pub attendee_email: Option<String>,
}

/// Outcome of creating an event in the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventResult {
    pub event_id: Option<String>,
    pub status: String,
}

/// A booked event as reported by the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedEvent {
    pub event_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub start_time: String, // RFC 3339
    pub end_time: String,   // RFC 3339
    pub status: String,     // "confirmed", "cancelled", etc.
}

/// A trait for calendar service operations.
///
/// Implementations perform a pure read for `get_busy_slots`: an empty result
/// means the calendar is genuinely open for the range, while any `Err` means
/// the calendar could not be consulted at all. Callers must not conflate the
/// two.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Get busy and tentative intervals within a specified time range.
    fn get_busy_slots(
        &self,
        mailbox: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusySlot>, Self::Error>;

    /// Create a calendar event.
    fn create_event(
        &self,
        mailbox: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error>;

    /// Get booked events within a specified time range.
    fn get_booked_events(
        &self,
        mailbox: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error>;

    /// Delete a calendar event.
    fn delete_event(&self, mailbox: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error>;
}
