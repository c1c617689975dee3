// --- File: crates/bookify_outlook/src/service.rs ---
//! Microsoft Graph calendar service implementation.
//!
//! This module provides an implementation of the CalendarService trait for a
//! Microsoft 365 mailbox, speaking the Graph REST API over a shared reqwest
//! client. Busy intervals come from `calendar/getSchedule`; only `busy` and
//! `tentative` schedule items are kept, so free or out-of-office ranges never
//! block a slot.

use bookify_common::services::{
    BookedEvent, BoxFuture, BusySlot, BusyStatus, CalendarEvent, CalendarEventResult,
    CalendarService,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::auth::GraphTokenProvider;

pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Errors that can occur when talking to Microsoft Graph.
///
/// From the availability resolver's point of view every variant means the
/// same thing: the calendar could not be consulted, which is distinct from a
/// successful lookup that found nothing.
#[derive(Error, Debug)]
pub enum OutlookServiceError {
    #[error("Graph request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Graph authentication failed: {0}")]
    Auth(String),
    #[error("Graph returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("failed to parse Graph response: {0}")]
    Parse(String),
    #[error("failed to parse time: {0}")]
    TimeParse(String),
    #[error("invalid event time range: {0}")]
    InvalidEventRange(String),
}

// --- Graph wire types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GraphDateTime {
    #[serde(rename = "dateTime")]
    pub(crate) date_time: String,
    #[serde(rename = "timeZone")]
    pub(crate) time_zone: Option<String>,
}

impl GraphDateTime {
    fn utc(instant: DateTime<Utc>) -> Self {
        Self {
            date_time: instant.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: Some("UTC".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemBody {
    content_type: String,
    content: String,
}

impl ItemBody {
    pub(crate) fn text(content: impl Into<String>) -> Self {
        Self {
            content_type: "Text".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GraphEmailAddress {
    pub(crate) address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Serialize)]
struct GraphAttendee {
    #[serde(rename = "emailAddress")]
    email_address: GraphEmailAddress,
    #[serde(rename = "type")]
    attendee_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GetScheduleRequest {
    schedules: Vec<String>,
    start_time: GraphDateTime,
    end_time: GraphDateTime,
    availability_view_interval: u32,
}

#[derive(Debug, Deserialize)]
struct GetScheduleResponse {
    #[serde(default)]
    value: Vec<ScheduleInformation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleInformation {
    #[serde(default)]
    schedule_items: Vec<ScheduleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleItem {
    status: String,
    start: GraphDateTime,
    end: GraphDateTime,
    #[serde(default)]
    subject: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphEventRequest {
    subject: String,
    body: ItemBody,
    start: GraphDateTime,
    end: GraphDateTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attendees: Vec<GraphAttendee>,
}

#[derive(Debug, Deserialize)]
struct GraphEventCreated {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphEventsPage {
    #[serde(default)]
    value: Vec<GraphCalendarEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphCalendarEvent {
    id: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body_preview: Option<String>,
    start: GraphDateTime,
    end: GraphDateTime,
    #[serde(default)]
    is_cancelled: bool,
}

/// Graph reports schedule item times as naive datetimes in the requested
/// zone; we always request UTC.
fn parse_graph_time(value: &GraphDateTime) -> Option<DateTime<Utc>> {
    let raw = value.date_time.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, OutlookServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(OutlookServiceError::Provider {
        status: status.as_u16(),
        message,
    })
}

/// Microsoft Graph calendar service implementation.
pub struct GraphCalendarService {
    client: Client,
    tokens: Arc<GraphTokenProvider>,
}

impl GraphCalendarService {
    /// Create a new Graph calendar service.
    pub fn new(client: Client, tokens: Arc<GraphTokenProvider>) -> Self {
        Self { client, tokens }
    }
}

impl CalendarService for GraphCalendarService {
    type Error = OutlookServiceError;

    /// Retrieves busy and tentative intervals for a mailbox within a time range.
    ///
    /// Free, out-of-office and working-elsewhere items are dropped here; they
    /// do not conflict with a booking. Returned intervals are sorted by start.
    fn get_busy_slots(
        &self,
        mailbox: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusySlot>, Self::Error> {
        let mailbox = mailbox.to_string();

        Box::pin(async move {
            let token = self.tokens.access_token().await?;
            let url = format!("{GRAPH_BASE_URL}/users/{mailbox}/calendar/getSchedule");
            let request = GetScheduleRequest {
                schedules: vec![mailbox.clone()],
                start_time: GraphDateTime::utc(start_time),
                end_time: GraphDateTime::utc(end_time),
                availability_view_interval: 30,
            };

            let response = self
                .client
                .post(&url)
                .bearer_auth(&token)
                .json(&request)
                .send()
                .await?;
            let response = error_for_status(response).await?;
            let schedule: GetScheduleResponse = response
                .json()
                .await
                .map_err(|err| OutlookServiceError::Parse(err.to_string()))?;

            let mut busy_slots = Vec::new();
            if let Some(info) = schedule.value.into_iter().next() {
                for item in info.schedule_items {
                    let status = match item.status.as_str() {
                        "busy" => BusyStatus::Busy,
                        "tentative" => BusyStatus::Tentative,
                        _ => continue,
                    };
                    let (Some(start), Some(end)) =
                        (parse_graph_time(&item.start), parse_graph_time(&item.end))
                    else {
                        info!(
                            "skipping schedule item with unparseable times: {:?} / {:?}",
                            item.start, item.end
                        );
                        continue;
                    };
                    busy_slots.push(BusySlot {
                        start,
                        end,
                        status,
                        subject: item.subject,
                    });
                }
            }
            // Sort busy intervals for easier processing
            busy_slots.sort_by_key(|slot| slot.start);
            Ok(busy_slots)
        })
    }

    /// Creates a new event in the mailbox calendar.
    fn create_event(
        &self,
        mailbox: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let mailbox = mailbox.to_string();

        Box::pin(async move {
            let start_dt = DateTime::parse_from_rfc3339(&event.start_time)
                .map_err(|err| {
                    OutlookServiceError::TimeParse(format!("invalid start_time: {err}"))
                })?
                .with_timezone(&Utc);
            let end_dt = DateTime::parse_from_rfc3339(&event.end_time)
                .map_err(|err| OutlookServiceError::TimeParse(format!("invalid end_time: {err}")))?
                .with_timezone(&Utc);
            if end_dt <= start_dt {
                return Err(OutlookServiceError::InvalidEventRange(
                    "end time must be after start time".to_string(),
                ));
            }

            let attendees = match &event.attendee_email {
                Some(address) => vec![GraphAttendee {
                    email_address: GraphEmailAddress {
                        address: address.clone(),
                        name: event.attendee_name.clone(),
                    },
                    attendee_type: "required".to_string(),
                }],
                None => Vec::new(),
            };

            let request = GraphEventRequest {
                subject: event.summary,
                body: ItemBody::text(event.description.unwrap_or_default()),
                start: GraphDateTime::utc(start_dt),
                end: GraphDateTime::utc(end_dt),
                attendees,
            };

            let token = self.tokens.access_token().await?;
            let url = format!("{GRAPH_BASE_URL}/users/{mailbox}/events");
            let response = self
                .client
                .post(&url)
                .bearer_auth(&token)
                .json(&request)
                .send()
                .await?;
            let response = error_for_status(response).await?;
            let created: GraphEventCreated = response
                .json()
                .await
                .map_err(|err| OutlookServiceError::Parse(err.to_string()))?;

            Ok(CalendarEventResult {
                event_id: created.id,
                status: "confirmed".to_string(),
            })
        })
    }

    /// Retrieves booked events in the mailbox calendar within a time range,
    /// sorted by start time. Cancelled events are skipped.
    fn get_booked_events(
        &self,
        mailbox: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error> {
        let mailbox = mailbox.to_string();

        Box::pin(async move {
            let token = self.tokens.access_token().await?;
            let url = format!("{GRAPH_BASE_URL}/users/{mailbox}/calendarView");
            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .header("Prefer", r#"outlook.timezone="UTC""#)
                .query(&[
                    ("startDateTime", start_time.to_rfc3339()),
                    ("endDateTime", end_time.to_rfc3339()),
                    ("$orderby", "start/dateTime".to_string()),
                    ("$top", "100".to_string()),
                ])
                .send()
                .await?;
            let response = error_for_status(response).await?;
            let page: GraphEventsPage = response
                .json()
                .await
                .map_err(|err| OutlookServiceError::Parse(err.to_string()))?;

            let mut booked_events = Vec::new();
            for event in page.value {
                if event.is_cancelled {
                    continue;
                }
                let (Some(start), Some(end)) =
                    (parse_graph_time(&event.start), parse_graph_time(&event.end))
                else {
                    info!("skipping event {} with unparseable times", event.id);
                    continue;
                };
                booked_events.push(BookedEvent {
                    event_id: event.id,
                    summary: event.subject.unwrap_or_default(),
                    description: event.body_preview,
                    start_time: start.to_rfc3339(),
                    end_time: end.to_rfc3339(),
                    status: "confirmed".to_string(),
                });
            }
            Ok(booked_events)
        })
    }

    /// Deletes an event from the mailbox calendar.
    fn delete_event(&self, mailbox: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let mailbox = mailbox.to_string();
        let event_id = event_id.to_string();

        Box::pin(async move {
            let token = self.tokens.access_token().await?;
            let url = format!("{GRAPH_BASE_URL}/users/{mailbox}/events/{event_id}");
            let response = self.client.delete(&url).bearer_auth(&token).send().await?;
            error_for_status(response).await?;
            Ok(())
        })
    }
}
