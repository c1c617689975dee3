// --- File: crates/bookify_outlook/src/logic.rs ---
use bookify_common::services::{BusySlot, CalendarService};
use bookify_common::ApiError;
use bookify_config::SchedulingConfig;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// --- Error Handling ---
use thiserror::Error;
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("invalid date range: {0}")]
    InvalidRange(String),
    #[error("invalid business hours policy: {0}")]
    InvalidPolicy(String),
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::InvalidRange(message) => ApiError::bad_request(message),
            ScheduleError::InvalidPolicy(message) => {
                ApiError::internal(format!("Scheduling configuration error: {message}"))
            }
        }
    }
}

// --- Data Structures ---
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// Start date in YYYY-MM-DD format
    pub start_date: Option<String>,

    /// End date in YYYY-MM-DD format
    pub end_date: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub success: bool,
    pub available_slots: Vec<AvailableSlot>,
    /// Number of busy intervals the grid was filtered against.
    pub busy_slots: usize,
    pub message: String,
    pub calendar_integration: CalendarIntegration,
}

/// Whether availability was computed against live calendar data or served
/// optimistically because the calendar could not be reached.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum CalendarIntegration {
    Active,
    Fallback,
}

/// A policy-generated slot before calendar conflicts are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A bookable slot, the only thing returned to callers. `date` and `time` are
/// display fields derived from `start` in the policy timezone.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableSlot {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub start: DateTime<Utc>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub end: DateTime<Utc>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub date: NaiveDate,
    /// Wall-clock start, "HH:MM" in the policy timezone.
    pub time: String,
    pub available: bool,
}

impl AvailableSlot {
    fn from_candidate(slot: CandidateSlot, policy: &BusinessHoursPolicy) -> Self {
        let local_start = slot.start.with_timezone(&policy.timezone);
        Self {
            start: slot.start,
            end: slot.end,
            date: local_start.date_naive(),
            time: local_start.format("%H:%M").to_string(),
            available: true,
        }
    }
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BookSlotRequest {
    pub start_time: String, // RFC 3339
    pub end_time: String,   // RFC 3339
    pub name: String,
    pub email: String,
    pub notes: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub success: bool,
    pub event_id: Option<String>,
    pub message: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase")]
pub struct BookedEventsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookedEventsResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    pub events: Vec<bookify_common::services::BookedEvent>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CancellationResponse {
    pub success: bool,
    pub message: String,
}

// --- Business Hours Policy ---

/// The daily window slots are generated from. Wall-clock times are
/// interpreted in `timezone`; excluded weekdays yield no slots at all.
#[derive(Debug, Clone)]
pub struct BusinessHoursPolicy {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration: Duration,
    pub timezone: Tz,
    pub excluded_weekdays: Vec<Weekday>,
}

impl BusinessHoursPolicy {
    pub fn from_config(config: &SchedulingConfig) -> Result<Self, ScheduleError> {
        let start_time = parse_wall_clock(&config.start_time)?;
        let end_time = parse_wall_clock(&config.end_time)?;
        if start_time >= end_time {
            return Err(ScheduleError::InvalidPolicy(format!(
                "start_time {} must be before end_time {}",
                config.start_time, config.end_time
            )));
        }
        if config.slot_duration_minutes == 0 {
            return Err(ScheduleError::InvalidPolicy(
                "slot_duration_minutes must be positive".to_string(),
            ));
        }
        let timezone: Tz = config.timezone.parse().map_err(|_| {
            ScheduleError::InvalidPolicy(format!("unknown timezone: {}", config.timezone))
        })?;
        let excluded_weekdays = config
            .excluded_weekdays
            .iter()
            .map(|day| {
                day.parse::<Weekday>()
                    .map_err(|_| ScheduleError::InvalidPolicy(format!("unknown weekday: {day}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            start_time,
            end_time,
            slot_duration: Duration::minutes(i64::from(config.slot_duration_minutes)),
            timezone,
            excluded_weekdays,
        })
    }
}

fn parse_wall_clock(value: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ScheduleError::InvalidPolicy(format!("invalid time of day: {value}")))
}

/// Parses and validates an inclusive date range from raw query input.
pub fn parse_date_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<(NaiveDate, NaiveDate), ScheduleError> {
    let start_raw = start_date
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ScheduleError::InvalidRange("startDate is required".to_string()))?;
    let end_raw = end_date
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ScheduleError::InvalidRange("endDate is required".to_string()))?;
    let start = NaiveDate::parse_from_str(start_raw, "%Y-%m-%d").map_err(|_| {
        ScheduleError::InvalidRange("invalid startDate format (YYYY-MM-DD)".to_string())
    })?;
    let end = NaiveDate::parse_from_str(end_raw, "%Y-%m-%d").map_err(|_| {
        ScheduleError::InvalidRange("invalid endDate format (YYYY-MM-DD)".to_string())
    })?;
    if end < start {
        return Err(ScheduleError::InvalidRange(
            "endDate must not be before startDate".to_string(),
        ));
    }
    Ok((start, end))
}

// --- Slot Grid Generation ---

fn zoned_instant(timezone: &Tz, day: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    timezone
        .from_local_datetime(&day.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn day_slots(policy: &BusinessHoursPolicy, day: NaiveDate) -> Vec<CandidateSlot> {
    let (Some(open), Some(close)) = (
        zoned_instant(&policy.timezone, day, policy.start_time),
        zoned_instant(&policy.timezone, day, policy.end_time),
    ) else {
        // Wall-clock time falls into a DST gap; nothing is offered that day.
        debug!(
            "skipping {day}: business hours do not exist in {}",
            policy.timezone
        );
        return Vec::new();
    };

    let mut slots = Vec::new();
    let mut slot_start = open;
    loop {
        let slot_end = slot_start + policy.slot_duration;
        // A slot that would spill past closing time is dropped, never clipped.
        if slot_end > close {
            break;
        }
        slots.push(CandidateSlot {
            start: slot_start,
            end: slot_end,
        });
        slot_start = slot_end;
    }
    slots
}

/// Generates the candidate slot grid for the inclusive date range.
///
/// The sequence is lazy across days, restartable, and deterministic: calling
/// twice with the same arguments yields an identical sequence. Excluded
/// weekdays and empty ranges simply contribute nothing.
pub fn slot_grid<'a>(
    policy: &'a BusinessHoursPolicy,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> impl Iterator<Item = CandidateSlot> + 'a {
    range_start
        .iter_days()
        .take_while(move |day| *day <= range_end)
        .filter(move |day| !policy.excluded_weekdays.contains(&day.weekday()))
        .flat_map(move |day| day_slots(policy, day))
}

// --- Availability Resolution ---

/// Half-open interval intersection. Touching endpoints do not count as
/// overlapping, so back-to-back slots are both bookable.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Filters candidates against busy intervals, preserving generation order.
/// A busy interval overlapping any part of a slot removes the whole slot.
pub fn filter_available<I>(
    candidates: I,
    busy: &[BusySlot],
    policy: &BusinessHoursPolicy,
) -> Vec<AvailableSlot>
where
    I: IntoIterator<Item = CandidateSlot>,
{
    candidates
        .into_iter()
        .filter(|slot| {
            !busy
                .iter()
                .any(|b| overlaps(slot.start, slot.end, b.start, b.end))
        })
        .map(|slot| AvailableSlot::from_candidate(slot, policy))
        .collect()
}

/// UTC window covering every local instant of the inclusive date range.
pub(crate) fn range_window(
    policy: &BusinessHoursPolicy,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let day_start = NaiveTime::MIN;
    let day_end = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
    let start = zoned_instant(&policy.timezone, range_start, day_start)
        .unwrap_or_else(|| Utc.from_utc_datetime(&range_start.and_time(day_start)));
    let end = zoned_instant(&policy.timezone, range_end, day_end)
        .unwrap_or_else(|| Utc.from_utc_datetime(&range_end.and_time(day_end)));
    (start, end)
}

/// Result of an availability resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub slots: Vec<AvailableSlot>,
    pub busy_count: usize,
    pub degraded: bool,
}

/// Computes bookable slots for the range by filtering the policy grid against
/// live busy intervals.
///
/// When the busy lookup fails the full candidate grid is served with
/// `degraded` set instead of failing the request: a broken calendar
/// integration must not take the booking funnel down with it. An empty busy
/// set is not a failure, it means the calendar is wide open.
pub async fn resolve_availability<S>(
    calendar: &S,
    mailbox: &str,
    policy: &BusinessHoursPolicy,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Availability
where
    S: CalendarService + ?Sized,
{
    let (window_start, window_end) = range_window(policy, range_start, range_end);
    let candidates = slot_grid(policy, range_start, range_end);

    match calendar
        .get_busy_slots(mailbox, window_start, window_end)
        .await
    {
        Ok(busy) => {
            debug!(
                "{} busy interval(s) between {} and {}",
                busy.len(),
                window_start,
                window_end
            );
            let slots = filter_available(candidates, &busy, policy);
            Availability {
                slots,
                busy_count: busy.len(),
                degraded: false,
            }
        }
        Err(err) => {
            warn!("busy interval lookup failed, serving unfiltered policy grid: {err}");
            let slots = filter_available(candidates, &[], policy);
            Availability {
                slots,
                busy_count: 0,
                degraded: true,
            }
        }
    }
}
