#[cfg(test)]
mod tests {
    use crate::handlers::{
        book_slot_handler, delete_event_handler, get_availability_handler, OutlookState,
    };
    use crate::logic::{AvailabilityQuery, BookSlotRequest, CalendarIntegration};
    use crate::service::mock::MockCalendarService;
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::Json;
    use bookify_common::services::{BusySlot, BusyStatus};
    use bookify_config::{AppConfig, OutlookConfig, SchedulingConfig, ServerConfig};
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Europe::Paris;
    use std::sync::Arc;

    fn test_config(use_outlook: bool) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8086,
            },
            use_outlook,
            scheduling: SchedulingConfig {
                start_time: "14:00".to_string(),
                end_time: "16:30".to_string(),
                slot_duration_minutes: 30,
                timezone: "Europe/Paris".to_string(),
                excluded_weekdays: vec!["Sat".to_string(), "Sun".to_string()],
            },
            outlook: Some(OutlookConfig {
                tenant_id: "test-tenant".to_string(),
                client_id: "test-client".to_string(),
                client_secret: None,
                mailbox: "bookings@example.com".to_string(),
                timeout_secs: None,
            }),
            notify: None,
        })
    }

    fn state_with(calendar: MockCalendarService, use_outlook: bool) -> Arc<OutlookState> {
        Arc::new(OutlookState {
            config: test_config(use_outlook),
            calendar: Arc::new(calendar),
            mailer: None,
        })
    }

    fn range_query(start: &str, end: &str) -> Query<AvailabilityQuery> {
        Query(AvailabilityQuery {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        })
    }

    fn paris(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Paris
            .with_ymd_and_hms(2025, 5, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn busy(start: DateTime<Utc>, end: DateTime<Utc>) -> BusySlot {
        BusySlot {
            start,
            end,
            status: BusyStatus::Busy,
            subject: None,
        }
    }

    fn booking(day: u32, hour: u32, minute: u32) -> BookSlotRequest {
        let start = paris(day, hour, minute);
        BookSlotRequest {
            start_time: start.to_rfc3339(),
            end_time: (start + chrono::Duration::minutes(30)).to_rfc3339(),
            name: "Jamie Doe".to_string(),
            email: "jamie@example.com".to_string(),
            notes: Some("first visit".to_string()),
        }
    }

    #[tokio::test]
    async fn availability_requires_both_dates() {
        let state = state_with(MockCalendarService::new(), true);
        let err = get_availability_handler(
            State(state),
            Query(AvailabilityQuery {
                start_date: None,
                end_date: Some("2025-05-06".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn availability_rejects_malformed_dates() {
        let state = state_with(MockCalendarService::new(), true);
        let err = get_availability_handler(State(state), range_query("05/06/2025", "2025-05-06"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn availability_answers_503_when_disabled() {
        let state = state_with(MockCalendarService::new(), false);
        let err = get_availability_handler(State(state), range_query("2025-05-06", "2025-05-06"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn availability_filters_against_live_busy_data() {
        let calendar =
            MockCalendarService::with_busy(vec![busy(paris(6, 15, 0), paris(6, 15, 30))]);
        let state = state_with(calendar, true);

        let Json(response) =
            get_availability_handler(State(state), range_query("2025-05-06", "2025-05-06"))
                .await
                .unwrap();

        assert!(response.success);
        assert_eq!(response.calendar_integration, CalendarIntegration::Active);
        assert_eq!(response.busy_slots, 1);
        assert_eq!(response.available_slots.len(), 4);
        assert!(response
            .available_slots
            .iter()
            .all(|slot| slot.time != "15:00"));
    }

    #[tokio::test]
    async fn availability_degrades_to_full_grid_when_calendar_down() {
        let state = state_with(MockCalendarService::failing(), true);

        let Json(response) =
            get_availability_handler(State(state), range_query("2025-05-06", "2025-05-06"))
                .await
                .unwrap();

        // Still HTTP success: a broken integration must not empty the funnel
        assert!(response.success);
        assert_eq!(response.calendar_integration, CalendarIntegration::Fallback);
        assert_eq!(response.busy_slots, 0);
        assert_eq!(response.available_slots.len(), 5);
    }

    #[tokio::test]
    async fn booking_conflicts_when_slot_was_taken() {
        let calendar =
            MockCalendarService::with_busy(vec![busy(paris(6, 14, 0), paris(6, 14, 30))]);
        let state = state_with(calendar, true);

        let err = book_slot_handler(State(state), Json(booking(6, 14, 0)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn booking_re_checks_before_creating_the_event() {
        let state = state_with(MockCalendarService::new(), true);

        let Json(response) = book_slot_handler(State(state.clone()), Json(booking(6, 14, 0)))
            .await
            .unwrap();
        assert!(response.success);
        assert!(response.event_id.is_some());

        // The same slot booked again must now conflict
        let err = book_slot_handler(State(state), Json(booking(6, 14, 0)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn back_to_back_bookings_do_not_conflict() {
        let state = state_with(MockCalendarService::new(), true);

        let Json(first) = book_slot_handler(State(state.clone()), Json(booking(6, 14, 0)))
            .await
            .unwrap();
        assert!(first.success);

        let Json(second) = book_slot_handler(State(state), Json(booking(6, 14, 30)))
            .await
            .unwrap();
        assert!(second.success);
    }

    #[tokio::test]
    async fn booking_rejects_inverted_time_range() {
        let state = state_with(MockCalendarService::new(), true);
        let start = paris(6, 14, 0);
        let payload = BookSlotRequest {
            start_time: start.to_rfc3339(),
            end_time: (start - chrono::Duration::minutes(30)).to_rfc3339(),
            name: "Jamie Doe".to_string(),
            email: "jamie@example.com".to_string(),
            notes: None,
        };
        let err = book_slot_handler(State(state), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cancelling_unknown_event_is_not_found() {
        let state = state_with(MockCalendarService::new(), true);
        let err = delete_event_handler(State(state), Path("missing-event".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
