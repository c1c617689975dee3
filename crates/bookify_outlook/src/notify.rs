// --- File: crates/bookify_outlook/src/notify.rs ---
//! Booking confirmation mail via Graph sendMail.
//!
//! Delivery is best-effort: the calendar event is authoritative and callers
//! only log a failed send.

use crate::auth::GraphTokenProvider;
use crate::service::{GraphEmailAddress, ItemBody, OutlookServiceError, GRAPH_BASE_URL};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailRequest {
    message: MailMessage,
    save_to_sent_items: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MailMessage {
    subject: String,
    body: ItemBody,
    to_recipients: Vec<Recipient>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Recipient {
    email_address: GraphEmailAddress,
}

/// Sends confirmation mail from a configured mailbox.
pub struct GraphMailer {
    client: Client,
    tokens: Arc<GraphTokenProvider>,
    sender: String,
}

impl GraphMailer {
    pub fn new(client: Client, tokens: Arc<GraphTokenProvider>, sender: String) -> Self {
        Self {
            client,
            tokens,
            sender,
        }
    }

    /// Mails the requester that their appointment is confirmed. Times are
    /// rendered in the business timezone.
    pub async fn send_booking_confirmation(
        &self,
        to_email: &str,
        to_name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        timezone: &Tz,
    ) -> Result<(), OutlookServiceError> {
        let local_start = start.with_timezone(timezone);
        let local_end = end.with_timezone(timezone);
        let subject = format!(
            "Appointment confirmed for {}",
            local_start.format("%A, %B %e")
        );
        let content = format!(
            "Hello {to_name},\n\nYour appointment is confirmed for {} from {} to {} ({}).\n\nSee you then!",
            local_start.format("%A, %B %e %Y"),
            local_start.format("%H:%M"),
            local_end.format("%H:%M"),
            timezone,
        );

        let request = SendMailRequest {
            message: MailMessage {
                subject,
                body: ItemBody::text(content),
                to_recipients: vec![Recipient {
                    email_address: GraphEmailAddress {
                        address: to_email.to_string(),
                        name: Some(to_name.to_string()),
                    },
                }],
            },
            save_to_sent_items: false,
        };

        let token = self.tokens.access_token().await?;
        let url = format!("{GRAPH_BASE_URL}/users/{}/sendMail", self.sender);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OutlookServiceError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        info!("confirmation mail sent to {to_email}");
        Ok(())
    }
}
