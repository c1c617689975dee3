// --- File: crates/bookify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Scheduling Config ---
// Business-hours policy the slot grid is generated from. Wall-clock times are
// interpreted in `timezone`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    #[serde(default = "default_start_time")]
    pub start_time: String, // "HH:MM"
    #[serde(default = "default_end_time")]
    pub end_time: String, // "HH:MM"
    #[serde(default = "default_slot_duration")]
    pub slot_duration_minutes: u32,
    #[serde(default = "default_timezone")]
    pub timezone: String, // IANA identifier
    #[serde(default = "default_excluded_weekdays")]
    pub excluded_weekdays: Vec<String>, // "Mon".."Sun", weekends by default
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            end_time: default_end_time(),
            slot_duration_minutes: default_slot_duration(),
            timezone: default_timezone(),
            excluded_weekdays: default_excluded_weekdays(),
        }
    }
}

fn default_start_time() -> String {
    "09:00".to_string()
}

fn default_end_time() -> String {
    "17:00".to_string()
}

fn default_slot_duration() -> u32 {
    30
}

fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

fn default_excluded_weekdays() -> Vec<String> {
    vec!["Sat".to_string(), "Sun".to_string()]
}

// --- Outlook / Microsoft Graph Config ---
// Holds non-secret Graph config. The client secret is loaded from the
// environment (APP_OUTLOOK__CLIENT_SECRET).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutlookConfig {
    pub tenant_id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Mailbox whose calendar availability is computed against and bookings
    /// are created in.
    pub mailbox: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

// --- Notification Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifyConfig {
    /// Mailbox confirmation mail is sent from.
    pub sender: String,
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_outlook: bool,

    // --- Scheduling policy (always present, defaults apply field-wise) ---
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub outlook: Option<OutlookConfig>,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
}
