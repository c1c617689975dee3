// --- File: crates/bookify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error;    // API error responses
pub mod http;     // HTTP utilities
pub mod logging;  // Logging utilities
pub mod services; // Service abstractions

// Re-export the API error type for easier access
pub use error::ApiError;

// Re-export HTTP utilities for easier access
pub use http::client::{create_client, DEFAULT_TIMEOUT_SECS};
