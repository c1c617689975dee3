// --- File: crates/bookify_config/src/lib.rs ---

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;

pub mod models;
pub use models::{AppConfig, NotifyConfig, OutlookConfig, SchedulingConfig, ServerConfig};

static DOTENV: Lazy<()> = Lazy::new(|| {
    dotenv::dotenv().ok();
});

/// Loads `.env` into the process environment exactly once.
pub fn ensure_dotenv_loaded() {
    Lazy::force(&DOTENV);
}

/// Loads the unified application configuration.
///
/// Sources, later ones overriding earlier ones:
/// 1. `config/default.*`
/// 2. `config/{RUN_ENV}.*` (RUN_ENV defaults to "development")
/// 3. environment variables prefixed `APP`, `__` as section separator
///    (e.g. `APP_OUTLOOK__CLIENT_SECRET`)
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

    Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8086)?
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}
