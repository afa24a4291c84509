pub mod config;
pub mod error;

pub use config::{
    Config, LocationConfig, NewsConfig, PreferencesConfig, ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError};

use anyhow::Result;

/// Initialize logging. Safe to call more than once.
pub fn init() -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    if installed.is_ok() {
        tracing::info!("Moodcast core initialized");
    }
    Ok(())
}
