//! Centralized error types for the Moodcast application.
//!
//! Service crates own their error enums; this module folds them into one
//! hierarchy with user-facing messages for display.

use moodcast_news::NewsError;
use moodcast_weather::{LocationError, WeatherError};
use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("News service error: {0}")]
    News(#[from] NewsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Location(e) => location_message(e).to_string(),
            AppError::Weather(e) => weather_message(e),
            AppError::News(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

fn location_message(error: &LocationError) -> &'static str {
    match error {
        LocationError::PermissionDenied => "Location access denied. Showing default city.",
        LocationError::ServiceUnavailable => "Location unavailable. Showing default city.",
        LocationError::Timeout => "Location timed out. Showing default city.",
        LocationError::Other(_) => "Could not determine location. Showing default city.",
    }
}

fn weather_message(error: &WeatherError) -> String {
    match error {
        // "Failed to fetch weather" / "Failed to fetch forecast"
        WeatherError::Network { .. } => error.to_string(),
        WeatherError::Client(_) => {
            "Weather service unavailable. Please try again later.".to_string()
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::MissingSetting(_) => {
                "A required setting is missing. Check your settings."
            }
        }
    }
}
