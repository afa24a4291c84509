use serde::{Deserialize, Serialize};

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Value of the provider's `units` query parameter.
    pub fn api_units(self) -> &'static str {
        match self {
            Self::Celsius => "metric",
            Self::Fahrenheit => "imperial",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Normalize a temperature expressed in this unit to Celsius.
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }
}

/// Weather condition groups as reported by the provider's `weather[0].main`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Other,
}

impl WeatherCondition {
    /// Map the provider's condition group name. Unknown groups (Haze, Dust, ...) become `Other`.
    pub fn from_provider(main: &str) -> Self {
        match main.trim().to_ascii_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "rain" => Self::Rain,
            "drizzle" => Self::Drizzle,
            "thunderstorm" => Self::Thunderstorm,
            "snow" => Self::Snow,
            "mist" => Self::Mist,
            "fog" => Self::Fog,
            _ => Self::Other,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
            Self::Fog => "Fog",
            Self::Other => "Other",
        }
    }
}

/// Geographic position used for one fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One sampled forecast period (roughly one per day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Short weekday name, e.g. "Mon"
    pub label: String,
    pub temperature: f64,
    pub condition: WeatherCondition,
    /// Provider icon code, e.g. "04d"
    pub icon: String,
}

/// Current conditions plus a short forecast, in a single unit system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: f64,
    pub unit: TemperatureUnit,
    pub condition: WeatherCondition,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub icon: String,
    pub location_name: String,
    /// ISO 3166 alpha-2 code as reported by the provider
    pub country_code: String,
    pub forecast: Vec<ForecastDay>,
}

/// Request stage that produced a weather failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Weather,
    Forecast,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStage::Weather => write!(f, "weather"),
            FetchStage::Forecast => write!(f, "forecast"),
        }
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Non-success status, transport failure or unparseable payload for one request.
    /// The display text is what the user sees.
    #[error("Failed to fetch {stage}")]
    Network { stage: FetchStage, detail: String },
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl WeatherError {
    pub fn network(stage: FetchStage, detail: impl Into<String>) -> Self {
        Self::Network {
            stage,
            detail: detail.into(),
        }
    }

    pub fn stage(&self) -> Option<FetchStage> {
        match self {
            Self::Network { stage, .. } => Some(*stage),
            Self::Client(_) => None,
        }
    }
}
