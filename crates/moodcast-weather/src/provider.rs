//! OpenWeatherMap client: current conditions plus a five-day sampled forecast.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::types::{Coordinates, FetchStage, TemperatureUnit, Weather, WeatherError};

pub const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// The forecast endpoint reports 3-hour periods; every 8th one is a day apart.
const FORECAST_STRIDE: usize = 8;
const FORECAST_DAYS: usize = 5;

/// Source of weather snapshots for a position and unit system.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch current conditions and forecast. Both must succeed.
    async fn fetch(
        &self,
        coordinates: Coordinates,
        unit: TemperatureUnit,
    ) -> Result<Weather, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[instrument(skip(self), level = "info")]
    async fn current(
        &self,
        coordinates: Coordinates,
        unit: TemperatureUnit,
    ) -> Result<openweather::CurrentResponse, WeatherError> {
        self.get_json(FetchStage::Weather, "weather", coordinates, unit)
            .await
    }

    #[instrument(skip(self), level = "info")]
    async fn forecast(
        &self,
        coordinates: Coordinates,
        unit: TemperatureUnit,
    ) -> Result<openweather::ForecastResponse, WeatherError> {
        self.get_json(FetchStage::Forecast, "forecast", coordinates, unit)
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        stage: FetchStage,
        endpoint: &str,
        coordinates: Coordinates,
        unit: TemperatureUnit,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(
            "GET {} lat={} lon={} units={}",
            url,
            coordinates.latitude,
            coordinates.longitude,
            unit.api_units()
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("units", unit.api_units().to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::network(stage, e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!("{} API error: {} {}", stage, status, text);
            return Err(WeatherError::network(stage, format!("{}: {}", status, text)));
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::network(stage, format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn fetch(
        &self,
        coordinates: Coordinates,
        unit: TemperatureUnit,
    ) -> Result<Weather, WeatherError> {
        let (current, forecast) = tokio::try_join!(
            self.current(coordinates, unit),
            self.forecast(coordinates, unit)
        )?;

        let weather = openweather::into_weather(current, &forecast, unit)?;
        tracing::info!(
            "Weather for {}, {}: {}{}, {}",
            weather.location_name,
            weather.country_code,
            weather.temperature,
            unit.symbol(),
            weather.condition.description()
        );
        Ok(weather)
    }
}

/// OpenWeatherMap payloads and their mapping into domain types
mod openweather {
    use chrono::{DateTime, FixedOffset};
    use serde::Deserialize;

    use super::{FORECAST_DAYS, FORECAST_STRIDE};
    use crate::types::{
        FetchStage, ForecastDay, TemperatureUnit, Weather, WeatherCondition, WeatherError,
    };

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub main: MainBlock,
        #[serde(default)]
        pub wind: Wind,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub sys: Sys,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        #[serde(default)]
        pub main: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainBlock {
        pub temp: f64,
        #[serde(default)]
        pub humidity: f64,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Wind {
        #[serde(default)]
        pub speed: f64,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Sys {
        pub country: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastEntry>,
        pub city: Option<City>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastEntry {
        pub dt: i64,
        pub main: MainBlock,
        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct City {
        /// Shift from UTC in seconds
        pub timezone: Option<i32>,
    }

    pub fn into_weather(
        current: CurrentResponse,
        forecast: &ForecastResponse,
        unit: TemperatureUnit,
    ) -> Result<Weather, WeatherError> {
        let condition = current
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::network(FetchStage::Weather, "missing conditions"))?;

        Ok(Weather {
            temperature: current.main.temp.round(),
            unit,
            condition: WeatherCondition::from_provider(&condition.main),
            description: condition.description,
            humidity: current.main.humidity.round().clamp(0.0, 100.0) as u8,
            wind_speed: current.wind.speed.round(),
            icon: condition.icon,
            location_name: current.name,
            country_code: current.sys.country.unwrap_or_default(),
            forecast: forecast_days(forecast),
        })
    }

    pub fn forecast_days(forecast: &ForecastResponse) -> Vec<ForecastDay> {
        let offset = forecast
            .city
            .as_ref()
            .and_then(|c| c.timezone)
            .and_then(FixedOffset::east_opt);

        forecast
            .list
            .iter()
            .step_by(FORECAST_STRIDE)
            .take(FORECAST_DAYS)
            .map(|entry| {
                let (condition, icon) = entry
                    .weather
                    .first()
                    .map(|c| (WeatherCondition::from_provider(&c.main), c.icon.clone()))
                    .unwrap_or((WeatherCondition::Other, String::new()));

                ForecastDay {
                    label: weekday_label(entry.dt, offset),
                    temperature: entry.main.temp.round(),
                    condition,
                    icon,
                }
            })
            .collect()
    }

    fn weekday_label(timestamp: i64, offset: Option<FixedOffset>) -> String {
        match (DateTime::from_timestamp(timestamp, 0), offset) {
            (Some(utc), Some(offset)) => utc.with_timezone(&offset).format("%a").to_string(),
            (Some(utc), None) => utc.format("%a").to_string(),
            (None, _) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeatherCondition;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// 2024-01-01T00:00:00Z, a Monday
    const MONDAY_MIDNIGHT: i64 = 1_704_067_200;

    fn current_body(temp: f64) -> serde_json::Value {
        serde_json::json!({
            "weather": [{"main": "Clouds", "description": "broken clouds", "icon": "04d"}],
            "main": {"temp": temp, "humidity": 64},
            "wind": {"speed": 3.6},
            "name": "Chennai",
            "sys": {"country": "IN"}
        })
    }

    fn forecast_body(periods: usize, timezone: i32) -> serde_json::Value {
        let list: Vec<serde_json::Value> = (0..periods)
            .map(|i| {
                serde_json::json!({
                    "dt": MONDAY_MIDNIGHT + (i as i64) * 3 * 3600,
                    "main": {"temp": i as f64 + 0.4, "humidity": 50},
                    "weather": [{"main": if i % 16 == 0 { "Rain" } else { "Clear" }, "description": "", "icon": "10d"}]
                })
            })
            .collect();
        serde_json::json!({"list": list, "city": {"timezone": timezone}})
    }

    async fn mount_ok(server: &MockServer, units: &str, temp: f64) {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("units", units))
            .and(query_param("appid", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(temp)))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("units", units))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40, 0)))
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> WeatherClient {
        WeatherClient::with_base_url("test_key", &server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_maps_current_conditions() {
        let server = MockServer::start().await;
        mount_ok(&server, "metric", 31.6).await;

        let weather = client(&server)
            .fetch(Coordinates::new(13.0827, 80.2707), TemperatureUnit::Celsius)
            .await
            .unwrap();

        assert_eq!(weather.temperature, 32.0);
        assert_eq!(weather.unit, TemperatureUnit::Celsius);
        assert_eq!(weather.condition, WeatherCondition::Clouds);
        assert_eq!(weather.description, "broken clouds");
        assert_eq!(weather.humidity, 64);
        assert_eq!(weather.wind_speed, 4.0);
        assert_eq!(weather.icon, "04d");
        assert_eq!(weather.location_name, "Chennai");
        assert_eq!(weather.country_code, "IN");
    }

    #[tokio::test]
    async fn test_forecast_samples_every_eighth_period() {
        let server = MockServer::start().await;
        mount_ok(&server, "metric", 20.0).await;

        let weather = client(&server)
            .fetch(Coordinates::new(13.0827, 80.2707), TemperatureUnit::Celsius)
            .await
            .unwrap();

        let temps: Vec<f64> = weather.forecast.iter().map(|d| d.temperature).collect();
        assert_eq!(temps, vec![0.0, 8.0, 16.0, 24.0, 32.0]);

        let labels: Vec<&str> = weather.forecast.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri"]);

        assert_eq!(weather.forecast[0].condition, WeatherCondition::Rain);
        assert_eq!(weather.forecast[1].condition, WeatherCondition::Clear);
    }

    #[tokio::test]
    async fn test_short_forecast_yields_fewer_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(10.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(17, 0)))
            .mount(&server)
            .await;

        let weather = client(&server)
            .fetch(Coordinates::new(0.0, 0.0), TemperatureUnit::Celsius)
            .await
            .unwrap();

        assert_eq!(weather.forecast.len(), 3);
    }

    #[tokio::test]
    async fn test_forecast_labels_use_location_offset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(10.0)))
            .mount(&server)
            .await;
        // UTC-5: Monday midnight UTC is still Sunday evening locally
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(8, -5 * 3600)))
            .mount(&server)
            .await;

        let weather = client(&server)
            .fetch(Coordinates::new(40.7128, -74.0060), TemperatureUnit::Celsius)
            .await
            .unwrap();

        assert_eq!(weather.forecast[0].label, "Sun");
    }

    #[tokio::test]
    async fn test_imperial_units_threaded_into_both_requests() {
        let server = MockServer::start().await;
        mount_ok(&server, "imperial", 86.2).await;

        let weather = client(&server)
            .fetch(Coordinates::new(13.0827, 80.2707), TemperatureUnit::Fahrenheit)
            .await
            .unwrap();

        assert_eq!(weather.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(weather.temperature, 86.0);
    }

    #[tokio::test]
    async fn test_current_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40, 0)))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch(Coordinates::new(0.0, 0.0), TemperatureUnit::Celsius)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to fetch weather");
        assert_eq!(err.stage(), Some(FetchStage::Weather));
    }

    #[tokio::test]
    async fn test_forecast_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(10.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch(Coordinates::new(0.0, 0.0), TemperatureUnit::Celsius)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to fetch forecast");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40, 0)))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch(Coordinates::new(0.0, 0.0), TemperatureUnit::Celsius)
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(FetchStage::Weather));
    }

    #[tokio::test]
    async fn test_missing_conditions_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "weather": [],
                "main": {"temp": 10.0, "humidity": 40},
                "name": "Nowhere"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(8, 0)))
            .mount(&server)
            .await;

        let result = client(&server)
            .fetch(Coordinates::new(0.0, 0.0), TemperatureUnit::Celsius)
            .await;

        assert!(matches!(result, Err(WeatherError::Network { stage: FetchStage::Weather, .. })));
    }
}
