use std::sync::Arc;

use moodcast_core::{AppError, Config};
use moodcast_news::{NewsAggregator, NewsApiClient};
use moodcast_weather::{FixedGeolocator, LocationResolver, StaticPermission, WeatherClient};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::state::Preferences;
use crate::store::AggregationStore;

/// Main application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
    store: Arc<AggregationStore>,
}

impl App {
    /// Wire the providers described by `config` on the current tokio runtime.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let runtime = Handle::try_current().map_err(anyhow::Error::from)?;
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: Config, runtime: Handle) -> Result<Self, AppError> {
        let weather = WeatherClient::with_base_url(
            config.weather.api_key()?,
            &config.weather.base_url,
            config.weather.timeout(),
        )?;

        let news_client = NewsApiClient::with_base_url(
            config.news.api_key(),
            &config.news.base_url,
            config.news.timeout(),
        )?;
        let news = NewsAggregator::new(Arc::new(news_client))
            .with_fallback_country(&config.news.fallback_country);

        let geolocator = FixedGeolocator::new(config.location.fixed_position());
        if !geolocator.is_available() {
            tracing::debug!("No device position configured");
        }
        let location = LocationResolver::new(
            Arc::new(StaticPermission(config.location.permission)),
            Arc::new(geolocator),
        )
        .with_request(config.location.request())
        .with_fallback(config.location.fallback());

        let store = AggregationStore::new(
            location,
            Arc::new(weather),
            news,
            Preferences::from(&config.preferences),
            runtime,
        );

        Ok(Self {
            config: Arc::new(config),
            store,
        })
    }

    /// Start the first full pipeline run
    pub fn initialize(&self) -> JoinHandle<()> {
        tracing::info!("Initializing application");
        self.store.refresh()
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down application");
        self.store.shutdown();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<AggregationStore> {
        &self.store
    }
}
