use std::sync::Arc;

use moodcast_core::PreferencesConfig;
use moodcast_news::{Article, CategorySelection, FilterMode, Mood};
use moodcast_weather::{TemperatureUnit, Weather};

use crate::phase::Phase;

/// Shown when the feed loaded fine but no source had articles
pub const EMPTY_STATE_MESSAGE: &str = "No news articles available right now. Pull to refresh.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preferences {
    pub temperature_unit: TemperatureUnit,
    pub categories: CategorySelection,
    pub filter_mode: FilterMode,
}

impl From<&PreferencesConfig> for Preferences {
    fn from(config: &PreferencesConfig) -> Self {
        Self {
            temperature_unit: config.temperature_unit,
            categories: config.categories.clone(),
            filter_mode: config.filter_mode,
        }
    }
}

/// Snapshot observed by the presentation layer.
///
/// Replaced as a whole on every commit; readers never see a half-applied update.
#[derive(Debug, Clone)]
pub struct AggregationState {
    /// Shared so a partial news refresh can check it still sees the same fetch
    pub weather: Option<Arc<Weather>>,
    pub articles: Vec<Article>,
    pub loading: bool,
    pub error: Option<String>,
    pub preferences: Preferences,
}

impl AggregationState {
    /// Start-up state: loading, no data.
    pub fn new(preferences: Preferences) -> Self {
        Self {
            weather: None,
            articles: Vec::new(),
            loading: true,
            error: None,
            preferences,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.weather.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    pub fn mood(&self) -> Option<Mood> {
        self.weather
            .as_ref()
            .map(|w| Mood::from_temperature(w.temperature, w.unit))
    }

    /// Loaded successfully, but every news source came up empty.
    pub fn is_empty_result(&self) -> bool {
        self.phase() == Phase::Ready && self.articles.is_empty()
    }
}
