//! Reactive aggregation store.
//!
//! Owns [`AggregationState`] and is the only writer. Commands:
//!
//! - [`AggregationStore::refresh`] and unit changes run the full pipeline
//!   (location, weather, news).
//! - Category and filter changes re-run only the news aggregation against the
//!   weather already held, and only in the `Ready` phase.
//!
//! Each kind of run is single-flight. Starting one cancels its predecessor and
//! takes a fresh ticket; a run commits only while its ticket is current, checked
//! inside the same atomic commit that writes its results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moodcast_core::AppError;
use moodcast_news::{CategorySelection, FilterMode, Mood, NewsAggregator, NewsCategory};
use moodcast_weather::{LocationResolver, TemperatureUnit, Weather, WeatherSource};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::state::{AggregationState, Preferences};

/// Cancellation and ticketing for one kind of run
#[derive(Default)]
struct RunSlot {
    current: Mutex<Option<CancellationToken>>,
    ticket: AtomicU64,
}

impl RunSlot {
    /// Supersede the in-flight run, if any, and hand out a new ticket.
    fn begin(&self, parent: &CancellationToken) -> (u64, CancellationToken) {
        let mut current = self.current.lock();
        let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let token = parent.child_token();
        if let Some(previous) = current.replace(token.clone()) {
            previous.cancel();
        }
        (ticket, token)
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.ticket.load(Ordering::SeqCst) == ticket
    }

    fn cancel(&self) {
        let mut current = self.current.lock();
        self.ticket.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = current.take() {
            previous.cancel();
        }
    }
}

pub struct AggregationStore {
    location: LocationResolver,
    weather: Arc<dyn WeatherSource>,
    news: NewsAggregator,
    state: watch::Sender<Arc<AggregationState>>,
    pipeline: RunSlot,
    news_refresh: RunSlot,
    /// Parent of every run token; cancelled on shutdown
    root: CancellationToken,
    runtime: Handle,
}

impl AggregationStore {
    pub fn new(
        location: LocationResolver,
        weather: Arc<dyn WeatherSource>,
        news: NewsAggregator,
        preferences: Preferences,
        runtime: Handle,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(Arc::new(AggregationState::new(preferences)));

        Arc::new(Self {
            location,
            weather,
            news,
            state,
            pipeline: RunSlot::default(),
            news_refresh: RunSlot::default(),
            root: CancellationToken::new(),
            runtime,
        })
    }

    /// Current committed state
    pub fn snapshot(&self) -> Arc<AggregationState> {
        self.state.borrow().clone()
    }

    /// Receiver notified after every commit
    pub fn subscribe(&self) -> watch::Receiver<Arc<AggregationState>> {
        self.state.subscribe()
    }

    /// Run the full pipeline, superseding any run in flight.
    pub fn refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let (generation, token) = self.pipeline.begin(&self.root);
        self.news_refresh.cancel();
        self.commit(|s| {
            s.loading = true;
            s.error = None;
            true
        });
        tracing::info!("Starting pipeline run {}", generation);

        let store = Arc::clone(self);
        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => store.finish_cancelled(generation),
                _ = store.run_pipeline(generation) => {}
            }
        })
    }

    /// Returns the handle of the pipeline re-run, if one was started.
    pub fn set_temperature_unit(
        self: &Arc<Self>,
        unit: TemperatureUnit,
    ) -> Option<JoinHandle<()>> {
        let mut previous_phase = None;
        self.commit(|s| {
            if s.preferences.temperature_unit == unit {
                return false;
            }
            previous_phase = Some(s.phase());
            s.preferences.temperature_unit = unit;
            true
        });

        let phase = previous_phase?;
        tracing::info!("Temperature unit set to {:?}", unit);
        if phase.reruns_on_unit_change() {
            Some(self.refresh())
        } else {
            None
        }
    }

    pub fn set_categories(self: &Arc<Self>, categories: CategorySelection) -> Option<JoinHandle<()>> {
        let changed = self.commit(|s| {
            if s.preferences.categories == categories {
                return false;
            }
            s.preferences.categories = categories;
            true
        });

        if changed {
            self.refresh_news()
        } else {
            None
        }
    }

    /// Add or remove one category. Removing the last one does nothing.
    pub fn toggle_category(self: &Arc<Self>, category: NewsCategory) -> Option<JoinHandle<()>> {
        if self.commit(|s| s.preferences.categories.toggle(category)) {
            self.refresh_news()
        } else {
            tracing::debug!("Toggle of {} left categories unchanged", category);
            None
        }
    }

    pub fn set_filter_mode(self: &Arc<Self>, mode: FilterMode) -> Option<JoinHandle<()>> {
        let changed = self.commit(|s| {
            if s.preferences.filter_mode == mode {
                return false;
            }
            s.preferences.filter_mode = mode;
            true
        });

        if changed {
            self.refresh_news()
        } else {
            None
        }
    }

    /// Cancel every run in flight. Later runs are cancelled on start.
    pub fn shutdown(&self) {
        tracing::info!("Aggregation store shutting down");
        self.root.cancel();
    }

    /// Apply `update` to a copy of the state and publish it if it returns true.
    fn commit(&self, update: impl FnOnce(&mut AggregationState) -> bool) -> bool {
        self.state.send_if_modified(|current| {
            let mut next = AggregationState::clone(current);
            if update(&mut next) {
                *current = Arc::new(next);
                true
            } else {
                false
            }
        })
    }

    fn news_preferences(&self) -> (CategorySelection, FilterMode) {
        let state = self.snapshot();
        (
            state.preferences.categories.clone(),
            state.preferences.filter_mode,
        )
    }

    async fn run_pipeline(&self, generation: u64) {
        let unit = self.snapshot().preferences.temperature_unit;
        let coordinates = self.location.resolve().await;

        let weather = match self.weather.fetch(coordinates, unit).await {
            Ok(weather) => Arc::new(weather),
            Err(e) => {
                tracing::error!("Weather fetch failed: {:?}", e);
                let message = AppError::from(e).user_message();
                self.commit(|s| {
                    if !self.pipeline.is_current(generation) {
                        return false;
                    }
                    s.loading = false;
                    s.error = Some(message);
                    true
                });
                return;
            }
        };

        let mood = Mood::from_temperature(weather.temperature, weather.unit);
        let mut wanted = self.news_preferences();

        loop {
            let articles = self
                .news
                .aggregate(mood, &weather.country_code, &wanted.0, wanted.1)
                .await;

            let mut changed_to = None;
            let committed = self.commit(|s| {
                if !self.pipeline.is_current(generation) {
                    return false;
                }
                let current = (s.preferences.categories.clone(), s.preferences.filter_mode);
                if current != wanted {
                    changed_to = Some(current);
                    return false;
                }
                s.weather = Some(Arc::clone(&weather));
                s.articles = articles;
                s.loading = false;
                s.error = None;
                true
            });

            match changed_to {
                Some(latest) => {
                    tracing::debug!("News preferences changed during run {}, aggregating again", generation);
                    wanted = latest;
                }
                None => {
                    if committed {
                        tracing::info!("Pipeline run {} committed ({})", generation, mood);
                    } else {
                        tracing::debug!("Pipeline run {} superseded, discarding results", generation);
                    }
                    return;
                }
            }
        }
    }

    fn finish_cancelled(&self, generation: u64) {
        let cleared = self.commit(|s| {
            if !self.pipeline.is_current(generation) || !s.loading {
                return false;
            }
            s.loading = false;
            true
        });
        if cleared {
            tracing::debug!("Pipeline run {} cancelled", generation);
        }
    }

    /// Re-run news aggregation against the weather already held.
    fn refresh_news(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let snapshot = self.snapshot();
        if !snapshot.phase().can_refresh_news() {
            tracing::debug!("News refresh skipped in {:?} phase", snapshot.phase());
            return None;
        }
        let weather = snapshot.weather.clone()?;

        let (ticket, token) = self.news_refresh.begin(&self.root);
        let store = Arc::clone(self);
        Some(self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => tracing::debug!("News refresh {} cancelled", ticket),
                _ = store.run_news_refresh(ticket, weather) => {}
            }
        }))
    }

    async fn run_news_refresh(&self, ticket: u64, weather: Arc<Weather>) {
        let (categories, filter_mode) = self.news_preferences();
        let mood = Mood::from_temperature(weather.temperature, weather.unit);

        let result = self
            .news
            .aggregate_detailed(mood, &weather.country_code, &categories, filter_mode)
            .await;
        if result.tier.is_none() {
            tracing::warn!("News refresh found no articles");
        }

        let committed = self.commit(|s| {
            let same_weather = s
                .weather
                .as_ref()
                .is_some_and(|held| Arc::ptr_eq(held, &weather));
            if !self.news_refresh.is_current(ticket) || s.loading || !same_weather {
                return false;
            }
            s.articles = result.articles;
            true
        });

        if committed {
            tracing::info!("News refresh {} committed", ticket);
        } else {
            tracing::debug!("News refresh {} outdated, discarding results", ticket);
        }
    }
}
