//! Ordered news fallback chain.
//!
//! Up to three attempts, stopping at the first that yields at least one
//! article after normalization:
//!
//! 1. mood search (weather-based filter mode only)
//! 2. headlines for the resolved country, if the provider supports it
//! 3. headlines for the fallback country
//!
//! Every failure is logged and advances the chain. Exhausting it yields an
//! empty list, never an error.

use std::future::Future;
use std::sync::Arc;

use crate::client::NewsSource;
use crate::countries::{self, DEFAULT_COUNTRY};
use crate::error::NewsError;
use crate::mood::Mood;
use crate::normalizer::normalize;
use crate::types::{Article, CategorySelection, FilterMode, RawArticle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    WeatherQuery,
    CountryHeadlines,
    GlobalHeadlines,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::WeatherQuery => write!(f, "weather query"),
            Tier::CountryHeadlines => write!(f, "country headlines"),
            Tier::GlobalHeadlines => write!(f, "global headlines"),
        }
    }
}

/// Result of one run of the chain
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub articles: Vec<Article>,
    /// Tier that produced `articles`; `None` when every tier came up empty
    pub tier: Option<Tier>,
}

pub struct NewsAggregator {
    source: Arc<dyn NewsSource>,
    fallback_country: String,
}

impl NewsAggregator {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self {
            source,
            fallback_country: DEFAULT_COUNTRY.to_string(),
        }
    }

    pub fn with_fallback_country(mut self, country: &str) -> Self {
        self.fallback_country = country.trim().to_ascii_lowercase();
        self
    }

    pub async fn aggregate(
        &self,
        mood: Mood,
        country_code: &str,
        categories: &CategorySelection,
        filter_mode: FilterMode,
    ) -> Vec<Article> {
        self.aggregate_detailed(mood, country_code, categories, filter_mode)
            .await
            .articles
    }

    pub async fn aggregate_detailed(
        &self,
        mood: Mood,
        country_code: &str,
        categories: &CategorySelection,
        filter_mode: FilterMode,
    ) -> Aggregation {
        let category = categories.first();

        if filter_mode.uses_weather() {
            let query = mood.query();
            if let Some(articles) = self
                .attempt(Tier::WeatherQuery, self.source.search(&query))
                .await
            {
                return found(Tier::WeatherQuery, articles);
            }
        }

        let country = country_code.trim().to_ascii_lowercase();
        if countries::is_supported(&country) {
            if let Some(articles) = self
                .attempt(
                    Tier::CountryHeadlines,
                    self.source.top_headlines(&country, category),
                )
                .await
            {
                return found(Tier::CountryHeadlines, articles);
            }
        } else {
            tracing::debug!("Country {:?} not supported for headlines, skipping", country_code);
        }

        if let Some(articles) = self
            .attempt(
                Tier::GlobalHeadlines,
                self.source.top_headlines(&self.fallback_country, category),
            )
            .await
        {
            return found(Tier::GlobalHeadlines, articles);
        }

        tracing::warn!("All news sources exhausted, no articles");
        Aggregation {
            articles: Vec::new(),
            tier: None,
        }
    }

    async fn attempt(
        &self,
        tier: Tier,
        request: impl Future<Output = Result<Vec<RawArticle>, NewsError>>,
    ) -> Option<Vec<Article>> {
        tracing::debug!("Trying {} tier", tier);

        let result = request.await.and_then(|raw| {
            let articles = normalize(raw);
            if articles.is_empty() {
                Err(NewsError::EmptyResult)
            } else {
                Ok(articles)
            }
        });

        match result {
            Ok(articles) => Some(articles),
            Err(e) => {
                tracing::warn!("{} tier failed: {}", tier, e);
                None
            }
        }
    }
}

fn found(tier: Tier, articles: Vec<Article>) -> Aggregation {
    tracing::info!("Fetched {} articles from {} tier", articles.len(), tier);
    Aggregation {
        articles,
        tier: Some(tier),
    }
}
