//! News service for Moodcast
//!
//! Classifies the current temperature into a mood and selects headlines from
//! NewsAPI through an ordered fallback chain.

pub mod aggregator;
pub mod client;
pub mod countries;
pub mod error;
pub mod mood;
pub mod normalizer;
pub mod types;

pub use aggregator::{Aggregation, NewsAggregator, Tier};
pub use client::{NewsApiClient, NewsSource, NEWSAPI_BASE};
pub use error::NewsError;
pub use mood::{classify, Mood};
pub use normalizer::normalize;
pub use types::*;
