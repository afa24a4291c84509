//! Raw provider records to [`Article`]s.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::types::{Article, RawArticle};

pub const MAX_ARTICLES: usize = 15;
pub const MISSING_DESCRIPTION: &str = "No description available";

/// Title the provider substitutes for withdrawn articles
const REMOVED_TITLE: &str = "[Removed]";

/// Filter, dedupe by url and truncate, preserving provider order.
pub fn normalize(raw: impl IntoIterator<Item = RawArticle>) -> Vec<Article> {
    let mut seen_urls = HashSet::new();

    raw.into_iter()
        .filter_map(to_article)
        .filter(|article| seen_urls.insert(article.url.clone()))
        .take(MAX_ARTICLES)
        .collect()
}

fn to_article(raw: RawArticle) -> Option<Article> {
    let title = non_empty(raw.title)?;
    if title == REMOVED_TITLE {
        return None;
    }
    let url = non_empty(raw.url)?;
    let source_name = non_empty(raw.source.and_then(|s| s.name))?;

    Some(Article {
        title,
        description: non_empty(raw.description)
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
        url,
        image_url: raw.url_to_image.unwrap_or_default(),
        published_at: raw.published_at.as_deref().and_then(parse_timestamp),
        source_name,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Unparseable publishedAt {:?}: {}", value, e);
            None
        }
    }
}
