use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Headline categories understood by the news provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    #[default]
    General,
    Business,
    Technology,
    Sports,
    Entertainment,
    Health,
    Science,
}

impl NewsCategory {
    /// Value of the provider's `category` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Business => "business",
            Self::Technology => "technology",
            Self::Sports => "sports",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Science => "science",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::General => "Top stories and breaking news",
            Self::Business => "Markets, finance, and economy",
            Self::Technology => "Tech innovations and updates",
            Self::Sports => "Sports news and scores",
            Self::Entertainment => "Movies, music, and celebrities",
            Self::Health => "Health tips and medical news",
            Self::Science => "Scientific discoveries and research",
        }
    }
}

impl std::fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, duplicate-free, never-empty set of selected categories.
///
/// Insertion order is kept because the first entry drives the headline tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NewsCategory>", into = "Vec<NewsCategory>")]
pub struct CategorySelection(Vec<NewsCategory>);

impl CategorySelection {
    /// Build a selection, dropping repeats. Returns `None` for an empty input.
    pub fn new(categories: impl IntoIterator<Item = NewsCategory>) -> Option<Self> {
        let mut selected: Vec<NewsCategory> = Vec::new();
        for category in categories {
            if !selected.contains(&category) {
                selected.push(category);
            }
        }
        if selected.is_empty() {
            None
        } else {
            Some(Self(selected))
        }
    }

    pub fn single(category: NewsCategory) -> Self {
        Self(vec![category])
    }

    /// Category used by the headline tiers
    pub fn first(&self) -> NewsCategory {
        self.0.first().copied().unwrap_or_default()
    }

    pub fn contains(&self, category: NewsCategory) -> bool {
        self.0.contains(&category)
    }

    /// Add `category` if absent, remove it if present.
    ///
    /// Removing the last remaining category does nothing. Returns whether the
    /// selection changed.
    pub fn toggle(&mut self, category: NewsCategory) -> bool {
        match self.0.iter().position(|c| *c == category) {
            Some(_) if self.0.len() == 1 => false,
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => {
                self.0.push(category);
                true
            }
        }
    }

    pub fn as_slice(&self) -> &[NewsCategory] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self::single(NewsCategory::General)
    }
}

impl TryFrom<Vec<NewsCategory>> for CategorySelection {
    type Error = String;

    fn try_from(value: Vec<NewsCategory>) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "at least one news category must be selected".to_string())
    }
}

impl From<CategorySelection> for Vec<NewsCategory> {
    fn from(selection: CategorySelection) -> Self {
        selection.0
    }
}

/// How the news feed is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Search by the mood derived from the current temperature first
    #[default]
    WeatherBased,
    /// Headlines for the selected category only
    #[serde(rename = "all", alias = "all-news")]
    AllNews,
}

impl FilterMode {
    pub fn uses_weather(self) -> bool {
        matches!(self, Self::WeatherBased)
    }
}

/// Source attribution as delivered by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RawSource {
    pub name: Option<String>,
}

/// Article record as delivered by the provider; every field may be absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<RawSource>,
}

/// Envelope shared by the search and headline endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    pub status: String,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Normalized article. `title` and `url` are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    /// Empty when the provider had no image
    pub image_url: String,
    /// `None` when the provider timestamp was missing or not RFC 3339
    pub published_at: Option<DateTime<Utc>>,
    pub source_name: String,
}

impl From<Article> for RawArticle {
    fn from(article: Article) -> Self {
        Self {
            title: Some(article.title),
            description: Some(article.description),
            url: Some(article.url),
            url_to_image: Some(article.image_url),
            published_at: article.published_at.map(|t| t.to_rfc3339()),
            source: Some(RawSource {
                name: Some(article.source_name),
            }),
        }
    }
}
