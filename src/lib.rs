use chrono::NaiveDateTime;

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod flat_list;
pub mod json_feed_a;
pub mod json_feed_b;
pub mod logging;
pub mod paginated_list;
pub mod pipeline;
pub mod report;
pub mod table_week;
pub mod title;

pub use aggregate::{Programme, WeekKey, aggregate};
pub use config::{Config, Source, TheaterConfig};
pub use error::{ConfigError, FetchError, ScrapeError};
pub use fetch::{Fetcher, HttpFetcher};
pub use title::{Extra, Title, normalize};

/// One performance of one film in one theater, as every adapter produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    pub cinema: String,
    pub movie: String,
    /// Formatted edition tags, e.g. "(3D, OV)", or empty.
    pub extra: String,
    /// Local wall-clock time as published by the site.
    pub datetime: NaiveDateTime,
}

impl Show {
    pub fn new(cinema: &str, title: &Title, datetime: NaiveDateTime) -> Self {
        Self {
            cinema: cinema.to_string(),
            movie: title.canonical.clone(),
            extra: title.extras_display(),
            datetime,
        }
    }
}

/// Trait that all site adapters implement.
#[async_trait::async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Configured display name of the theater.
    fn cinema(&self) -> &str;

    /// Fetch the site's documents and turn them into shows.
    async fn get_shows(&self, fetcher: &dyn Fetcher) -> Result<Vec<Show>, ScrapeError>;
}

/// Compile a CSS selector, turning the borrowed parse error into ours.
pub(crate) fn selector(css: &str) -> Result<scraper::Selector, ScrapeError> {
    scraper::Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css}: {e}")))
}

/// Whitespace-joined text of an element.
pub(crate) fn element_text(el: scraper::ElementRef<'_>) -> String {
    el.text()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
