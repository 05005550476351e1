//! Adapter for the multi-venue JSON feed. One feed can cover several houses,
//! so the theater name on each show comes from the performance itself.

use crate::title::Title;
use crate::{Fetcher, ScrapeError, Show, SiteAdapter};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiResponse {
    films: Vec<ApiFilm>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiFilm {
    title: String,
    #[serde(default)]
    release_type: Option<String>,
    #[serde(default)]
    performances: Vec<ApiPerformance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiPerformance {
    cinema_name: String,
    start_date_time: String,
}

pub struct JsonFeedBAdapter {
    cinema: String,
    url: String,
}

impl JsonFeedBAdapter {
    pub fn new(cinema: String, url: String) -> Self {
        Self { cinema, url }
    }
}

#[async_trait::async_trait]
impl SiteAdapter for JsonFeedBAdapter {
    fn cinema(&self) -> &str {
        &self.cinema
    }

    async fn get_shows(&self, fetcher: &dyn Fetcher) -> Result<Vec<Show>, ScrapeError> {
        let value = fetcher.fetch_json(&self.url).await?;
        parse_feed(value, &self.cinema)
    }
}

/// `feed` names the configured source for error messages only.
pub fn parse_feed(value: Value, feed: &str) -> Result<Vec<Show>, ScrapeError> {
    let response: ApiResponse = serde_json::from_value(value).map_err(|source| ScrapeError::Feed {
        cinema: feed.to_string(),
        source,
    })?;

    let mut shows = Vec::new();
    for film in response.films {
        let raw_title = match film.release_type.as_deref().map(str::trim) {
            Some(release) if !release.is_empty() => format!("{} {}", film.title, release),
            _ => film.title.clone(),
        };
        let title = Title::parse(&raw_title);

        for performance in film.performances {
            let datetime =
                NaiveDateTime::parse_from_str(&performance.start_date_time, DATETIME_FORMAT)
                    .map_err(|_| ScrapeError::Showtime {
                        cinema: performance.cinema_name.clone(),
                        raw: performance.start_date_time.clone(),
                    })?;
            shows.push(Show::new(&performance.cinema_name, &title, datetime));
        }
    }
    Ok(shows)
}
