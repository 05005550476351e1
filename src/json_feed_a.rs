//! Adapter for the film-list JSON feed: an array of films, each with its
//! showtimes and per-showtime attribute flags (3D, OmU, OV, ...).

use crate::title::Title;
use crate::{Fetcher, ScrapeError, Show, SiteAdapter};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct ApiFilm {
    title: String,
    #[serde(default)]
    showtimes: Vec<ApiShowtime>,
}

#[derive(Debug, Deserialize)]
struct ApiShowtime {
    start: String,
    #[serde(default)]
    attributes: Vec<String>,
}

pub struct JsonFeedAAdapter {
    cinema: String,
    url: String,
}

impl JsonFeedAAdapter {
    pub fn new(cinema: String, url: String) -> Self {
        Self { cinema, url }
    }
}

#[async_trait::async_trait]
impl SiteAdapter for JsonFeedAAdapter {
    fn cinema(&self) -> &str {
        &self.cinema
    }

    async fn get_shows(&self, fetcher: &dyn Fetcher) -> Result<Vec<Show>, ScrapeError> {
        let value = fetcher.fetch_json(&self.url).await?;
        parse_feed(value, &self.cinema)
    }
}

/// Title markers implied by a showtime's attribute flags.
fn attribute_markers(attributes: &[String]) -> String {
    let has = |flag: &str| attributes.iter().any(|a| a.trim().eq_ignore_ascii_case(flag));

    let mut markers = String::new();
    if has("3d") {
        markers.push_str(" 3D");
    }
    if has("omu") || has("omdu") || has("omeu") {
        markers.push_str(" (OmU)");
    } else if has("ov") {
        markers.push_str(" (OV)");
    }
    markers
}

pub fn parse_feed(value: Value, cinema: &str) -> Result<Vec<Show>, ScrapeError> {
    let films: Vec<ApiFilm> = serde_json::from_value(value).map_err(|source| ScrapeError::Feed {
        cinema: cinema.to_string(),
        source,
    })?;

    let mut shows = Vec::new();
    for film in films {
        let base = Title::parse(&film.title);
        for showtime in film.showtimes {
            let datetime = NaiveDateTime::parse_from_str(&showtime.start, DATETIME_FORMAT)
                .map_err(|_| ScrapeError::Showtime {
                    cinema: cinema.to_string(),
                    raw: showtime.start.clone(),
                })?;
            let title = base.with_markers(&attribute_markers(&showtime.attributes));
            shows.push(Show::new(cinema, &title, datetime));
        }
    }
    Ok(shows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use serde_json::json;

    #[test]
    fn attribute_flags_merge_with_title_tags() {
        let feed = json!([
            {
                "title": "Dune: Part Two OV",
                "showtimes": [
                    { "start": "2025-03-06T20:00", "attributes": ["3D", "Dolby Atmos"] },
                    { "start": "2025-03-07T17:15", "attributes": [] }
                ]
            },
            {
                "title": "Emilia Pérez",
                "showtimes": [
                    { "start": "2025-03-06T18:30", "attributes": ["omdu"] }
                ]
            }
        ]);

        let shows = parse_feed(feed, "Cinema Lichtspiele").unwrap();
        let got: Vec<_> = shows
            .iter()
            .map(|s| (s.movie.as_str(), s.extra.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Dune: Part Two", "(3D, OV)"),
                ("Dune: Part Two", "(OV)"),
                ("Emilia Pérez", "(OmU)"),
            ]
        );
    }

    #[test]
    fn film_without_showtimes_contributes_nothing() {
        let shows = parse_feed(json!([{ "title": "Flow" }]), "Cinema Lichtspiele").unwrap();
        assert!(shows.is_empty());
    }

    #[test]
    fn malformed_start_is_fatal() {
        let feed = json!([{ "title": "Flow", "showtimes": [{ "start": "heute 20 Uhr" }] }]);
        assert!(matches!(
            parse_feed(feed, "Cinema Lichtspiele"),
            Err(ScrapeError::Showtime { .. })
        ));
    }

    #[test]
    fn unexpected_shape_is_a_feed_error() {
        let feed = json!({ "films": [] });
        assert!(matches!(
            parse_feed(feed, "Cinema Lichtspiele"),
            Err(ScrapeError::Feed { .. })
        ));
    }

    #[tokio::test]
    async fn get_shows_reads_json_body() {
        let body = r#"[{"title":"Flow","showtimes":[{"start":"2025-03-08T11:00","attributes":["OV"]}]}]"#;
        let fetcher = StaticFetcher::default().with("https://api.kino.test/films", body);
        let adapter = JsonFeedAAdapter::new(
            "Cinema Lichtspiele".into(),
            "https://api.kino.test/films".into(),
        );
        let shows = adapter.get_shows(&fetcher).await.unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].extra, "(OV)");
    }
}
