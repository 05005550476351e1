//! Adapter for flat listing pages: one element per performance with
//! separately marked-up date, time and title.

use crate::title::Title;
use crate::{Fetcher, ScrapeError, Show, SiteAdapter, element_text, selector};
use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};

const DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";

pub struct FlatListAdapter {
    cinema: String,
    url: String,
}

impl FlatListAdapter {
    pub fn new(cinema: String, url: String) -> Self {
        Self { cinema, url }
    }
}

#[async_trait::async_trait]
impl SiteAdapter for FlatListAdapter {
    fn cinema(&self) -> &str {
        &self.cinema
    }

    async fn get_shows(&self, fetcher: &dyn Fetcher) -> Result<Vec<Show>, ScrapeError> {
        let body = fetcher.fetch_html(&self.url).await?;
        parse_listing(&body, &self.cinema)
    }
}

fn field(row: ElementRef<'_>, sel: &Selector) -> String {
    row.select(sel).next().map(element_text).unwrap_or_default()
}

/// Every row must parse; one malformed date or time fails the whole listing.
pub fn parse_listing(html: &str, cinema: &str) -> Result<Vec<Show>, ScrapeError> {
    let document = Html::parse_document(html);
    let row_sel = selector(".vorstellung")?;
    let date_sel = selector(".datum")?;
    let time_sel = selector(".uhrzeit")?;
    let title_sel = selector(".titel")?;

    let mut shows = Vec::new();
    for row in document.select(&row_sel) {
        let raw = format!("{} {}", field(row, &date_sel), field(row, &time_sel));
        let datetime = NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT).map_err(|_| {
            ScrapeError::Showtime {
                cinema: cinema.to_string(),
                raw: raw.clone(),
            }
        })?;
        let title = Title::parse(&field(row, &title_sel));
        shows.push(Show::new(cinema, &title, datetime));
    }

    Ok(shows)
}
