//! Adapter for paginated result tables.
//!
//! The first page links to the remaining ones through its pager. Every page
//! carries a single table whose rows are: title, hall, date, time.

use crate::title::Title;
use crate::{Fetcher, ScrapeError, Show, SiteAdapter, element_text, selector};
use chrono::NaiveDateTime;
use futures::future::try_join_all;
use reqwest::Url;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use tracing::{debug, warn};

const COLUMNS: usize = 4;
const DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";

pub struct PaginatedListAdapter {
    cinema: String,
    url: String,
}

impl PaginatedListAdapter {
    pub fn new(cinema: String, url: String) -> Self {
        Self { cinema, url }
    }
}

#[async_trait::async_trait]
impl SiteAdapter for PaginatedListAdapter {
    fn cinema(&self) -> &str {
        &self.cinema
    }

    async fn get_shows(&self, fetcher: &dyn Fetcher) -> Result<Vec<Show>, ScrapeError> {
        let first = fetcher.fetch_html(&self.url).await?;
        let links = page_links(&first, &self.url)?;
        debug!(cinema = %self.cinema, pages = links.len() + 1, "pagination");

        let rest = try_join_all(links.iter().map(|url| fetcher.fetch_html(url))).await?;

        let mut shows = parse_page(&first, &self.cinema)?;
        for body in &rest {
            shows.extend(parse_page(body, &self.cinema)?);
        }
        Ok(shows)
    }
}

/// Absolute URLs of the additional pages linked from the first one, in
/// document order, without duplicates and without the first page itself.
pub fn page_links(html: &str, base: &str) -> Result<Vec<String>, ScrapeError> {
    let link_error = |href: &str| ScrapeError::Link {
        base: base.to_string(),
        href: href.to_string(),
    };
    let mut base_url = Url::parse(base).map_err(|_| link_error(""))?;
    base_url.set_fragment(None);

    let document = Html::parse_document(html);
    let link_sel = selector(".pagination a[href]")?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for a in document.select(&link_sel) {
        let href = a.value().attr("href").unwrap_or("").trim();
        let mut url = base_url.join(href).map_err(|_| link_error(href))?;
        url.set_fragment(None);
        if url == base_url || is_first_page_entry(a) {
            continue;
        }
        if seen.insert(url.clone()) {
            links.push(url.to_string());
        }
    }
    Ok(links)
}

/// The pager's own entry for page one, which may spell the URL differently
/// from the configured one (`?page=1` against a bare path).
fn is_first_page_entry(a: ElementRef<'_>) -> bool {
    let el = a.value();
    el.attr("aria-current").is_some()
        || el.classes().any(|c| c == "active" || c == "current")
        || element_text(a) == "1"
}

/// Shows from one results page. Rows of the wrong width or with an
/// unreadable date are skipped; a page without exactly one table yields none.
pub fn parse_page(html: &str, cinema: &str) -> Result<Vec<Show>, ScrapeError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;

    let tables: Vec<_> = document.select(&table_sel).collect();
    if tables.len() != 1 {
        warn!(cinema, tables = tables.len(), "expected one results table, page ignored");
        return Ok(Vec::new());
    }

    let mut shows = Vec::new();
    for row in tables[0].select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
        if cells.len() != COLUMNS {
            debug!(cinema, columns = cells.len(), "skipping row");
            continue;
        }

        let raw = format!("{} {}", cells[2], cells[3]);
        match NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT) {
            Ok(datetime) => shows.push(Show::new(cinema, &Title::parse(&cells[0]), datetime)),
            Err(_) => debug!(cinema, raw = %raw, "skipping row with unreadable showtime"),
        }
    }
    Ok(shows)
}
