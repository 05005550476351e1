//! Adapter for sites that publish one table per week.
//!
//! The first row of each table names the week, e.g. "05. Januar - 11. Januar";
//! every following row is one film: title cell, then one cell per day with
//! times like "17.30 20.15".

use crate::title::Title;
use crate::{Fetcher, ScrapeError, Show, SiteAdapter, selector};
use chrono::{Datelike, NaiveDate, NaiveTime};
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;
use tracing::{debug, warn};

static RE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\.\s*(\p{L}+)\s*[-–]\s*(\d{1,2})\.\s*(\p{L}+)")
        .expect("invalid regex: week range")
});

static RE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\.(\d{2})$").expect("invalid regex: time token"));

pub struct TableWeekAdapter {
    cinema: String,
    url: String,
    today: NaiveDate,
}

impl TableWeekAdapter {
    /// `today` anchors the year of the month-only week headers.
    pub fn new(cinema: String, url: String, today: NaiveDate) -> Self {
        Self { cinema, url, today }
    }
}

#[async_trait::async_trait]
impl SiteAdapter for TableWeekAdapter {
    fn cinema(&self) -> &str {
        &self.cinema
    }

    async fn get_shows(&self, fetcher: &dyn Fetcher) -> Result<Vec<Show>, ScrapeError> {
        let body = fetcher.fetch_html(&self.url).await?;
        parse_tables(&body, &self.cinema, self.today)
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "januar" => 1,
        "februar" => 2,
        "märz" | "maerz" => 3,
        "april" => 4,
        "mai" => 5,
        "juni" => 6,
        "juli" => 7,
        "august" => 8,
        "september" => 9,
        "oktober" => 10,
        "november" => 11,
        "dezember" => 12,
        _ => return None,
    };
    Some(month)
}

/// Concrete dates for a header like "30. Dezember - 03. Januar".
///
/// The year is taken from `today`. A January-only range seen in December
/// belongs to the coming year, and an end date before the start date rolls
/// into the following year.
pub fn week_dates(header: &str, today: NaiveDate) -> Option<Vec<NaiveDate>> {
    let caps = RE_RANGE.captures(header)?;
    let start_day: u32 = caps[1].parse().ok()?;
    let start_month = month_number(&caps[2])?;
    let end_day: u32 = caps[3].parse().ok()?;
    let end_month = month_number(&caps[4])?;

    let mut year = today.year();
    if start_month == 1 && end_month == 1 && today.month() == 12 {
        year += 1;
    }

    let start = NaiveDate::from_ymd_opt(year, start_month, start_day)?;
    let mut end = NaiveDate::from_ymd_opt(year, end_month, end_day)?;
    if end < start {
        end = NaiveDate::from_ymd_opt(year + 1, end_month, end_day)?;
    }

    Some(start.iter_days().take_while(|d| *d <= end).collect())
}

fn parse_time(token: &str) -> Option<NaiveTime> {
    let caps = RE_TIME.captures(token)?;
    NaiveTime::from_hms_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, 0)
}

/// Cell text with `<br>` as the only line break. Whitespace in the source,
/// newlines included, collapses to single spaces.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(t) => {
                for c in t.chars() {
                    if !c.is_whitespace() {
                        text.push(c);
                    } else if !text.is_empty() && !text.ends_with([' ', '\n']) {
                        text.push(' ');
                    }
                }
            }
            Node::Element(e) if e.name() == "br" => {
                if text.ends_with(' ') {
                    text.pop();
                }
                text.push('\n');
            }
            _ => {}
        }
    }
    text
}

pub fn parse_tables(html: &str, cinema: &str, today: NaiveDate) -> Result<Vec<Show>, ScrapeError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;

    let mut shows = Vec::new();

    for table in document.select(&table_sel) {
        let mut rows = table.select(&row_sel);
        let Some(header) = rows.next() else {
            continue;
        };
        let label = header
            .select(&cell_sel)
            .next()
            .map(cell_text)
            .unwrap_or_default();

        let Some(dates) = week_dates(&label, today) else {
            if RE_RANGE.is_match(&label) {
                warn!(cinema, label = label.trim(), "unparseable week range, table ignored");
            } else {
                debug!(cinema, label = label.trim(), "not a programme table");
            }
            continue;
        };

        for row in rows {
            let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
            let Some((title_cell, day_cells)) = cells.split_first() else {
                continue;
            };
            let raw = cell_text(*title_cell);
            let Some(raw_title) = raw.lines().map(str::trim).find(|l| !l.is_empty()) else {
                continue;
            };
            let title = Title::parse(raw_title);

            for (date, cell) in dates.iter().zip(day_cells) {
                let text = cell_text(*cell);
                let tokens = text
                    .split(|c: char| c.is_whitespace() || c == ',' || c == '|')
                    .filter(|t| !t.is_empty());
                for token in tokens {
                    match parse_time(token) {
                        Some(time) => shows.push(Show::new(cinema, &title, date.and_time(time))),
                        None => debug!(cinema, token, "skipping time token"),
                    }
                }
            }
        }
    }

    Ok(shows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn january_range_yields_seven_days() {
        let dates = week_dates("05. Januar - 11. Januar", date(2025, 3, 1)).unwrap();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], date(2025, 1, 5));
        assert_eq!(dates[6], date(2025, 1, 11));
    }

    #[test]
    fn january_range_seen_in_december_is_next_year() {
        let dates = week_dates("05. Januar - 11. Januar", date(2025, 12, 28)).unwrap();
        assert_eq!(dates[0], date(2026, 1, 5));
    }

    #[test]
    fn range_across_new_year_rolls_end() {
        let dates = week_dates("30. Dezember - 03. Januar", date(2025, 12, 20)).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2025, 12, 30),
                date(2025, 12, 31),
                date(2026, 1, 1),
                date(2026, 1, 2),
                date(2026, 1, 3),
            ]
        );
    }

    #[test]
    fn unknown_month_or_day_is_rejected() {
        assert!(week_dates("05. Jänner - 11. Jänner", date(2025, 1, 1)).is_none());
        assert!(week_dates("30. Februar - 05. März", date(2025, 1, 1)).is_none());
        assert!(week_dates("Kinderkino", date(2025, 1, 1)).is_none());
    }

    const PAGE: &str = r#"
        <html><body>
        <table class="nav"><tr><td>Start</td><td>Kontakt</td></tr></table>
        <table>
          <tr><th>06. März - 12. März</th><th>Do</th><th>Fr</th><th>Sa</th></tr>
          <tr>
            <td>Anora OmU<br>USA 2024, 139 min</td>
            <td>17.30 20.15</td>
            <td></td>
            <td>ausverkauft, 21.00</td>
          </tr>
          <tr><td>Schulkino: Die Schule der magischen Tiere 3</td><td>9.30</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn parses_rows_and_skips_bad_tokens() {
        let shows = parse_tables(PAGE, "Kino am Markt", date(2025, 2, 1)).unwrap();
        let times: Vec<_> = shows.iter().map(|s| s.datetime).collect();
        assert_eq!(
            times,
            vec![
                at(2025, 3, 6, 17, 30),
                at(2025, 3, 6, 20, 15),
                at(2025, 3, 8, 21, 0),
                at(2025, 3, 6, 9, 30),
            ]
        );
        assert_eq!(shows[0].movie, "Anora");
        assert_eq!(shows[0].extra, "(OmU)");
        assert_eq!(shows[0].cinema, "Kino am Markt");
        assert_eq!(shows[3].movie, "Die Schule Der Magischen Tiere 3");
        assert_eq!(shows[3].extra, "(Schulkino)");
    }

    #[test]
    fn title_wrapped_in_source_stays_one_line() {
        let html = "<table><tr><th>06. März - 12. März</th></tr>\
                    <tr><td>Der Graf von\n      Monte Christo OmU<br>FR 2024</td>\
                    <td>19.00</td></tr></table>";
        let shows = parse_tables(html, "Kino am Markt", date(2025, 2, 1)).unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].movie, "Der Graf Von Monte Christo");
        assert_eq!(shows[0].extra, "(OmU)");
    }

    #[test]
    fn table_with_broken_range_contributes_nothing() {
        let html = "<table><tr><th>31. Februar - 06. März</th></tr>\
                    <tr><td>Anora</td><td>20.00</td></tr></table>";
        let shows = parse_tables(html, "Kino am Markt", date(2025, 2, 1)).unwrap();
        assert!(shows.is_empty());
    }

    #[tokio::test]
    async fn get_shows_fetches_configured_url() {
        let fetcher = StaticFetcher::default().with("https://kino.test/programm", PAGE);
        let adapter = TableWeekAdapter::new(
            "Kino am Markt".to_string(),
            "https://kino.test/programm".to_string(),
            date(2025, 2, 1),
        );
        let shows = adapter.get_shows(&fetcher).await.unwrap();
        assert_eq!(shows.len(), 4);
    }
}
