//! HTML rendering of the aggregated programme.
//!
//! Output order is exactly the iteration order of [`Programme`]; nothing is
//! re-sorted here. The markup lives in `templates/report.html`.

use crate::aggregate::{Edition, Programme, Slot, WEEK_DAYS, Week};
use askama::Template;
use chrono::NaiveDateTime;

const WEEKDAYS: [&str; WEEK_DAYS] = ["Do", "Fr", "Sa", "So", "Mo", "Di", "Mi"];

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    stand: String,
    weeks: Vec<WeekView<'a>>,
}

struct WeekView<'a> {
    id: String,
    number: u32,
    from: String,
    to: String,
    days: Vec<DayHeader>,
    index: Vec<IndexEntry<'a>>,
    tables: Vec<TableView<'a>>,
}

struct DayHeader {
    name: &'static str,
    date: String,
}

struct IndexEntry<'a> {
    anchor: String,
    title: &'a str,
}

/// One movie edition. `id` is empty for every edition but a movie's first.
struct TableView<'a> {
    id: String,
    title: &'a str,
    extra: &'a str,
    theaters: Vec<TheaterView<'a>>,
}

struct TheaterView<'a> {
    cinema: &'a str,
    rows: Vec<Vec<Cell>>,
}

/// A day cell: the slot's start time and how often it plays that day.
struct Cell {
    time: String,
    count: usize,
}

fn anchor(week: &Week, movie_index: usize) -> String {
    format!("w{}-{:02}-{}", week.key.year, week.key.week, movie_index)
}

impl<'a> WeekView<'a> {
    fn new(week: &'a Week) -> Self {
        let days = week.days();

        let index = week
            .titles
            .iter()
            .enumerate()
            .map(|(i, title)| IndexEntry {
                anchor: anchor(week, i),
                title,
            })
            .collect();

        let mut tables = Vec::new();
        for (i, movie) in week.movies.iter().enumerate() {
            for (j, edition) in movie.editions.iter().enumerate() {
                let id = if j == 0 { anchor(week, i) } else { String::new() };
                tables.push(TableView::new(id, &movie.title, edition));
            }
        }

        Self {
            id: format!("w{}-{:02}", week.key.year, week.key.week),
            number: week.key.week,
            from: days[0].format("%d.%m.").to_string(),
            to: days[WEEK_DAYS - 1].format("%d.%m.%Y").to_string(),
            days: WEEKDAYS
                .iter()
                .zip(days)
                .map(|(&name, day)| DayHeader {
                    name,
                    date: day.format("%d.%m.").to_string(),
                })
                .collect(),
            index,
            tables,
        }
    }
}

impl<'a> TableView<'a> {
    fn new(id: String, title: &'a str, edition: &'a Edition) -> Self {
        Self {
            id,
            title,
            extra: &edition.extra,
            theaters: edition
                .theaters
                .iter()
                .map(|theater| TheaterView {
                    cinema: &theater.cinema,
                    rows: theater.slots.iter().map(cells).collect(),
                })
                .collect(),
        }
    }
}

fn cells(slot: &Slot) -> Vec<Cell> {
    let time = slot.time.format("%H:%M").to_string();
    slot.days
        .iter()
        .map(|&count| Cell {
            time: time.clone(),
            count,
        })
        .collect()
}

/// Render the full report document for `programme`.
pub fn render(programme: &Programme, generated: NaiveDateTime) -> Result<String, askama::Error> {
    ReportTemplate {
        stand: generated.format("%d.%m.%Y %H:%M").to_string(),
        weeks: programme.weeks.iter().map(WeekView::new).collect(),
    }
    .render()
}
