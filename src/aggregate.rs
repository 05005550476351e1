//! Grouping of shows into the weekly programme.
//!
//! Weeks run Thursday to Wednesday. Inside a week the order is movie, edition
//! (extras string), theater, start time; every level is sorted ascending and
//! the result is iterated as-is by the renderer.

use crate::Show;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

/// Days in a cinema week, Thursday first.
pub const WEEK_DAYS: usize = 7;

/// Cinema-week identifier: Monday-based week number of the Monday that opens
/// the week of the date shifted back three days, in that Monday's year. Every
/// day of one Thursday-to-Wednesday week shares a key, also across New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    pub fn of(datetime: NaiveDateTime) -> Self {
        let monday = shifted_monday(datetime.date());
        Self {
            year: monday.year(),
            week: monday.ordinal0() / 7 + 1,
        }
    }
}

/// Monday of the week containing `date - 3 days`.
///
/// Numbering that week from its Monday folds the days before a year's first
/// Monday (week 0) into the last week of the previous year.
fn shifted_monday(date: NaiveDate) -> NaiveDate {
    let shifted = date - Duration::days(3);
    shifted - Duration::days(shifted.weekday().num_days_from_monday() as i64)
}

/// Thursday that opens the cinema week of `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    shifted_monday(date) + Duration::days(3)
}

/// Column of `date` within its cinema week, Thursday = 0 .. Wednesday = 6.
pub fn weekday_column(date: NaiveDate) -> usize {
    (date.weekday().num_days_from_monday() as usize + 4) % WEEK_DAYS
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Programme {
    pub weeks: Vec<Week>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
    pub key: WeekKey,
    /// Thursday the week starts on.
    pub start: NaiveDate,
    /// Distinct canonical titles playing this week, alphabetical.
    pub titles: Vec<String>,
    pub movies: Vec<Movie>,
}

impl Week {
    pub fn days(&self) -> [NaiveDate; WEEK_DAYS] {
        std::array::from_fn(|i| self.start + Duration::days(i as i64))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub title: String,
    pub editions: Vec<Edition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edition {
    /// Extras display string, empty for the plain edition.
    pub extra: String,
    pub theaters: Vec<Theater>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theater {
    pub cinema: String,
    pub slots: Vec<Slot>,
}

/// One start time in one theater, with the number of shows per weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub time: NaiveTime,
    pub days: [usize; WEEK_DAYS],
}

type SlotMap = BTreeMap<NaiveTime, [usize; WEEK_DAYS]>;
type TheaterMap = BTreeMap<String, SlotMap>;
type EditionMap = BTreeMap<String, TheaterMap>;
type MovieMap = BTreeMap<String, EditionMap>;

pub fn aggregate(shows: &[Show]) -> Programme {
    let mut weeks: BTreeMap<WeekKey, (NaiveDate, MovieMap)> = BTreeMap::new();

    for show in shows {
        let (_, movies) = weeks
            .entry(WeekKey::of(show.datetime))
            .or_insert_with(|| (week_start(show.datetime.date()), MovieMap::new()));
        let counts = movies
            .entry(show.movie.clone())
            .or_default()
            .entry(show.extra.clone())
            .or_default()
            .entry(show.cinema.clone())
            .or_default()
            .entry(show.datetime.time())
            .or_insert([0; WEEK_DAYS]);
        counts[weekday_column(show.datetime.date())] += 1;
    }

    let weeks = weeks
        .into_iter()
        .map(|(key, (start, movies))| Week {
            key,
            start,
            titles: movies.keys().cloned().collect(),
            movies: movies.into_iter().map(build_movie).collect(),
        })
        .collect();

    Programme { weeks }
}

fn build_movie((title, editions): (String, EditionMap)) -> Movie {
    Movie {
        title,
        editions: editions
            .into_iter()
            .map(|(extra, theaters)| Edition {
                extra,
                theaters: theaters
                    .into_iter()
                    .map(|(cinema, slots)| Theater {
                        cinema,
                        slots: slots
                            .into_iter()
                            .map(|(time, days)| Slot { time, days })
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}
