//! ISO-8601 week arithmetic shared by the attendance views and reports.
//!
//! Weeks run Monday through Sunday and belong to the ISO week-year, which
//! near January 1 can differ from the calendar year of the dates inside
//! the week.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::{Error, Result};

/// One ISO week of the current week-year, with its first and last date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekSpan {
    pub week: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The seven dates of ISO week `week` of week-year `year`, Monday first.
///
/// Rejects week numbers the given year does not have; whether a year has
/// 52 or 53 weeks falls out of the ISO calendar itself.
pub fn week_dates(year: i32, week: u32) -> Result<[NaiveDate; 7]> {
    let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
        .ok_or(Error::InvalidWeek { year, week })?;
    let mut dates = [monday; 7];
    for (offset, slot) in dates.iter_mut().enumerate() {
        *slot = monday + chrono::Duration::days(offset as i64);
    }
    Ok(dates)
}

/// The ISO (week-year, week number) pair containing `date`.
pub fn week_of(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

/// Position of `date` inside its ISO week, 0 for Monday through 6 for
/// Sunday.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Every week of `today`'s ISO week-year from week 1 through the week
/// containing `today`, oldest first.
pub fn week_index(today: NaiveDate) -> Result<Vec<WeekSpan>> {
    let (year, current) = week_of(today);
    let mut spans = Vec::with_capacity(current as usize);
    for week in 1..=current {
        let dates = week_dates(year, week)?;
        spans.push(WeekSpan {
            week,
            start: dates[0],
            end: dates[6],
        });
    }
    Ok(spans)
}

/// First and last date of the calendar month containing `date`.
pub fn month_span(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = match next_month {
        Some(d) => d - chrono::Duration::days(1),
        None => date,
    };
    (first, last)
}
