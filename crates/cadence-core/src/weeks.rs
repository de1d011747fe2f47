use chrono::{Datelike, IsoWeek, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::datetime::add_days;
use crate::error::CalendarError;

/// Column labels of a week row, Monday first.
pub const WEEK_MASK: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];

/// One day of the calendar grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub label: &'static str,
    pub date: NaiveDateTime,
    pub is_in_future: bool,
    pub is_after_habit_ends: bool,
    pub is_before_habit_start: bool,
}

impl DayCell {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Whether the day lies inside the challenge range.
    pub fn is_in_range(&self) -> bool {
        !self.is_after_habit_ends && !self.is_before_habit_start
    }
}

/// A full ISO week, Monday through Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekRow {
    pub iso_year: i32,
    pub iso_week: u32,
    pub days: Vec<DayCell>,
}

impl WeekRow {
    pub fn monday(&self) -> Option<NaiveDate> {
        self.days.first().map(DayCell::day)
    }
}

/// Lays out `duration` days from `start_date` into whole ISO weeks.
///
/// Rows come back earliest week first. Days of a row that fall outside
/// `[start_date, end_date]` are kept and flagged instead of dropped, so every
/// row has seven cells. A zero duration still yields the week of `start_date`.
#[tracing::instrument(skip(now))]
pub fn build_weeks(
    duration: u32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: NaiveDateTime,
) -> Result<Vec<WeekRow>, CalendarError> {
    let last_day = add_days(start_date, i64::from(duration.max(1) - 1))?;
    let first_monday = week_monday(start_date.iso_week())?;
    let last_monday = week_monday(last_day.iso_week())?;

    let mut weeks = Vec::new();
    let mut monday = first_monday;
    loop {
        weeks.push(week_row(monday, start_date, end_date, now)?);
        if monday >= last_monday {
            break;
        }
        monday = add_days(monday, 7)?;
    }
    debug!(count = weeks.len(), "distinct iso weeks");
    Ok(weeks)
}

fn week_monday(week: IsoWeek) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon).ok_or(CalendarError::DateOutOfRange)
}

fn week_row(
    monday: NaiveDate,
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: NaiveDateTime,
) -> Result<WeekRow, CalendarError> {
    let days = WEEK_MASK
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let day = add_days(monday, index as i64)?;
            let date = day.and_time(NaiveTime::MIN);
            Ok(DayCell {
                label: *label,
                date,
                is_in_future: date > now,
                is_after_habit_ends: day > end_date,
                is_before_habit_start: day < start_date,
            })
        })
        .collect::<Result<Vec<_>, CalendarError>>()?;

    let week = monday.iso_week();
    Ok(WeekRow {
        iso_year: week.year(),
        iso_week: week.week(),
        days,
    })
}
