use chrono::NaiveDate;
use tracing::debug;

use crate::challenge::Challenge;
use crate::datetime::add_days;
use crate::error::CalendarError;

/// Days a finished challenge stays in active views before it is archived.
pub const ARCHIVE_AFTER_DAYS: i64 = 7;

/// True once the challenge's last day lies strictly before `today`.
#[tracing::instrument(skip(challenge), fields(start = %challenge.start_date, duration = challenge.duration))]
pub fn is_past(challenge: &Challenge, today: NaiveDate) -> Result<bool, CalendarError> {
    let end = challenge.end_date()?;
    debug!(%end, "effective end date");
    Ok(end < today)
}

/// True once a full week has passed since the challenge's last day.
#[tracing::instrument(skip(challenge), fields(start = %challenge.start_date, duration = challenge.duration))]
pub fn is_older_than_a_week(challenge: &Challenge, today: NaiveDate) -> Result<bool, CalendarError> {
    let archive_from = add_days(challenge.end_date()?, ARCHIVE_AFTER_DAYS)?;
    Ok(archive_from < today)
}

/// A challenge whose end date is today or later is still running.
pub fn is_ongoing(end_date: NaiveDate, today: NaiveDate) -> bool {
    today <= end_date
}
