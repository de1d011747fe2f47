use chrono::NaiveDate;
use tracing::debug;

use crate::challenge::{Challenge, Frequency};
use crate::datetime::date_diff;
use crate::error::CalendarError;
use crate::temporal::is_ongoing;

const DAYS_PER_WEEK: f64 = 7.0;
// Months are approximated, not calendar-accurate.
const DAYS_PER_MONTH: f64 = 31.0;

/// Days the score is measured over: time elapsed since the start while the
/// challenge runs, its full duration once it has ended.
pub fn elapsed_days(challenge: &Challenge, end_date: NaiveDate, today: NaiveDate) -> i64 {
    if is_ongoing(end_date, today) {
        date_diff(today, challenge.start_date)
    } else {
        i64::from(challenge.duration)
    }
}

/// Completion percentage against the challenge's goal so far.
///
/// The result can exceed 100 when a challenge is over-fulfilled. A zero (or
/// negative, before the start day) goal has no defined score and is reported
/// as [`CalendarError::UndefinedScore`], except for specific-weekday
/// challenges without completions, which score 0.
#[tracing::instrument(
    skip(challenge),
    fields(frequency = %challenge.frequency, start = %challenge.start_date)
)]
pub fn compute_score(
    challenge: &Challenge,
    completions: u32,
    end_date: NaiveDate,
    today: NaiveDate,
) -> Result<i64, CalendarError> {
    let elapsed = elapsed_days(challenge, end_date, today);
    let days = elapsed as f64;

    let goal = match challenge.frequency {
        Frequency::Daily => days,
        Frequency::PerWeek => days / DAYS_PER_WEEK * f64::from(challenge.per_week),
        Frequency::PerMonth => days / DAYS_PER_MONTH * f64::from(challenge.per_month),
        Frequency::SpecificDays => {
            if completions == 0 {
                return Ok(0);
            }
            days / DAYS_PER_WEEK * challenge.specific_days.len() as f64
        }
    };
    debug!(elapsed, goal, completions, "score inputs");

    if goal <= 0.0 {
        return Err(CalendarError::UndefinedScore {
            frequency: challenge.frequency,
            elapsed_days: elapsed,
        });
    }

    Ok((100.0 * f64::from(completions) / goal).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::add_days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn finished(frequency: Frequency, duration: u32) -> (Challenge, NaiveDate, NaiveDate) {
        let challenge = Challenge::new(date(2026, 1, 1), duration, frequency);
        let end = challenge.end_date().expect("in range");
        let today = date(2026, 10, 16);
        (challenge, end, today)
    }

    #[test]
    fn daily_score_over_full_duration() {
        let (challenge, end, today) = finished(Frequency::Daily, 10);
        assert_eq!(compute_score(&challenge, 5, end, today), Ok(50));
        assert_eq!(compute_score(&challenge, 10, end, today), Ok(100));
        assert_eq!(compute_score(&challenge, 12, end, today), Ok(120));
    }

    #[test]
    fn per_week_score() {
        let (mut challenge, end, today) = finished(Frequency::PerWeek, 14);
        challenge.per_week = 3;
        assert_eq!(compute_score(&challenge, 3, end, today), Ok(50));
    }

    #[test]
    fn per_month_uses_31_day_months() {
        let (mut challenge, end, today) = finished(Frequency::PerMonth, 62);
        challenge.per_month = 4;
        // goal = 62 / 31 * 4 = 8
        assert_eq!(compute_score(&challenge, 2, end, today), Ok(25));
    }

    #[test]
    fn specific_days_score_and_zero_short_circuit() {
        let (mut challenge, end, today) = finished(Frequency::SpecificDays, 28);
        challenge.specific_days = vec!["monday".to_string(), "thursday".to_string()];
        // goal = 4 weeks * 2 days
        assert_eq!(compute_score(&challenge, 6, end, today), Ok(75));
        assert_eq!(compute_score(&challenge, 0, end, today), Ok(0));

        challenge.specific_days.clear();
        assert_eq!(compute_score(&challenge, 0, end, today), Ok(0));
        assert!(compute_score(&challenge, 1, end, today).is_err());
    }

    #[test]
    fn ongoing_challenge_uses_elapsed_days() {
        let start = date(2026, 10, 6);
        let challenge = Challenge::new(start, 30, Frequency::Daily);
        let end = challenge.end_date().expect("in range");
        let today = add_days(start, 10).expect("in range");
        assert_eq!(elapsed_days(&challenge, end, today), 10);
        assert_eq!(compute_score(&challenge, 5, end, today), Ok(50));
    }

    #[test]
    fn rounds_half_up() {
        let (challenge, end, today) = finished(Frequency::Daily, 8);
        // 100 * 1 / 8 = 12.5
        assert_eq!(compute_score(&challenge, 1, end, today), Ok(13));
        let (challenge, end, today) = finished(Frequency::Daily, 3);
        // 100 * 1 / 3 = 33.33
        assert_eq!(compute_score(&challenge, 1, end, today), Ok(33));
    }

    #[test]
    fn start_day_of_daily_challenge_is_undefined() {
        let start = date(2026, 10, 16);
        let challenge = Challenge::new(start, 30, Frequency::Daily);
        let end = challenge.end_date().expect("in range");
        assert_eq!(
            compute_score(&challenge, 1, end, start),
            Err(CalendarError::UndefinedScore {
                frequency: Frequency::Daily,
                elapsed_days: 0,
            })
        );
    }
}
