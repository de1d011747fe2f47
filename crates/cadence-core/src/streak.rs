use chrono::NaiveDate;
use tracing::debug;

use crate::challenge::Completion;
use crate::datetime::is_same_day;

/// Longest run of consecutive calendar days with at least one completion.
///
/// The log may be unsorted and may hold several completions per day; the
/// caller's slice is left untouched.
#[tracing::instrument(skip_all, fields(completions = completions.len()))]
pub fn longest_streak(completions: &[Completion]) -> u32 {
    let mut days: Vec<NaiveDate> = completions.iter().map(|c| c.date).collect();
    days.sort_unstable();
    days.dedup();

    let Some(first) = days.first() else {
        return 0;
    };

    let mut best = 1u32;
    let mut run = 1u32;
    let mut previous = *first;
    for &day in &days[1..] {
        if previous.succ_opt().is_some_and(|next| is_same_day(&next, &day)) {
            run += 1;
            best = best.max(run);
        } else {
            run = 1;
        }
        previous = day;
    }

    debug!(distinct_days = days.len(), best, "computed longest streak");
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(y: i32, m: u32, d: u32) -> Completion {
        Completion::on(NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
    }

    #[test]
    fn empty_log_has_no_streak() {
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn single_completion() {
        assert_eq!(longest_streak(&[on(2026, 10, 1)]), 1);
    }

    #[test]
    fn gap_breaks_the_run() {
        let log = [on(2026, 10, 1), on(2026, 10, 2), on(2026, 10, 3), on(2026, 10, 5)];
        assert_eq!(longest_streak(&log), 3);
    }

    #[test]
    fn unsorted_log_with_duplicates() {
        let log = [
            on(2026, 10, 5),
            on(2026, 10, 2),
            on(2026, 10, 3),
            on(2026, 10, 2),
            on(2026, 10, 1),
            on(2026, 10, 6),
            on(2026, 10, 3),
        ];
        assert_eq!(longest_streak(&log), 3);
        assert_eq!(log[0], on(2026, 10, 5), "input order is preserved");
    }

    #[test]
    fn same_day_duplicates_do_not_extend() {
        let log = [on(2026, 10, 1), on(2026, 10, 1), on(2026, 10, 1)];
        assert_eq!(longest_streak(&log), 1);
    }

    #[test]
    fn runs_across_month_and_year_ends() {
        let log = [
            on(2026, 12, 30),
            on(2026, 12, 31),
            on(2027, 1, 1),
            on(2027, 1, 2),
            on(2027, 2, 28),
            on(2027, 3, 1),
        ];
        assert_eq!(longest_streak(&log), 4);
    }

    #[test]
    fn leap_day_joins_february_and_march() {
        let log = [on(2028, 2, 28), on(2028, 2, 29), on(2028, 3, 1), on(2028, 3, 3)];
        assert_eq!(longest_streak(&log), 3);
    }
}
