use crate::challenge::Frequency;

/// Failures of the pure calendar computations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("invalid month index {0}; expected 0..=11")]
    InvalidMonth(u32),

    #[error("score is undefined for {frequency} challenge after {elapsed_days} elapsed days")]
    UndefinedScore {
        frequency: Frequency,
        elapsed_days: i64,
    },

    #[error("date arithmetic left the supported calendar range")]
    DateOutOfRange,
}
