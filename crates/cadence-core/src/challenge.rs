use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::datetime::effective_end_date;
use crate::error::CalendarError;

/// Recurrence rule of a challenge.
///
/// Deserializes from the stored codes `daily`, `per-week` and `per-month`.
/// Every other code is treated as a specific-weekdays challenge and is
/// written back as `specific-days`; the original code is not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Daily,
    PerWeek,
    PerMonth,
    SpecificDays,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::PerWeek => "per-week",
            Frequency::PerMonth => "per-month",
            Frequency::SpecificDays => "specific-days",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "daily" => Frequency::Daily,
            "per-week" => Frequency::PerWeek,
            "per-month" => Frequency::PerMonth,
            _ => Frequency::SpecificDays,
        }
    }
}

impl From<String> for Frequency {
    fn from(code: String) -> Self {
        Frequency::from_code(&code)
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_per_period() -> u32 {
    1
}

// Stored documents write `null` for the count of an inactive frequency.
fn per_period_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_per_period))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(default)]
    pub name: Option<String>,

    pub start_date: NaiveDate,

    /// Number of days; 0 means a single-day challenge.
    pub duration: u32,

    pub frequency: Frequency,

    #[serde(default = "default_per_period", deserialize_with = "per_period_or_default")]
    pub per_week: u32,

    #[serde(default = "default_per_period", deserialize_with = "per_period_or_default")]
    pub per_month: u32,

    #[serde(default)]
    pub specific_days: Vec<String>,
}

impl Challenge {
    pub fn new(start_date: NaiveDate, duration: u32, frequency: Frequency) -> Self {
        Self {
            name: None,
            start_date,
            duration,
            frequency,
            per_week: default_per_period(),
            per_month: default_per_period(),
            specific_days: vec![],
        }
    }

    /// Last calendar day covered by the challenge.
    pub fn end_date(&self) -> Result<NaiveDate, CalendarError> {
        effective_end_date(self.start_date, self.duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub date: NaiveDate,
}

impl Completion {
    pub fn on(date: NaiveDate) -> Self {
        Self { date }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_fall_back_to_specific_days() {
        assert_eq!(Frequency::from_code("daily"), Frequency::Daily);
        assert_eq!(Frequency::from_code("per-week"), Frequency::PerWeek);
        assert_eq!(Frequency::from_code("per-month"), Frequency::PerMonth);
        assert_eq!(Frequency::from_code("custom"), Frequency::SpecificDays);
        assert_eq!(Frequency::from_code(""), Frequency::SpecificDays);
    }

    #[test]
    fn deserializes_challenge_with_defaults() {
        let raw = r#"{
            "start_date": "2026-10-01",
            "duration": 14,
            "frequency": "per-week",
            "per_week": 3
        }"#;
        let challenge: Challenge = serde_json::from_str(raw).expect("valid challenge json");
        assert_eq!(challenge.frequency, Frequency::PerWeek);
        assert_eq!(challenge.per_week, 3);
        assert_eq!(challenge.per_month, 1);
        assert!(challenge.specific_days.is_empty());
        assert!(challenge.name.is_none());
    }

    #[test]
    fn null_counts_fall_back_to_one() {
        let raw = r#"{
            "start_date": "2026-10-01",
            "duration": 30,
            "frequency": "per-week",
            "per_week": null,
            "per_month": null
        }"#;
        let challenge: Challenge = serde_json::from_str(raw).expect("valid challenge json");
        assert_eq!(challenge.per_week, 1);
        assert_eq!(challenge.per_month, 1);
    }

    #[test]
    fn unknown_code_is_saved_as_specific_days() {
        let raw = r#"{"start_date": "2026-10-01", "duration": 7, "frequency": "custom"}"#;
        let challenge: Challenge = serde_json::from_str(raw).expect("valid challenge json");
        let saved = serde_json::to_value(&challenge).expect("serialize challenge");
        assert_eq!(saved["frequency"], "specific-days");
    }

    #[test]
    fn end_date_counts_start_day() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 1).expect("valid date");
        let challenge = Challenge::new(start, 30, Frequency::Daily);
        assert_eq!(
            challenge.end_date().expect("in range"),
            NaiveDate::from_ymd_opt(2026, 10, 30).expect("valid date")
        );

        let single = Challenge::new(start, 0, Frequency::Daily);
        assert_eq!(single.end_date().expect("in range"), start);
    }
}
