use crate::challenge::Frequency;
use crate::error::CalendarError;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short display label for a recurrence rule.
///
/// `per_week` and `per_month` are only read for their own frequency; every
/// other frequency lists `specific_days`.
pub fn format_frequency(
    frequency: Frequency,
    per_week: u32,
    per_month: u32,
    specific_days: &[String],
) -> String {
    match frequency {
        Frequency::Daily => "Daily".to_string(),
        Frequency::PerWeek => format!("{per_week}x / week"),
        Frequency::PerMonth => format!("{per_month}x / month"),
        Frequency::SpecificDays => specific_days
            .iter()
            .map(|day| capitalize(day))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Three-letter name of a zero-based month index.
pub fn month_abbrev(month_index: u32) -> Result<&'static str, CalendarError> {
    MONTH_ABBREVIATIONS
        .get(month_index as usize)
        .copied()
        .ok_or(CalendarError::InvalidMonth(month_index))
}

/// Upper-cases the first character and leaves the rest untouched.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn labels_each_frequency() {
        assert_eq!(format_frequency(Frequency::Daily, 0, 0, &[]), "Daily");
        assert_eq!(format_frequency(Frequency::PerWeek, 3, 0, &[]), "3x / week");
        assert_eq!(format_frequency(Frequency::PerMonth, 0, 12, &[]), "12x / month");
        assert_eq!(
            format_frequency(Frequency::SpecificDays, 0, 0, &days(&["monday", "friday"])),
            "Monday, Friday"
        );
    }

    #[test]
    fn unknown_code_lists_days() {
        let frequency = Frequency::from_code("custom");
        assert_eq!(
            format_frequency(frequency, 5, 5, &days(&["monday", "friday"])),
            "Monday, Friday"
        );
        assert_eq!(format_frequency(frequency, 5, 5, &[]), "");
    }

    #[test]
    fn capitalize_leaves_non_letters_alone() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("sUNDAY"), "SUNDAY");
        assert_eq!(capitalize("1st"), "1st");
        assert_eq!(capitalize("ärger"), "Ärger");
    }

    #[test]
    fn month_names() {
        assert_eq!(month_abbrev(0), Ok("Jan"));
        assert_eq!(month_abbrev(8), Ok("Sep"));
        assert_eq!(month_abbrev(9), Ok("Oct"));
        assert_eq!(month_abbrev(11), Ok("Dec"));
        assert_eq!(month_abbrev(12), Err(CalendarError::InvalidMonth(12)));
    }
}
