//! Store schedule text.
//!
//! The API returns times as `HH:MM:SS[.ffffff]` and opening days as English
//! day names joined by `", "`.

use std::collections::BTreeSet;

use queueline_protocol::Weekday;

/// `"14:30:00.000"` → `"14:30"`. Shorter input is returned as is.
pub fn clock_time(time: &str) -> &str {
    match time.char_indices().nth(5) {
        Some((end, _)) => &time[..end],
        None => time,
    }
}

/// `"HH:MM - HH:MM"`.
pub fn opening_hours(opening_time: &str, closing_time: &str) -> String {
    format!("{} - {}", clock_time(opening_time), clock_time(closing_time))
}

/// Summarizes a store's opening days.
///
/// - all seven days → `"Open every day"`
/// - exactly Monday to Friday → `"Open all weekdays"`
/// - six days → `"Open every day but <missing day>"`
/// - anything else → `"Open on <days>"`
///
/// Day names are matched case-insensitively, and two-letter codes
/// (`"MO"`) are accepted too. If any entry isn't a day, the input is
/// echoed back verbatim in the `"Open on"` form.
pub fn describe_opening_days(opening_days: &str) -> String {
    let entries: Vec<&str> = opening_days
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();

    if entries.is_empty() {
        return "Open on no days".to_string();
    }

    let parsed: Result<BTreeSet<Weekday>, _> = entries.iter().map(|e| e.parse()).collect();
    let Ok(days) = parsed else {
        return format!("Open on {}", opening_days.trim());
    };

    match days.len() {
        7 => "Open every day".to_string(),
        6 => {
            // Exactly one day of the week is absent.
            let missing = Weekday::ALL
                .into_iter()
                .find(|day| !days.contains(day))
                .map_or("", Weekday::name);
            format!("Open every day but {missing}")
        }
        5 if days.iter().all(|day| day.is_weekday()) => "Open all weekdays".to_string(),
        _ => {
            let names: Vec<&str> = days.iter().map(|day| day.name()).collect();
            format!("Open on {}", names.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_time_drops_seconds() {
        assert_eq!(clock_time("14:30:00.000"), "14:30");
        assert_eq!(clock_time("09:05:00"), "09:05");
    }

    #[test]
    fn test_clock_time_short_input_unchanged() {
        assert_eq!(clock_time("9:5"), "9:5");
        assert_eq!(clock_time(""), "");
    }

    #[test]
    fn test_opening_hours_formats_range() {
        assert_eq!(opening_hours("14:30:00", "22:00:00.000"), "14:30 - 22:00");
    }

    #[test]
    fn test_describe_all_seven_days() {
        assert_eq!(
            describe_opening_days(
                "Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday"
            ),
            "Open every day"
        );
    }

    #[test]
    fn test_describe_weekdays() {
        assert_eq!(
            describe_opening_days("Monday, Tuesday, Wednesday, Thursday, Friday"),
            "Open all weekdays"
        );
    }

    #[test]
    fn test_describe_six_days_names_missing_one() {
        assert_eq!(
            describe_opening_days("Monday, Tuesday, Wednesday, Thursday, Friday, Saturday"),
            "Open every day but Sunday"
        );
        assert_eq!(
            describe_opening_days("Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday"),
            "Open every day but Monday"
        );
    }

    #[test]
    fn test_describe_other_sets_lists_days_in_week_order() {
        assert_eq!(describe_opening_days("Saturday, Monday"), "Open on Monday, Saturday");
    }

    #[test]
    fn test_describe_accepts_codes() {
        assert_eq!(describe_opening_days("SA, SU"), "Open on Saturday, Sunday");
    }

    #[test]
    fn test_describe_unknown_entry_echoes_input() {
        assert_eq!(describe_opening_days("Monday, Holidays"), "Open on Monday, Holidays");
    }

    #[test]
    fn test_describe_empty() {
        assert_eq!(describe_opening_days("  "), "Open on no days");
    }
}
