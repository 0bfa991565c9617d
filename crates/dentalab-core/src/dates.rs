//! Date helpers.

use chrono::{Datelike, NaiveDate};

/// Whole years between `birth` and `today`.
///
/// Returns `None` when `birth` lies after `today`. A 29 February birthday
/// counts as reached on 1 March in common years.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Age in whole years as of today's UTC date.
pub fn age_from_birthdate(birth: NaiveDate) -> Option<u32> {
    age_on(birth, chrono::Utc::now().date_naive())
}

/// Parse `YYYY-MM-DD` or the German `DD.MM.YYYY` form.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d.%m.%Y"))
        .ok()
}

/// `DD.MM.YYYY`, as printed on worksheets.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_age_before_and_on_birthday() {
        assert_eq!(age_on(d(1990, 8, 20), d(2024, 8, 19)), Some(33));
        assert_eq!(age_on(d(1990, 8, 20), d(2024, 8, 20)), Some(34));
    }

    #[test]
    fn test_age_newborn_and_future() {
        assert_eq!(age_on(d(2024, 1, 1), d(2024, 1, 1)), Some(0));
        assert_eq!(age_on(d(2024, 1, 2), d(2024, 1, 1)), None);
    }

    #[test]
    fn test_leap_day_birthday() {
        assert_eq!(age_on(d(2000, 2, 29), d(2023, 2, 28)), Some(22));
        assert_eq!(age_on(d(2000, 2, 29), d(2023, 3, 1)), Some(23));
        assert_eq!(age_on(d(2000, 2, 29), d(2024, 2, 29)), Some(24));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-03-05"), Some(d(2024, 3, 5)));
        assert_eq!(parse_date("05.03.2024"), Some(d(2024, 3, 5)));
        assert_eq!(parse_date("March 5"), None);
        assert_eq!(format_date(d(2024, 3, 5)), "05.03.2024");
    }
}
