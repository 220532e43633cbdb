//! Date parsing for the legacy export's formats.
//!
//! Three shapes occur in the spreadsheets: an ISO `YYYY-MM-DD` prefix
//! (sometimes followed by a time), the Brazilian `DD/MM/YYYY`, and the
//! abbreviated Portuguese month form `DD/mon./YYYY` (e.g. `06/jan./2025`).
//! Anything else yields `None`, never an error.

use chrono::NaiveDate;

const MONTH_ABBREVIATIONS: [(&str, u32); 12] = [
    ("jan", 1),
    ("fev", 2),
    ("mar", 3),
    ("abr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("set", 9),
    ("out", 10),
    ("nov", 11),
    ("dez", 12),
];

const MONTH_NAMES: [(&str, u32); 12] = [
    ("janeiro", 1),
    ("fevereiro", 2),
    ("março", 3),
    ("abril", 4),
    ("maio", 5),
    ("junho", 6),
    ("julho", 7),
    ("agosto", 8),
    ("setembro", 9),
    ("outubro", 10),
    ("novembro", 11),
    ("dezembro", 12),
];

/// Parse any of the accepted date shapes; unparseable input yields `None`.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_portuguese_month(trimmed)
        .or_else(|| parse_iso_prefix(trimmed))
        .or_else(|| parse_day_month_year(trimmed))
}

/// Month number for a full Portuguese month name (`janeiro` → 1).
pub fn month_number(name: &str) -> Option<u32> {
    let lowered = name.trim().to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(month, _)| *month == lowered)
        .map(|(_, number)| *number)
}

/// `DD/mon./YYYY` with the abbreviated month table.
fn parse_portuguese_month(value: &str) -> Option<NaiveDate> {
    let mut parts = value.splitn(3, '/');
    let day = parts.next()?;
    let month = parts.next()?;
    let year = parts.next()?;
    let month = month.strip_suffix('.')?.to_lowercase();
    let month = MONTH_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == month)
        .map(|(_, number)| *number)?;
    let day: u32 = parse_digits(day, 1, 2)?;
    let year: i32 = parse_digits(year, 4, 4)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `YYYY-MM-DD`, ignoring any trailing time component.
fn parse_iso_prefix(value: &str) -> Option<NaiveDate> {
    if value.len() < 10 || !value.is_char_boundary(10) {
        return None;
    }
    NaiveDate::parse_from_str(&value[..10], "%Y-%m-%d").ok()
}

/// `DD/MM/YYYY`.
fn parse_day_month_year(value: &str) -> Option<NaiveDate> {
    let mut parts = value.splitn(3, '/');
    let day: u32 = parse_digits(parts.next()?, 1, 2)?;
    let month: u32 = parse_digits(parts.next()?, 1, 2)?;
    let year: i32 = parse_digits(parts.next()?, 4, 4)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_digits<T: std::str::FromStr>(value: &str, min_len: usize, max_len: usize) -> Option<T> {
    let len = value.len();
    if len < min_len || len > max_len || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_portuguese_abbreviated_month() {
        assert_eq!(parse_flexible_date("06/jan./2025"), Some(date(2025, 1, 6)));
        assert_eq!(parse_flexible_date("8/dez./2024"), Some(date(2024, 12, 8)));
    }

    #[test]
    fn test_iso_with_trailing_time() {
        assert_eq!(
            parse_flexible_date("2024-03-15 10:30:00"),
            Some(date(2024, 3, 15))
        );
        assert_eq!(parse_flexible_date("2024-03-15"), Some(date(2024, 3, 15)));
    }

    #[test]
    fn test_day_month_year() {
        assert_eq!(parse_flexible_date("15/01/2024"), Some(date(2024, 1, 15)));
        assert_eq!(parse_flexible_date("5/1/2024"), Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_unparseable_yields_none() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("not a date"), None);
        assert_eq!(parse_flexible_date("32/01/2024"), None);
        assert_eq!(parse_flexible_date("15/xyz./2024"), None);
    }

    #[test]
    fn test_month_number_full_names() {
        assert_eq!(month_number("janeiro"), Some(1));
        assert_eq!(month_number("Março"), Some(3));
        assert_eq!(month_number("dezembro"), Some(12));
        assert_eq!(month_number("january"), None);
    }
}
