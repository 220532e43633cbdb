//! Field-level constraint checks.
//!
//! Each validator is total: it returns the canonical value or a [`Rejection`]
//! naming why the value was refused. The orchestrator aggregates rejections
//! into per-field warning counts; they never abort a row.

use chrono::NaiveDate;
use thiserror::Error;

use crate::datetime::parse_flexible_date;
use crate::text::digits_only;

/// Why a field value was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("national id does not have 11 digits")]
    NationalIdLength,
    #[error("national id digits are all identical")]
    NationalIdAllSame,
    #[error("date not recognized")]
    DateUnparseable,
    #[error("date outside the allowed range")]
    DateOutOfRange,
    #[error("malformed email address")]
    EmailShape,
}

/// Validate a national id (CPF) and return it in the canonical
/// `XXX.XXX.XXX-XX` form.
///
/// The digit form must be exactly 11 digits and not a known all-same-digit
/// invalid pattern.
pub fn validate_national_id(raw: &str) -> Result<String, Rejection> {
    let digits = digits_only(raw);
    if digits.len() != 11 {
        return Err(Rejection::NationalIdLength);
    }
    let first = digits.as_bytes()[0];
    if digits.bytes().all(|b| b == first) {
        return Err(Rejection::NationalIdAllSame);
    }
    Ok(format!(
        "{}.{}.{}-{}",
        &digits[..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..]
    ))
}

/// Parse a birth date and check it against the inclusive `[min, max]` range.
pub fn validate_birth_date(
    raw: &str,
    min: NaiveDate,
    max: NaiveDate,
) -> Result<NaiveDate, Rejection> {
    let date = parse_flexible_date(raw).ok_or(Rejection::DateUnparseable)?;
    if date < min || date > max {
        return Err(Rejection::DateOutOfRange);
    }
    Ok(date)
}

/// Trim and lowercase an email address, requiring the `local@domain.tld`
/// shape: exactly one `@`, at least one `.` after it, no whitespace.
pub fn validate_email(raw: &str) -> Result<String, Rejection> {
    let cleaned = raw.trim().to_lowercase();
    if cleaned.chars().any(char::is_whitespace) {
        return Err(Rejection::EmailShape);
    }
    let Some((local, domain)) = cleaned.split_once('@') else {
        return Err(Rejection::EmailShape);
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(Rejection::EmailShape);
    }
    match domain.rsplit_once('.') {
        Some((head, tld)) if !head.is_empty() && !tld.is_empty() => Ok(cleaned),
        _ => Err(Rejection::EmailShape),
    }
}

/// Format a postal code as `#####-###` when it has exactly 8 digits;
/// otherwise pass the trimmed original through unchanged.
///
/// Postal codes are advisory, so this never rejects.
pub fn validate_postal_code(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() == 8 {
        format!("{}-{}", &digits[..5], &digits[5..])
    } else {
        raw.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_id_canonical_form() {
        assert_eq!(
            validate_national_id("111.444.777-35"),
            Ok("111.444.777-35".to_string())
        );
        assert_eq!(
            validate_national_id("11144477735"),
            Ok("111.444.777-35".to_string())
        );
    }

    #[test]
    fn test_national_id_rejections() {
        assert_eq!(
            validate_national_id("123"),
            Err(Rejection::NationalIdLength)
        );
        assert_eq!(
            validate_national_id("111.111.111-11"),
            Err(Rejection::NationalIdAllSame)
        );
    }

    #[test]
    fn test_birth_date_range() {
        let min = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let max = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(
            validate_birth_date("1990-01-01", min, max),
            Ok(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())
        );
        assert_eq!(
            validate_birth_date("1899-12-31", min, max),
            Err(Rejection::DateOutOfRange)
        );
        assert_eq!(
            validate_birth_date("next week", min, max),
            Err(Rejection::DateUnparseable)
        );
        // Bounds are inclusive.
        assert_eq!(validate_birth_date("1900-01-01", min, max), Ok(min));
        assert_eq!(validate_birth_date("2025-12-31", min, max), Ok(max));
    }

    #[test]
    fn test_email_shape() {
        assert_eq!(
            validate_email("  Maria.Silva@Example.COM "),
            Ok("maria.silva@example.com".to_string())
        );
        assert_eq!(validate_email("no-at-sign"), Err(Rejection::EmailShape));
        assert_eq!(validate_email("a@b"), Err(Rejection::EmailShape));
        assert_eq!(validate_email("a b@c.d"), Err(Rejection::EmailShape));
        assert_eq!(validate_email("a@b@c.d"), Err(Rejection::EmailShape));
        assert_eq!(validate_email("a@.com"), Err(Rejection::EmailShape));
    }

    #[test]
    fn test_postal_code_format_or_passthrough() {
        assert_eq!(validate_postal_code("90010150"), "90010-150");
        assert_eq!(validate_postal_code("90.010-150"), "90010-150");
        assert_eq!(validate_postal_code("  1234  "), "1234");
    }
}
