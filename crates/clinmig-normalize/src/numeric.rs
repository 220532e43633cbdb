//! Money and boolean parsing for the legacy export.

use clinmig_model::Money;

/// Parse a Brazilian-format monetary value.
///
/// Strips the `R$` symbol and spaces; an empty value or a lone `-` means
/// `0.00`. Every dot is a thousands separator and the comma is the decimal
/// mark, so `1.234,56` reads as `1234.56`. Malformed input yields `None`.
pub fn parse_money(raw: &str) -> Option<Money> {
    let stripped = raw.trim().replace("R$", "").replace(' ', "");
    if stripped.is_empty() || stripped == "-" {
        return Some(Money::ZERO);
    }
    let normalized = stripped.replace('.', "").replace(',', ".");
    decimal_to_cents(&normalized).map(Money::from_cents)
}

/// True only for the fixed truthy tokens; absent or anything else is false.
pub fn parse_boolean(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "1" | "sim" | "yes" | "s"
    )
}

fn decimal_to_cents(value: &str) -> Option<i64> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let (units, fraction) = match digits.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (digits, ""),
    };
    if units.is_empty() && fraction.is_empty() {
        return None;
    }
    if !units.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let units: i64 = if units.is_empty() { 0 } else { units.parse().ok()? };
    let mut cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction[..2].parse::<i64>().ok()?,
    };
    // Quantize to two digits rounding half-to-even, like the legacy
    // importer's decimal context.
    if fraction.len() > 2 {
        let third = fraction.as_bytes()[2];
        let rest_nonzero = fraction.as_bytes()[3..].iter().any(|digit| *digit != b'0');
        if third > b'5' || (third == b'5' && (rest_nonzero || cents % 2 == 1)) {
            cents += 1;
        }
    }
    let total = units.checked_mul(100)?.checked_add(cents)?;
    Some(if negative { -total } else { total })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brazilian_thousands_and_decimal() {
        assert_eq!(parse_money("R$ 1.234,56"), Some(Money::from_cents(123_456)));
        assert_eq!(parse_money("150,00"), Some(Money::from_cents(15_000)));
    }

    #[test]
    fn test_empty_and_dash_are_zero() {
        assert_eq!(parse_money(""), Some(Money::ZERO));
        assert_eq!(parse_money("-"), Some(Money::ZERO));
        assert_eq!(parse_money("R$  "), Some(Money::ZERO));
    }

    #[test]
    fn test_every_dot_is_a_thousands_separator() {
        // Dotted-decimal input is read as an integer, matching the legacy
        // importer rather than guessing the writer's intent.
        assert_eq!(parse_money("12.50"), Some(Money::from_cents(125_000)));
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(parse_money("-35,10"), Some(Money::from_cents(-3_510)));
    }

    #[test]
    fn test_third_digit_rounds_half_to_even() {
        // Exact halves go to the even cent.
        assert_eq!(parse_money("2,125"), Some(Money::from_cents(212)));
        assert_eq!(parse_money("2,135"), Some(Money::from_cents(214)));
        assert_eq!(parse_money("2,145"), Some(Money::from_cents(214)));
        // Anything past a half rounds up regardless.
        assert_eq!(parse_money("2,1251"), Some(Money::from_cents(213)));
        assert_eq!(parse_money("2,126"), Some(Money::from_cents(213)));
        assert_eq!(parse_money("2,124"), Some(Money::from_cents(212)));
    }

    #[test]
    fn test_malformed_yields_none() {
        assert_eq!(parse_money("abc"), None);
        assert_eq!(parse_money("1,2,3"), None);
    }

    #[test]
    fn test_boolean_tokens() {
        assert!(parse_boolean("Sim"));
        assert!(parse_boolean("S"));
        assert!(parse_boolean("1"));
        assert!(parse_boolean("TRUE"));
        assert!(parse_boolean("yes"));
        assert!(!parse_boolean(""));
        assert!(!parse_boolean("não"));
        assert!(!parse_boolean("0"));
    }
}
