//! Small total transforms for free-text and coded fields.

use clinmig_model::Sex;

/// Trim and bound a free-text value; blank input yields `None`.
///
/// Truncation counts characters, not bytes, so multi-byte names are never
/// split mid-character.
pub fn clean_text(raw: &str, max_len: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() > max_len {
        Some(trimmed.chars().take(max_len).collect())
    } else {
        Some(trimmed.to_string())
    }
}

/// Keep only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Map the legacy sex column onto the stored code set.
///
/// Any non-empty value outside the known spellings becomes `Other` rather
/// than being dropped.
pub fn normalize_sex(raw: &str) -> Option<Sex> {
    let upper = raw.trim().to_uppercase();
    match upper.as_str() {
        "" => None,
        "M" | "MASCULINO" => Some(Sex::Male),
        "F" | "FEMININO" => Some(Sex::Female),
        _ => Some(Sex::Other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_trims_and_bounds() {
        assert_eq!(clean_text("  abc  ", 10), Some("abc".to_string()));
        assert_eq!(clean_text("abcdef", 3), Some("abc".to_string()));
        assert_eq!(clean_text("   ", 10), None);
    }

    #[test]
    fn test_clean_text_counts_characters() {
        assert_eq!(clean_text("ééé", 2), Some("éé".to_string()));
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("111.444.777-35"), "11144477735");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn test_normalize_sex() {
        assert_eq!(normalize_sex("m"), Some(Sex::Male));
        assert_eq!(normalize_sex("FEMININO"), Some(Sex::Female));
        assert_eq!(normalize_sex("outro valor"), Some(Sex::Other));
        assert_eq!(normalize_sex("  "), None);
    }
}
