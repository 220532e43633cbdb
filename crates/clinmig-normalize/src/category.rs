//! Categorical field normalization against fixed synonym tables.

use clinmig_model::SynonymTable;

/// Resolve a categorical value against a synonym table.
///
/// Lookup is exact on the uppercase-trimmed input; a miss falls back to
/// title-casing the trimmed original so unknown-but-present values survive
/// migration instead of being rejected. Empty input yields `None`.
pub fn normalize_category(raw: &str, table: &SynonymTable) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match table.resolve(trimmed) {
        Some(canonical) => Some(canonical.to_string()),
        None => Some(title_case(trimmed)),
    }
}

/// Capitalize the first letter of every word, lowercasing the rest.
///
/// A letter starts a word when the previous character is not alphabetic, so
/// hyphenated values capitalize on both sides (`on-line` → `On-Line`).
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                result.extend(ch.to_uppercase());
            } else {
                result.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(ch);
            at_word_start = true;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SynonymTable {
        SynonymTable::from_pairs(&[("IPE", "IPE SAÚDE"), ("BRADESCO", "BRADESCO SAÚDE")])
    }

    #[test]
    fn test_exact_uppercase_lookup() {
        assert_eq!(
            normalize_category("ipe", &table()),
            Some("IPE SAÚDE".to_string())
        );
    }

    #[test]
    fn test_miss_falls_back_to_title_case() {
        assert_eq!(
            normalize_category("PLANO NOVO", &table()),
            Some("Plano Novo".to_string())
        );
    }

    #[test]
    fn test_empty_yields_none() {
        assert_eq!(normalize_category("  ", &table()), None);
    }

    #[test]
    fn test_title_case_word_boundaries() {
        assert_eq!(title_case("SANTA CASA"), "Santa Casa");
        assert_eq!(title_case("on-line"), "On-Line");
    }
}
