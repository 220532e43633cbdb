//! Comparison form of patient names.
//!
//! The normalized form is used by the matcher and the deduplicator only;
//! stored display names are never rewritten.

/// Replace accented Latin letters with their base letter.
///
/// Fixed replacement table covering the characters that occur in the legacy
/// data; anything outside it passes through unchanged.
pub fn fold_diacritics(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            'á' | 'à' | 'ã' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'õ' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Lowercase, fold diacritics, drop everything outside `[a-z0-9 ]`, and
/// collapse internal whitespace.
pub fn normalize_name(raw: &str) -> String {
    let folded = fold_diacritics(&raw.to_lowercase());
    let kept: String = folded
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diacritic_and_whitespace_insensitive() {
        assert_eq!(normalize_name("José  DA Silva"), normalize_name("jose da silva"));
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(normalize_name("Maria-José d'Ávila"), "mariajose davila");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_fold_diacritics_keeps_unknown_chars() {
        assert_eq!(fold_diacritics("ação"), "acao");
        assert_eq!(fold_diacritics("müller"), "muller");
        assert_eq!(fold_diacritics("x-y"), "x-y");
    }
}
