//! Text normalisation shared by the rules and the store.

/// Normalises a column header for comparison: trimmed and lower-cased.
///
/// This is also the key under which the learned-mapping store remembers a
/// column.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Lower-cases a value token and strips every non-alphanumeric character,
/// so `M.D.` and `md` compare equal.
pub fn normalize_token(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Splits a cell value on any of `separators`, dropping empty pieces.
pub fn split_tokens<'a>(raw: &'a str, separators: &'a [char]) -> impl Iterator<Item = &'a str> {
    raw.split(move |ch: char| separators.contains(&ch))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Splits on commas, semicolons and any whitespace.
pub fn split_on_comma_semicolon_whitespace(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|ch: char| ch == ',' || ch == ';' || ch.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// True if the text is exactly ten ASCII digits.
pub fn is_ten_digits(text: &str) -> bool {
    text.len() == 10 && text.bytes().all(|b| b.is_ascii_digit())
}

/// True if the text is non-empty and made only of ASCII digits.
pub fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// True if the text is non-empty and made only of digits, spaces and dashes.
pub fn is_digits_spaces_dashes(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|ch| ch.is_ascii_digit() || ch == ' ' || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_trims_and_lowercases() {
        assert_eq!(normalize_name("  PROV_NPI "), "prov_npi");
    }

    #[test]
    fn normalize_token_strips_punctuation() {
        assert_eq!(normalize_token("M.D."), "md");
        assert_eq!(normalize_token("PA-C"), "pac");
        assert_eq!(normalize_token("Haitian Creole"), "haitiancreole");
    }

    #[test]
    fn split_tokens_drops_empty_pieces() {
        let parts: Vec<&str> = split_tokens("Spanish;; French + ASL", &[',', ';', '+']).collect();
        assert_eq!(parts, vec!["Spanish", "French", "ASL"]);
    }

    #[test]
    fn split_on_whitespace_and_separators() {
        let parts: Vec<&str> = split_on_comma_semicolon_whitespace("MD, FACS;PhD  DO").collect();
        assert_eq!(parts, vec!["MD", "FACS", "PhD", "DO"]);
    }

    #[test]
    fn digit_shapes() {
        assert!(is_ten_digits("1234567890"));
        assert!(!is_ten_digits("123456789"));
        assert!(is_all_digits("42"));
        assert!(!is_all_digits(""));
        assert!(is_digits_spaces_dashes("123-456 7890"));
        assert!(!is_digits_spaces_dashes("(555) 123"));
    }
}
