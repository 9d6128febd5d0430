//! Separator policy and the default value formatter.
//!
//! Media release names separate tokens with a wide mix of punctuation. The
//! constants below are the character sets the pipeline treats as separators;
//! [`cleanup`] is the default formatter applied to carved holes before their
//! text becomes a match value.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters treated as token separators anywhere in a release name.
pub const SEPS: &str = r#" .-_/\[](){}+*|=~#,;:"#;

/// Separators used when trimming title holes. Comma, semicolon and colon are
/// excluded: they occur inside legitimate episode titles and must not eat a
/// hole's edges.
pub const TITLE_SEPS: &str = r#" .-_/\[](){}+*|=~#"#;

/// Value formatter injected into hole carving.
pub type Formatter = fn(&str) -> String;

static SEP_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ .\-_/\\\[\](){}+*|=~#,;:]+").unwrap());

/// Default formatter: collapse every separator run to a single space and trim.
pub fn cleanup(raw: &str) -> String {
    SEP_RUN.replace_all(raw, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_collapses_separator_runs() {
        let cases = vec![
            ("Truth.be.Told", "Truth be Told"),
            ("Truth___be---Told", "Truth be Told"),
            (".Leading.and.trailing.", "Leading and trailing"),
            ("Who, Me", "Who Me"),
            ("already clean", "already clean"),
            ("...", ""),
            ("", ""),
        ];
        for (raw, expected) in cases {
            assert_eq!(cleanup(raw), expected, "cleanup({raw:?})");
        }
    }

    #[test]
    fn title_seps_is_a_strict_subset_of_seps() {
        assert!(TITLE_SEPS.chars().all(|c| SEPS.contains(c)));
        assert!(SEPS.chars().any(|c| !TITLE_SEPS.contains(c)));
    }
}
