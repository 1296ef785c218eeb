//! Comment text normalization
//!
//! Maps raw comment text onto the canonical form the classifier was trained
//! on. Compatibility normalization folds look-alike glyphs (fullwidth letters,
//! mathematical alphanumerics, ligatures) onto their plain counterparts, which
//! undoes the cheapest kind of spam obfuscation.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Normalize comment text for classification.
///
/// Trims, applies NFKC, collapses whitespace runs and lowercases. A run of two
/// or more whitespace characters becomes a single newline when it spans a line
/// break and a single space otherwise; lone whitespace characters are kept.
///
/// The function is total and idempotent.
pub fn normalize(text: &str) -> String {
    let composed: String = text.trim().nfkc().collect();
    // NFKC can expand a leading or trailing glyph into whitespace (U+00A8 -> " \u{308}")
    let collapsed = collapse_whitespace(composed.trim());
    collapsed.to_lowercase()
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN
        .replace_all(text, |caps: &Captures| {
            let run = &caps[0];
            if run.chars().nth(1).is_none() {
                run.to_string()
            } else if run.contains('\n') {
                "\n".to_string()
            } else {
                " ".to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapses_spaces() {
        assert_eq!(normalize("a    b"), "a b");
        assert_eq!(normalize("a \t b"), "a b");
    }

    #[test]
    fn test_collapses_blank_lines() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\nb");
        assert_eq!(normalize("a\n  \n\t\nb"), "a\nb");
    }

    #[test]
    fn test_keeps_single_separators() {
        assert_eq!(normalize("a b\nc"), "a b\nc");
    }

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(normalize("   FREE Crypto BONUS  \n"), "free crypto bonus");
    }

    #[test]
    fn test_nfkc_folds_lookalikes() {
        // fullwidth letters and the "fi" ligature
        assert_eq!(normalize("ＳＬＯＴ ｇａｃｏｒ"), "slot gacor");
        assert_eq!(normalize("\u{FB01}nd me"), "find me");
        // mathematical bold capitals
        assert_eq!(normalize("\u{1D40F}\u{1D40E}\u{1D412}"), "pos");
    }

    #[test]
    fn test_nbsp_becomes_space() {
        assert_eq!(normalize("a\u{00A0}\u{00A0}b"), "a b");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\n  "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "nice video!",
            "a    b",
            "a\n\n\n\nb",
            "  Ｍｅｇａ  ＷＩＮ \n\n\n slot   gacor\t\thari ini  ",
            "\u{00A8}edge",
            "line one\r\n\r\nline two",
            "İstanbul",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
