//! Strip markup that should not be read aloud

use regex::Regex;
use std::sync::LazyLock;

/// Markdown emphasis, heading and code markers
static MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_#`]").expect("valid regex"));

/// Bracketed link labels and citations, shortest match
static BRACKET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));

/// Bare URLs
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

/// Remove markdown markers, bracketed text and URLs, then trim
#[must_use]
pub fn clean_for_speech(text: &str) -> String {
    let text = MARKER_REGEX.replace_all(text, "");
    let text = BRACKET_REGEX.replace_all(&text, "");
    let text = URL_REGEX.replace_all(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_emphasis_and_headings() {
        assert_eq!(clean_for_speech("## **Admissions** are _open_"), "Admissions are open");
    }

    #[test]
    fn test_strips_inline_code() {
        assert_eq!(clean_for_speech("Run `apply` now"), "Run apply now");
    }

    #[test]
    fn test_strips_link_labels_and_urls() {
        assert_eq!(
            clean_for_speech("See [the site](https://sankara.ac.in/admissions) today"),
            "See ( today"
        );
        assert_eq!(
            clean_for_speech("Visit https://sankara.ac.in for details"),
            "Visit  for details"
        );
    }

    #[test]
    fn test_brackets_are_non_greedy() {
        assert_eq!(clean_for_speech("[1] Fees [2] apply"), "Fees  apply");
    }

    #[test]
    fn test_markup_only_becomes_empty() {
        assert_eq!(clean_for_speech("  ** ## [link] https://x.y  "), "");
    }

    #[test]
    fn test_tamil_text_untouched() {
        assert_eq!(clean_for_speech("**வணக்கம்!**"), "வணக்கம்!");
    }
}
