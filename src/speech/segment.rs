//! Sentence segmentation and per-segment language detection

use regex::Regex;
use std::sync::LazyLock;

use crate::Language;

/// Speaking rate for Tamil-script segments
pub const TAMIL_RATE: f32 = 1.25;

/// Speaking rate for everything else, transliterated Tamil included
pub const ENGLISH_RATE: f32 = 1.4;

/// A run of text up to and including its sentence-terminal punctuation,
/// or a single stray character
static SENTENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?\n]+[.!?\n]*|.").expect("valid regex"));

/// One chunk of speech with the language it will be voiced in
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSegment {
    /// Trimmed chunk text, terminal punctuation kept
    pub text: String,
    /// Detected language
    pub language: Language,
    /// Locale tag handed to the synthesizer
    pub language_tag: &'static str,
    /// Speaking rate multiplier
    pub rate: f32,
}

impl SpeechSegment {
    /// Classify a chunk by script
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let language = if contains_tamil_script(text) {
            Language::Tamil
        } else {
            Language::English
        };

        let rate = match language {
            Language::Tamil => TAMIL_RATE,
            Language::English => ENGLISH_RATE,
        };

        Self {
            text: text.to_string(),
            language,
            language_tag: language.locale_tag(),
            rate,
        }
    }
}

/// Check for any code point in the Tamil block (U+0B80..=U+0BFF)
#[must_use]
pub fn contains_tamil_script(text: &str) -> bool {
    text.chars().any(|c| ('\u{0B80}'..='\u{0BFF}').contains(&c))
}

/// Split cleaned text into ordered, non-empty, classified segments
#[must_use]
pub fn segment(text: &str) -> Vec<SpeechSegment> {
    let mut chunks: Vec<&str> = SENTENCE_REGEX.find_iter(text).map(|m| m.as_str()).collect();
    if chunks.is_empty() {
        chunks.push(text);
    }

    chunks
        .into_iter()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(SpeechSegment::classify)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_language_segments() {
        let segments = segment("Hello. வணக்கம்!");
        assert_eq!(segments.len(), 2);

        assert_eq!(segments[0].text, "Hello.");
        assert_eq!(segments[0].language, Language::English);
        assert_eq!(segments[0].language_tag, "en-US");
        assert!((segments[0].rate - 1.4).abs() < f32::EPSILON);

        assert_eq!(segments[1].text, "வணக்கம்!");
        assert_eq!(segments[1].language, Language::Tamil);
        assert_eq!(segments[1].language_tag, "ta-IN");
        assert!((segments[1].rate - 1.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_punctuation_runs_stay_with_sentence() {
        let segments = segment("Really?! Yes...");
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Really?!", "Yes..."]);
    }

    #[test]
    fn test_newlines_are_boundaries() {
        let segments = segment("First line\nSecond line");
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["First line", "Second line"]);
    }

    #[test]
    fn test_no_terminal_punctuation_is_one_segment() {
        let segments = segment("Sankara kalluri");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Sankara kalluri");
    }

    #[test]
    fn test_whitespace_chunks_dropped() {
        let segments = segment("One. \n  \nTwo.");
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["One.", "Two."]);
    }

    #[test]
    fn test_tanglish_is_english() {
        let segments = segment("Vanakkam! Naan Sankara Connect.");
        assert!(segments.iter().all(|s| s.language == Language::English));
    }

    #[test]
    fn test_tamil_block_bounds() {
        assert!(contains_tamil_script("\u{0B80}"));
        assert!(contains_tamil_script("\u{0BFF}"));
        assert!(!contains_tamil_script("\u{0B7F}"));
        assert!(!contains_tamil_script("\u{0C00}"));
    }

    #[test]
    fn test_empty_text() {
        assert!(segment("").is_empty());
    }
}
