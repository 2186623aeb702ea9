//! Model response grammar
//!
//! The assistant is prompted to answer in a fixed plain-text layout:
//!
//! ```text
//! <display text> ||| <speech text>
//! ///
//! <suggestion 1>
//! <suggestion 2>
//! <suggestion 3>
//! ```
//!
//! Both delimiters are optional. The layout is a prompting convention, not a
//! schema, so parsing never fails: anything that does not match degrades to
//! "the whole reply is the answer".
//!
//! The two delimiters are split differently. `|||` splits at its first
//! occurrence and any later `|||` stays in the speech text. `///` splits on
//! every occurrence and keeps only the first two pieces, so text after a
//! second `///` is dropped. That asymmetry is how deployed prompts have
//! always been read and is kept as-is.

use serde::{Deserialize, Serialize};

use crate::Language;

/// Separates the answer from the follow-up suggestions
pub const SUGGESTIONS_DELIMITER: &str = "///";

/// Separates the displayed answer from its speech-friendly rendering
pub const SPEECH_DELIMITER: &str = "|||";

/// Upper bound on suggestions kept from a reply
pub const MAX_SUGGESTIONS: usize = 3;

/// Structured view of one model reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResponse {
    /// Text to render (markdown)
    pub display_text: String,
    /// Text to hand to the speech dispatcher; empty when there is nothing
    /// better than the display text
    pub speech_text: String,
    /// Follow-up questions, at most [`MAX_SUGGESTIONS`]
    pub suggestions: Vec<String>,
    /// Grounding source URLs, unique, in first-seen order
    pub sources: Vec<String>,
}

impl ParsedResponse {
    /// Attach grounding sources, dropping duplicates
    #[must_use]
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = dedup_sources(sources);
        self
    }

    /// Canned reply used when the chat service could not be reached
    #[must_use]
    pub fn connection_failure(language: Language) -> Self {
        Self {
            display_text: language.connection_apology().to_string(),
            speech_text: language
                .connection_apology_speech()
                .unwrap_or_default()
                .to_string(),
            suggestions: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Speech text if one was provided, otherwise `None`
    #[must_use]
    pub fn speech(&self) -> Option<&str> {
        (!self.speech_text.is_empty()).then_some(self.speech_text.as_str())
    }
}

/// Parse a raw model reply into display text, speech text and suggestions
///
/// Sources are not part of the reply text; attach them with
/// [`ParsedResponse::with_sources`].
#[must_use]
pub fn parse(raw: &str) -> ParsedResponse {
    let (content, suggestions) = split_suggestions(raw);
    let (display, speech) = split_speech(content);

    let display_text = if display.is_empty() {
        tracing::debug!("reply has no display text before delimiters, showing raw reply");
        raw.trim().to_string()
    } else {
        display.to_string()
    };

    ParsedResponse {
        display_text,
        speech_text: speech.to_string(),
        suggestions,
        sources: Vec::new(),
    }
}

/// Stage one: answer content vs. suggestions block
fn split_suggestions(raw: &str) -> (&str, Vec<String>) {
    if !raw.contains(SUGGESTIONS_DELIMITER) {
        return (raw.trim(), Vec::new());
    }

    let mut parts = raw.split(SUGGESTIONS_DELIMITER);
    let content = parts.next().unwrap_or_default().trim();
    let block = parts.next().unwrap_or_default().trim();

    let suggestions = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(ToString::to_string)
        .collect();

    (content, suggestions)
}

/// Stage two: display text vs. speech text
fn split_speech(content: &str) -> (&str, &str) {
    content
        .split_once(SPEECH_DELIMITER)
        .map_or((content, content), |(display, speech)| {
            (display.trim(), speech.trim())
        })
}

/// Remove duplicate URLs, keeping the first occurrence of each
#[must_use]
pub fn dedup_sources<I, S>(sources: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut unique: Vec<String> = Vec::new();
    for source in sources {
        let source = source.into();
        if !unique.contains(&source) {
            unique.push(source);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reply_is_trimmed_everywhere() {
        let parsed = parse("  Sankara College is in Coimbatore.  \n");
        assert_eq!(parsed.display_text, "Sankara College is in Coimbatore.");
        assert_eq!(parsed.speech_text, "Sankara College is in Coimbatore.");
        assert!(parsed.suggestions.is_empty());
        assert!(parsed.sources.is_empty());
    }

    #[test]
    fn test_suggestions_are_trimmed_and_empty_lines_dropped() {
        let parsed = parse("A///B\nC\n\nD");
        assert_eq!(parsed.display_text, "A");
        assert_eq!(parsed.suggestions, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_suggestions_truncated_to_three() {
        let parsed = parse("Answer\n///\n one \ntwo\n\n three\nfour\nfive");
        assert_eq!(parsed.suggestions, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_suggestions_handle_crlf() {
        let parsed = parse("Answer///\r\nFees?\r\nHostel?\r\n");
        assert_eq!(parsed.suggestions, vec!["Fees?", "Hostel?"]);
    }

    #[test]
    fn test_display_speech_and_suggestion() {
        let parsed = parse("X|||Y///S1");
        assert_eq!(parsed.display_text, "X");
        assert_eq!(parsed.speech_text, "Y");
        assert_eq!(parsed.suggestions, vec!["S1"]);
    }

    #[test]
    fn test_only_first_speech_delimiter_splits() {
        let parsed = parse("X ||| Y ||| Z");
        assert_eq!(parsed.display_text, "X");
        assert_eq!(parsed.speech_text, "Y ||| Z");
    }

    #[test]
    fn test_pieces_after_second_suggestions_delimiter_are_dropped() {
        let parsed = parse("Answer///one\ntwo///three");
        assert_eq!(parsed.display_text, "Answer");
        assert_eq!(parsed.suggestions, vec!["one", "two"]);
    }

    #[test]
    fn test_empty_suggestions_block() {
        let parsed = parse("Answer\n///\n   \n");
        assert_eq!(parsed.display_text, "Answer");
        assert!(parsed.suggestions.is_empty());
    }

    #[test]
    fn test_empty_display_falls_back_to_raw() {
        let parsed = parse("|||Sankara kalluri");
        assert_eq!(parsed.display_text, "|||Sankara kalluri");
        assert_eq!(parsed.speech_text, "Sankara kalluri");
    }

    #[test]
    fn test_missing_content_before_suggestions_falls_back_to_raw() {
        let parsed = parse("///\nFees?");
        assert_eq!(parsed.display_text, "///\nFees?");
        assert_eq!(parsed.suggestions, vec!["Fees?"]);
    }

    #[test]
    fn test_tamil_reply() {
        let raw = "சங்கரா கல்லூரி. ||| Sankara kalluri.\n///\nகட்டணம்?\nவிடுதி?";
        let parsed = parse(raw);
        assert_eq!(parsed.display_text, "சங்கரா கல்லூரி.");
        assert_eq!(parsed.speech_text, "Sankara kalluri.");
        assert_eq!(parsed.suggestions, vec!["கட்டணம்?", "விடுதி?"]);
    }

    #[test]
    fn test_dedup_sources_keeps_first_seen_order() {
        let sources = dedup_sources(["u1", "u2", "u1", "u3"]);
        assert_eq!(sources, vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_with_sources_dedups() {
        let parsed = parse("Answer").with_sources(vec![
            "https://sankara.ac.in/".to_string(),
            "https://sankara.ac.in/".to_string(),
        ]);
        assert_eq!(parsed.sources, vec!["https://sankara.ac.in/"]);
    }

    #[test]
    fn test_connection_failure_english_has_no_speech() {
        let parsed = ParsedResponse::connection_failure(Language::English);
        assert!(parsed.display_text.starts_with("I apologize"));
        assert!(parsed.speech().is_none());
        assert!(parsed.suggestions.is_empty());
        assert!(parsed.sources.is_empty());
    }

    #[test]
    fn test_connection_failure_tamil_has_tanglish_speech() {
        let parsed = ParsedResponse::connection_failure(Language::Tamil);
        assert_eq!(
            parsed.speech(),
            Some("Mannikkavum, sevaiyagathudan inaippathil sikkal ulladhu. Pinnar muyarchikkavum.")
        );
    }

    #[test]
    fn test_empty_reply_tamil_parses_into_speech() {
        let parsed = parse(Language::Tamil.empty_reply());
        assert!(parsed.display_text.starts_with("மன்னிக்கவும்"));
        assert!(parsed.speech_text.starts_with("Mannikkavum"));
    }
}
