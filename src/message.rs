//! Conversation messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Language;
use crate::response::ParsedResponse;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking questions
    User,
    /// The assistant
    Model,
}

/// One entry in the conversation log
///
/// Messages are immutable once built; the log only ever appends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: String,
    role: Role,
    text: String,
    speech_text: Option<String>,
    sources: Vec<String>,
    suggestions: Vec<String>,
    timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A message typed (or spoken) by the user
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role: Role::User,
            text: text.into(),
            speech_text: None,
            sources: Vec::new(),
            suggestions: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// An assistant reply built from a parsed model response
    #[must_use]
    pub fn model(parsed: ParsedResponse) -> Self {
        let ParsedResponse {
            display_text,
            speech_text,
            suggestions,
            sources,
        } = parsed;

        Self {
            id: new_id(),
            role: Role::Model,
            text: display_text,
            speech_text: (!speech_text.is_empty()).then_some(speech_text),
            sources,
            suggestions,
            timestamp: Utc::now(),
        }
    }

    /// The greeting that opens a conversation in `language`
    #[must_use]
    pub fn greeting(language: Language) -> Self {
        Self {
            id: new_id(),
            role: Role::Model,
            text: language.greeting().to_string(),
            speech_text: language.greeting_speech().map(ToString::to_string),
            sources: Vec::new(),
            suggestions: language
                .greeting_suggestions()
                .iter()
                .map(ToString::to_string)
                .collect(),
            timestamp: Utc::now(),
        }
    }

    /// Opaque message identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Message author
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Display text (markdown for model replies)
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Speech-friendly text, if the reply carried one
    #[must_use]
    pub fn speech_text(&self) -> Option<&str> {
        self.speech_text.as_deref()
    }

    /// Text to hand to the speech dispatcher
    #[must_use]
    pub fn text_for_speech(&self) -> &str {
        self.speech_text.as_deref().unwrap_or(&self.text)
    }

    /// Grounding source URLs
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Follow-up suggestions
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Creation time
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response;

    #[test]
    fn test_user_message() {
        let msg = ChatMessage::user("What courses are offered?");
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.text(), "What courses are offered?");
        assert!(msg.speech_text().is_none());
        assert!(msg.suggestions().is_empty());
    }

    #[test]
    fn test_model_message_from_parsed() {
        let parsed = response::parse("X|||Y///S1").with_sources(["https://a.example/"]);
        let msg = ChatMessage::model(parsed);
        assert_eq!(msg.role(), Role::Model);
        assert_eq!(msg.text(), "X");
        assert_eq!(msg.speech_text(), Some("Y"));
        assert_eq!(msg.text_for_speech(), "Y");
        assert_eq!(msg.suggestions(), ["S1"]);
        assert_eq!(msg.sources(), ["https://a.example/"]);
    }

    #[test]
    fn test_model_message_without_speech_speaks_text() {
        let msg = ChatMessage::model(ParsedResponse::connection_failure(Language::English));
        assert!(msg.speech_text().is_none());
        assert_eq!(msg.text_for_speech(), msg.text());
    }

    #[test]
    fn test_greeting_per_language() {
        let en = ChatMessage::greeting(Language::English);
        assert_eq!(en.role(), Role::Model);
        assert!(en.speech_text().is_none());
        assert_eq!(en.suggestions().len(), 3);

        let ta = ChatMessage::greeting(Language::Tamil);
        assert!(ta.text().starts_with("வணக்கம்"));
        assert!(ta.text_for_speech().starts_with("Vanakkam"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = ChatMessage::user("a");
        let b = ChatMessage::user("a");
        assert_ne!(a.id(), b.id());
    }
}
