//! Conversation language and its localized resources
//!
//! The language selection drives the prompt suffix sent with every query,
//! the greeting that seeds a fresh conversation, the recognition locale and
//! the canned apologies used when the chat service lets us down.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Conversation language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (`en-US`)
    #[default]
    English,
    /// Tamil (`ta-IN`)
    Tamil,
}

impl Language {
    /// Locale tag used for recognition and as the session locale
    #[must_use]
    pub const fn locale_tag(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Tamil => "ta-IN",
        }
    }

    /// Two-letter code, as used by transcription APIs
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Tamil => "ta",
        }
    }

    /// Suffix appended to the user's message so the model answers in this
    /// language using the response grammar
    #[must_use]
    pub const fn prompt_instruction(self) -> &'static str {
        match self {
            Self::English => " (Please answer in English. Add suggestions after ///)",
            Self::Tamil => {
                " (Please answer in Tamil. Output format: Tamil Script ||| Tanglish Transliteration. Then add suggestions after ///)"
            }
        }
    }

    /// Greeting shown when a conversation starts
    #[must_use]
    pub const fn greeting(self) -> &'static str {
        match self {
            Self::English => "Hello! I am SankaraConnect. Ask me anything about Sankara College.",
            Self::Tamil => {
                "வணக்கம்! நான் சங்கரா கனெக்ட் (SankaraConnect). சங்கரா கல்லூரி பற்றிய உங்கள் கேள்விகளை என்னிடம் கேட்கலாம்."
            }
        }
    }

    /// Speech-friendly greeting, when it differs from the displayed one
    #[must_use]
    pub const fn greeting_speech(self) -> Option<&'static str> {
        match self {
            Self::English => None,
            Self::Tamil => Some(
                "Vanakkam! Naan Sankara Connect. Sankara kalluri patriya ungal kelvigalai ennidam ketkalam.",
            ),
        }
    }

    /// Suggestions offered alongside the greeting
    #[must_use]
    pub const fn greeting_suggestions(self) -> [&'static str; 3] {
        match self {
            Self::English => [
                "What courses are offered?",
                "Are there hostel facilities?",
                "How do I apply?",
            ],
            Self::Tamil => [
                "கல்லூரியில் வழங்கப்படும் படிப்புகள்?",
                "விடுதி வசதிகள் உள்ளனவா?",
                "விண்ணப்பிப்பது எப்படி?",
            ],
        }
    }

    /// Input prompt shown to the user
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::English => "Ask about Sankara College...",
            Self::Tamil => "சங்கரா கல்லூரி பற்றி கேட்கவும்...",
        }
    }

    /// Raw reply substituted when the service answers with no text
    ///
    /// This goes through the response parser like any model reply, so the
    /// Tamil variant carries its transliteration after `|||`.
    #[must_use]
    pub const fn empty_reply(self) -> &'static str {
        match self {
            Self::English => "I'm sorry, I couldn't retrieve that information.",
            Self::Tamil => {
                "மன்னிக்கவும், என்னால் தகவலைப் பெற முடியவில்லை. ||| Mannikkavum, ennal thagavalai pera mudiyavillai."
            }
        }
    }

    /// Apology displayed when the chat service cannot be reached
    #[must_use]
    pub const fn connection_apology(self) -> &'static str {
        match self {
            Self::English => {
                "I apologize, but I'm having trouble connecting to the server right now. Please try again later."
            }
            Self::Tamil => {
                "மன்னிக்கவும், சேவையகத்துடன் இணைப்பதில் சிக்கல் உள்ளது. பின்னர் முயற்சிக்கவும்."
            }
        }
    }

    /// Speech-friendly connection apology (Tamil only)
    #[must_use]
    pub const fn connection_apology_speech(self) -> Option<&'static str> {
        match self {
            Self::English => None,
            Self::Tamil => {
                Some("Mannikkavum, sevaiyagathudan inaippathil sikkal ulladhu. Pinnar muyarchikkavum.")
            }
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => f.write_str("English"),
            Self::Tamil => f.write_str("தமிழ்"),
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "en" | "eng" | "english" | "en-us" => Ok(Self::English),
            "ta" | "tam" | "tamil" | "ta-in" | "தமிழ்" => Ok(Self::Tamil),
            other => Err(Error::UnknownLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_aliases() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!("en_US".parse::<Language>().unwrap(), Language::English);
        assert_eq!("ta-IN".parse::<Language>().unwrap(), Language::Tamil);
        assert_eq!(" tamil ".parse::<Language>().unwrap(), Language::Tamil);
        assert_eq!("தமிழ்".parse::<Language>().unwrap(), Language::Tamil);
    }

    #[test]
    fn test_parse_unknown_language() {
        let err = "fr".parse::<Language>().unwrap_err();
        assert!(matches!(err, Error::UnknownLanguage(ref s) if s == "fr"));
    }

    #[test]
    fn test_locale_tags() {
        assert_eq!(Language::English.locale_tag(), "en-US");
        assert_eq!(Language::Tamil.locale_tag(), "ta-IN");
    }

    #[test]
    fn test_tamil_empty_reply_uses_speech_delimiter() {
        assert!(Language::Tamil.empty_reply().contains("|||"));
        assert!(!Language::English.empty_reply().contains("|||"));
    }

    #[test]
    fn test_speech_variants_only_for_tamil() {
        assert!(Language::English.greeting_speech().is_none());
        assert!(Language::English.connection_apology_speech().is_none());
        assert!(Language::Tamil.greeting_speech().is_some());
        assert!(Language::Tamil.connection_apology_speech().is_some());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Language::Tamil).unwrap();
        assert_eq!(json, "\"tamil\"");
        let lang: Language = serde_json::from_str("\"english\"").unwrap();
        assert_eq!(lang, Language::English);
    }
}
