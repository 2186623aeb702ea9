//! Voice selection heuristics

use serde::{Deserialize, Serialize};

use crate::Language;

/// A synthesis voice offered by the speech platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Display name (e.g. "Google தமிழ்", "Tamil")
    pub name: String,
    /// Locale tag as reported by the platform (`ta-IN`, `ta_IN`, `en-us`, ...)
    pub lang: String,
}

impl Voice {
    /// Create a voice description
    #[must_use]
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// Pick the best voice for `language`, first match wins
///
/// Tamil: exact `ta-IN`/`ta_IN`, then a name containing "tamil", then any
/// locale starting with `ta` (both case-insensitive). English: exact
/// `en-US`/`en_US`, then any locale starting with `en`.
///
/// `None` means the platform default voice for the locale tag.
#[must_use]
pub fn select_voice(language: Language, voices: &[Voice]) -> Option<&Voice> {
    match language {
        Language::Tamil => voices
            .iter()
            .find(|v| v.lang == "ta-IN" || v.lang == "ta_IN")
            .or_else(|| voices.iter().find(|v| v.name.to_lowercase().contains("tamil")))
            .or_else(|| voices.iter().find(|v| v.lang.to_lowercase().starts_with("ta"))),
        Language::English => voices
            .iter()
            .find(|v| v.lang == "en-US" || v.lang == "en_US")
            .or_else(|| voices.iter().find(|v| v.lang.starts_with("en"))),
    }
}

/// Last non-empty voice list seen from the platform
///
/// Platforms often populate their voice list asynchronously, so the live
/// list may come back empty right after startup or between refreshes.
#[derive(Debug, Clone, Default)]
pub struct VoiceCache {
    voices: Vec<Voice>,
}

impl VoiceCache {
    /// Create an empty cache
    #[must_use]
    pub const fn new() -> Self {
        Self { voices: Vec::new() }
    }

    /// Record a voice-list update; empty lists are ignored
    ///
    /// Returns true if the cache changed
    pub fn refresh(&mut self, voices: Vec<Voice>) -> bool {
        if voices.is_empty() || voices == self.voices {
            return false;
        }

        tracing::debug!(count = voices.len(), "voice list updated");
        self.voices = voices;
        true
    }

    /// Cached voices (possibly empty)
    #[must_use]
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }
}
