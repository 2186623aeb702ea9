//! Speech output
//!
//! Turns reply text into an ordered series of utterances, each voiced in the
//! language its script suggests, and submits them to a [`SpeechPlatform`].
//!
//! ```text
//! text ─► clean ─► segment ─► classify ─► select voice ─► enqueue (FIFO)
//! ```
//!
//! New output pre-empts old output: every [`SpeechDispatcher::speak`] call
//! cancels whatever the platform is still playing before queueing.

mod clean;
mod command;
mod segment;
mod voice;

use std::sync::Arc;

pub use clean::clean_for_speech;
pub use command::{CommandPlatform, DEFAULT_COMMAND, parse_voice_listing};
pub use segment::{ENGLISH_RATE, SpeechSegment, TAMIL_RATE, contains_tamil_script, segment};
pub use voice::{Voice, VoiceCache, select_voice};

/// One request for audible playback
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Text to speak
    pub text: String,
    /// Locale tag (`en-US`, `ta-IN`)
    pub lang: String,
    /// Speaking rate multiplier (1.0 = platform normal)
    pub rate: f32,
    /// Explicit voice, or `None` for the platform default of `lang`
    pub voice: Option<Voice>,
}

/// Host speech-synthesis facility
///
/// Implementations must play enqueued utterances one after another in
/// submission order.
pub trait SpeechPlatform: Send + Sync {
    /// Stop current playback and drop everything queued
    fn cancel_all(&self);

    /// Queue an utterance behind anything already queued
    fn enqueue(&self, utterance: Utterance);

    /// Voices currently known to the platform (may be empty while loading)
    fn voices(&self) -> Vec<Voice>;

    /// Platform name for logging
    fn name(&self) -> &'static str;
}

/// Build the utterances for `text` without touching any platform
#[must_use]
pub fn plan_utterances(text: &str, voices: &[Voice]) -> Vec<Utterance> {
    let cleaned = clean_for_speech(text);
    if cleaned.is_empty() {
        return Vec::new();
    }

    segment(&cleaned)
        .into_iter()
        .map(|segment| Utterance {
            voice: select_voice(segment.language, voices).cloned(),
            lang: segment.language_tag.to_string(),
            rate: segment.rate,
            text: segment.text,
        })
        .collect()
}

/// Routes text to the speech platform, segment by segment
pub struct SpeechDispatcher {
    platform: Option<Arc<dyn SpeechPlatform>>,
    voices: VoiceCache,
}

impl SpeechDispatcher {
    /// Create a dispatcher over an available platform
    #[must_use]
    pub fn new(platform: Arc<dyn SpeechPlatform>) -> Self {
        let mut voices = VoiceCache::new();
        voices.refresh(platform.voices());
        Self {
            platform: Some(platform),
            voices,
        }
    }

    /// Create a dispatcher for a host without speech synthesis
    ///
    /// Every `speak` call logs a warning and does nothing.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            platform: None,
            voices: VoiceCache::new(),
        }
    }

    /// Whether speech output is possible at all
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.platform.is_some()
    }

    /// Voice-list change notification from the platform
    pub fn voices_changed(&mut self, voices: Vec<Voice>) {
        self.voices.refresh(voices);
    }

    /// Voices the dispatcher would choose from right now
    #[must_use]
    pub fn voices(&self) -> &[Voice] {
        self.voices.voices()
    }

    /// Speak `text` using the platform's current voices, or the last
    /// non-empty list seen if the platform reports none
    pub fn speak_text(&mut self, text: &str) {
        if let Some(platform) = &self.platform {
            let live = platform.voices();
            self.voices.refresh(live);
        }
        let voices = self.voices.voices().to_vec();
        self.speak(text, &voices);
    }

    /// Speak `text` choosing from `voices`
    ///
    /// Cancels anything in flight first, then submits one utterance per
    /// segment in order. Never fails.
    pub fn speak(&self, text: &str, voices: &[Voice]) {
        let Some(platform) = &self.platform else {
            tracing::warn!("speech synthesis not supported");
            return;
        };

        platform.cancel_all();

        let utterances = plan_utterances(text, voices);
        if utterances.is_empty() {
            tracing::debug!("nothing to speak after cleanup");
            return;
        }

        tracing::debug!(
            platform = platform.name(),
            segments = utterances.len(),
            "dispatching speech"
        );

        for utterance in utterances {
            tracing::trace!(
                lang = %utterance.lang,
                rate = utterance.rate,
                voice = ?utterance.voice.as_ref().map(|v| &v.name),
                text = %utterance.text,
                "enqueue utterance"
            );
            platform.enqueue(utterance);
        }
    }

    /// Stop all speech
    pub fn cancel(&self) {
        if let Some(platform) = &self.platform {
            platform.cancel_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_mixed_language() {
        let voices = vec![Voice::new("Tamil", "ta"), Voice::new("US", "en-US")];
        let plan = plan_utterances("**Hello.** வணக்கம்!", &voices);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].text, "Hello.");
        assert_eq!(plan[0].lang, "en-US");
        assert_eq!(plan[0].voice.as_ref().unwrap().name, "US");
        assert_eq!(plan[1].text, "வணக்கம்!");
        assert_eq!(plan[1].lang, "ta-IN");
        assert_eq!(plan[1].voice.as_ref().unwrap().name, "Tamil");
    }

    #[test]
    fn test_plan_empty_after_cleanup() {
        assert!(plan_utterances("## https://sankara.ac.in", &[]).is_empty());
    }

    #[test]
    fn test_unavailable_dispatcher_is_noop() {
        let mut dispatcher = SpeechDispatcher::unavailable();
        assert!(!dispatcher.is_available());
        dispatcher.speak_text("Hello.");
        dispatcher.cancel();
    }
}
