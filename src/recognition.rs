//! Voice input
//!
//! Recognition backends report through [`RecognitionEvent`], a closed set of
//! outcomes, instead of loosely-shaped platform payloads. [`VoiceInput`]
//! tracks whether the assistant is listening and turns events into the next
//! user input.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Language, Result};

/// Default transcription model
pub const DEFAULT_RECOGNITION_MODEL: &str = "whisper-1";

/// Notice shown when no recognizer is configured
pub const UNSUPPORTED_NOTICE: &str = "Voice input is not supported on this system.";

/// Outcome of one recognition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Speech was recognized
    Result {
        /// Best transcript
        transcript: String,
    },
    /// Recognition failed
    Error {
        /// Human-readable failure reason
        reason: String,
    },
    /// Recognition ended without a result
    End,
}

/// A speech recognizer for single utterances
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize one utterance of WAV audio spoken in `language`
    async fn recognize(&self, audio: Vec<u8>, language: Language) -> RecognitionEvent;

    /// Recognizer name for logging
    fn name(&self) -> &'static str;
}

/// Listening state for the voice input control
#[derive(Debug, Clone)]
pub struct VoiceInput {
    supported: bool,
    listening: bool,
    language: Language,
}

impl VoiceInput {
    /// Create the control; `supported` is false when no recognizer exists
    #[must_use]
    pub const fn new(supported: bool, language: Language) -> Self {
        Self {
            supported,
            listening: false,
            language,
        }
    }

    /// Whether a recognition is in progress
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    /// Locale recognition runs in
    #[must_use]
    pub const fn locale(&self) -> &'static str {
        self.language.locale_tag()
    }

    /// Language recognition runs in
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Follow the session language
    pub const fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Flip between listening and idle
    ///
    /// Returns the new listening state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] if voice input is unsupported
    pub fn toggle(&mut self) -> Result<bool> {
        if !self.supported {
            return Err(Error::CapabilityMissing(UNSUPPORTED_NOTICE.to_string()));
        }

        self.listening = !self.listening;
        tracing::debug!(listening = self.listening, locale = self.locale(), "voice input toggled");
        Ok(self.listening)
    }

    /// Abandon the current recognition without a result
    pub const fn stop(&mut self) {
        self.listening = false;
    }

    /// Consume a recognition event; returns the transcript to use as input
    ///
    /// Every event ends the listening state.
    pub fn handle(&mut self, event: RecognitionEvent) -> Option<String> {
        self.listening = false;

        match event {
            RecognitionEvent::Result { transcript } => {
                let transcript = transcript.trim().to_string();
                (!transcript.is_empty()).then_some(transcript)
            }
            RecognitionEvent::Error { reason } => {
                tracing::error!(reason = %reason, "speech recognition error");
                None
            }
            RecognitionEvent::End => None,
        }
    }
}

/// Response from the transcription API
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Recognizer backed by the `OpenAI` transcription API
pub struct WhisperRecognizer {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl WhisperRecognizer {
    /// Create a recognizer
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(api_key: SecretString, model: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for voice input".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }

    async fn transcribe(&self, audio: Vec<u8>, language: Language) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), language = language.code(), "starting transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Recognition(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", language.code());

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Recognition(format!(
                "transcription API error {status}: {body}"
            )));
        }

        let result: TranscriptionResponse = response.json().await?;
        Ok(result.text)
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn recognize(&self, audio: Vec<u8>, language: Language) -> RecognitionEvent {
        match self.transcribe(audio, language).await {
            Ok(transcript) if transcript.trim().is_empty() => RecognitionEvent::End,
            Ok(transcript) => {
                tracing::info!(transcript = %transcript, "transcription complete");
                RecognitionEvent::Result { transcript }
            }
            Err(e) => RecognitionEvent::Error {
                reason: e.to_string(),
            },
        }
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}
