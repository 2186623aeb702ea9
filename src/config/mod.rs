//! Configuration management for SankaraConnect
//!
//! Values resolve with priority env > TOML file > default.

pub mod file;

use std::time::Duration;

use secrecy::SecretString;

use crate::chat::{AssistantProfile, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::recognition::DEFAULT_RECOGNITION_MODEL;
use crate::speech::DEFAULT_COMMAND;
use crate::{Language, Result};

pub use file::ConfigFile;

/// Default timeout for one chat request
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// SankaraConnect configuration
#[derive(Debug)]
pub struct Config {
    /// Language the conversation starts in
    pub language: Language,

    /// LLM configuration
    pub llm: LlmConfig,

    /// Assistant identity for the system instruction
    pub assistant: AssistantProfile,

    /// Speech output configuration
    pub speech: SpeechConfig,

    /// Voice input configuration
    pub recognition: RecognitionConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Timeout applied to each chat request
    pub timeout: Duration,
}

/// Speech output configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Enable speech output
    pub enabled: bool,

    /// Synthesizer command looked up on `PATH`
    pub command: String,

    /// Speak replies as they arrive
    pub auto_speak: bool,
}

/// Voice input configuration
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// Transcription model
    pub model: String,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// Gemini API key (chat)
    pub gemini: Option<SecretString>,

    /// `OpenAI` API key (voice input)
    pub openai: Option<SecretString>,
}

impl Config {
    /// Load configuration from the environment and the config file, with
    /// an explicit speech disable option
    ///
    /// # Errors
    ///
    /// Returns error if the configured language is not recognized
    pub fn load_with_options(disable_speech: bool) -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok(), disable_speech)
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if the configured language is not recognized
    pub fn from_sources<F>(fc: ConfigFile, env: F, disable_speech: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let language = env("SANKARA_LANGUAGE")
            .or(fc.language)
            .map(|s| s.parse::<Language>())
            .transpose()?
            .unwrap_or_default();

        // API keys (env > toml > None); API_KEY kept for older deployments
        let api_keys = ApiKeys {
            gemini: env("GEMINI_API_KEY")
                .or_else(|| env("API_KEY"))
                .or(fc.api_keys.gemini)
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
            openai: env("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
        };

        let llm = LlmConfig {
            model: env("SANKARA_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: env("SANKARA_LLM_BASE_URL")
                .or(fc.llm.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                env("SANKARA_LLM_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .or(fc.llm.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        };

        let defaults = AssistantProfile::default();
        let assistant = AssistantProfile {
            name: fc.assistant.name.unwrap_or(defaults.name),
            college: fc.assistant.college.unwrap_or(defaults.college),
            site: fc.assistant.site.unwrap_or(defaults.site),
        };

        let env_disabled = env("SANKARA_DISABLE_SPEECH")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        let speech = SpeechConfig {
            enabled: !disable_speech && !env_disabled && fc.speech.enabled.unwrap_or(true),
            command: env("SANKARA_SPEECH_COMMAND")
                .or(fc.speech.command)
                .unwrap_or_else(|| DEFAULT_COMMAND.to_string()),
            auto_speak: fc.speech.auto_speak.unwrap_or(false),
        };

        if disable_speech {
            tracing::info!("speech explicitly disabled via --no-speech");
        }

        let recognition = RecognitionConfig {
            model: fc
                .recognition
                .model
                .unwrap_or_else(|| DEFAULT_RECOGNITION_MODEL.to_string()),
        };

        Ok(Self {
            language,
            llm,
            assistant,
            speech,
            recognition,
            api_keys,
        })
    }
}
