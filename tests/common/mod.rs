//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sankara_connect::{
    ChatRequest, ChatService, Error, Language, ModelReply, Result, SpeechPlatform, Utterance,
    Voice,
};

/// A call made against [`RecordingPlatform`]
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    Cancel,
    Enqueue(Utterance),
}

/// Speech platform that records every call in order
#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    voices: Mutex<Vec<Voice>>,
}

impl RecordingPlatform {
    /// Platform reporting `voices`
    #[must_use]
    pub fn with_voices(voices: Vec<Voice>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            voices: Mutex::new(voices),
        })
    }

    /// Change what `voices()` reports from now on
    pub fn set_voices(&self, voices: Vec<Voice>) {
        *self.voices.lock().unwrap() = voices;
    }

    /// Every call so far
    #[must_use]
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the enqueued utterances
    #[must_use]
    pub fn utterances(&self) -> Vec<Utterance> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::Enqueue(u) => Some(u),
                PlatformCall::Cancel => None,
            })
            .collect()
    }

    /// Forget recorded calls
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl SpeechPlatform for RecordingPlatform {
    fn cancel_all(&self) {
        self.calls.lock().unwrap().push(PlatformCall::Cancel);
    }

    fn enqueue(&self, utterance: Utterance) {
        self.calls.lock().unwrap().push(PlatformCall::Enqueue(utterance));
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.lock().unwrap().clone()
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A request as seen by [`ScriptedChatService`]
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub message: String,
    pub language: Language,
    pub history_len: usize,
}

/// Chat service answering from a script of canned replies
#[derive(Default)]
pub struct ScriptedChatService {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    requests: Mutex<Vec<SeenRequest>>,
    delay: Mutex<Duration>,
}

impl ScriptedChatService {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Service that waits `delay` before answering each request
    #[must_use]
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        let service = Self::default();
        *service.delay.lock().unwrap() = delay;
        Arc::new(service)
    }

    /// Change the wait applied to later requests
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Queue a successful text reply
    pub fn reply(&self, text: &str) {
        self.reply_with_sources(text, &[]);
    }

    /// Queue a successful reply with grounding sources
    pub fn reply_with_sources(&self, text: &str, sources: &[&str]) {
        self.replies.lock().unwrap().push_back(Ok(ModelReply {
            text: Some(text.to_string()),
            sources: sources.iter().map(ToString::to_string).collect(),
        }));
    }

    /// Queue a reply with no text
    pub fn reply_empty(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(ModelReply::default()));
    }

    /// Queue an upstream failure
    pub fn fail(&self, reason: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(Error::Chat(reason.to_string())));
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatService for ScriptedChatService {
    async fn generate(&self, request: &ChatRequest<'_>) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(SeenRequest {
            message: request.message.to_string(),
            language: request.language,
            history_len: request.history.len(),
        });

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Chat("script exhausted".to_string())))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Voices of a typical desktop with both languages installed
#[must_use]
pub fn bilingual_voices() -> Vec<Voice> {
    vec![
        Voice::new("Microsoft David", "en-US"),
        Voice::new("Google US English", "en-US"),
        Voice::new("Tamil", "ta-IN"),
    ]
}
