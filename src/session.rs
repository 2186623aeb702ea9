//! Conversation session
//!
//! Owns the language selection, the append-only conversation log and the
//! speech dispatcher. One user turn is in flight at a time: [`ChatSession::send`]
//! borrows the session mutably for the whole round trip, and the log only
//! changes once the reply is in. Dropping a `send` future leaves the log as
//! it was.

use std::sync::Arc;

use crate::chat::{ChatService, send_query};
use crate::message::{ChatMessage, Role};
use crate::speech::SpeechDispatcher;
use crate::{Error, Language, Result};

/// A single conversation with the assistant
pub struct ChatSession {
    service: Arc<dyn ChatService>,
    speech: SpeechDispatcher,
    language: Language,
    messages: Vec<ChatMessage>,
    auto_speak: bool,
}

impl ChatSession {
    /// Start a conversation seeded with the greeting for `language`
    #[must_use]
    pub fn new(service: Arc<dyn ChatService>, speech: SpeechDispatcher, language: Language) -> Self {
        Self {
            service,
            speech,
            language,
            messages: vec![ChatMessage::greeting(language)],
            auto_speak: false,
        }
    }

    /// Speak every new reply as soon as it arrives
    #[must_use]
    pub const fn with_auto_speak(mut self, auto_speak: bool) -> Self {
        self.auto_speak = auto_speak;
        self
    }

    /// Current language
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Conversation log, oldest first
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent message
    #[must_use]
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Speech dispatcher used by this session
    #[must_use]
    pub const fn speech(&self) -> &SpeechDispatcher {
        &self.speech
    }

    /// Switch language: stops speech and restarts the conversation
    pub fn set_language(&mut self, language: Language) {
        self.speech.cancel();
        self.language = language;
        self.messages = vec![ChatMessage::greeting(language)];
        tracing::info!(language = ?language, "conversation reset");
    }

    /// Send a user message and wait for the reply
    ///
    /// Blank input is ignored and returns `None`. Otherwise the user
    /// message and the reply are appended to the log together and the reply
    /// is returned. Upstream failures arrive as an apology reply, not an error.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }

        let question = ChatMessage::user(text);
        let parsed = send_query(self.service.as_ref(), &self.messages, text, self.language).await;

        self.messages.push(question);
        self.messages.push(ChatMessage::model(parsed));

        if self.auto_speak
            && let Some(reply) = self.messages.last()
        {
            let speech = reply.text_for_speech().to_string();
            self.speech.speak_text(&speech);
        }

        self.messages.last()
    }

    /// Send one of a message's suggestions as the next user message
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the message or suggestion does not exist
    pub async fn send_suggestion(
        &mut self,
        message_id: &str,
        index: usize,
    ) -> Result<Option<&ChatMessage>> {
        let suggestion = self
            .find(message_id)?
            .suggestions()
            .get(index)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("suggestion {index} of message {message_id}")))?;

        Ok(self.send(&suggestion).await)
    }

    /// Read a model message aloud, preferring its speech text
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the message does not exist or is not
    /// a model message
    pub fn speak(&mut self, message_id: &str) -> Result<()> {
        let message = self.find(message_id)?;
        if message.role() != Role::Model {
            return Err(Error::NotFound(format!("model message {message_id}")));
        }

        let text = message.text_for_speech().to_string();
        self.speech.speak_text(&text);
        Ok(())
    }

    /// Stop any speech in progress
    pub fn stop_speaking(&self) {
        self.speech.cancel();
    }

    fn find(&self, message_id: &str) -> Result<&ChatMessage> {
        self.messages
            .iter()
            .find(|m| m.id() == message_id)
            .ok_or_else(|| Error::NotFound(format!("message {message_id}")))
    }
}
