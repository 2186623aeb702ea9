//! Chat service access
//!
//! A [`ChatService`] performs one grounded model call per user turn. The
//! [`send_query`] entry point wraps it so that callers always get a
//! displayable [`ParsedResponse`]: upstream failures become a canned
//! apology in the session language instead of an error.

mod gemini;
mod prompt;

use async_trait::async_trait;

pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient};
pub use prompt::{AssistantProfile, user_turn};

use crate::message::ChatMessage;
use crate::response::{self, ParsedResponse};
use crate::{Language, Result};

/// One user turn to send to the model
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// Conversation so far (oldest first)
    pub history: &'a [ChatMessage],
    /// The new user message
    pub message: &'a str,
    /// Language the answer should be in
    pub language: Language,
}

/// What the model returned for one turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    /// Raw reply text following the response grammar, if any
    pub text: Option<String>,
    /// Grounding source URLs (may contain duplicates)
    pub sources: Vec<String>,
}

/// A hosted model that answers one turn at a time
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Generate a reply for `request`
    ///
    /// # Errors
    ///
    /// Returns error if the upstream call fails
    async fn generate(&self, request: &ChatRequest<'_>) -> Result<ModelReply>;

    /// Service name for logging
    fn name(&self) -> &'static str;
}

/// Ask the chat service and parse its reply
///
/// Never fails: an upstream error yields the language's connection apology,
/// and an empty reply is replaced by the language's "couldn't retrieve"
/// reply before parsing.
#[must_use]
pub async fn send_query(
    service: &dyn ChatService,
    history: &[ChatMessage],
    message: &str,
    language: Language,
) -> ParsedResponse {
    let request = ChatRequest {
        history,
        message,
        language,
    };

    match service.generate(&request).await {
        Ok(reply) => {
            let raw = reply
                .text
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| {
                    tracing::warn!(service = service.name(), "empty reply from chat service");
                    language.empty_reply().to_string()
                });

            response::parse(&raw).with_sources(reply.sources)
        }
        Err(e) => {
            tracing::error!(service = service.name(), error = %e, "chat service error");
            ParsedResponse::connection_failure(language)
        }
    }
}
