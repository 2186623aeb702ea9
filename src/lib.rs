//! SankaraConnect - bilingual college assistant
//!
//! This library provides the core of the SankaraConnect assistant:
//! - Grounded chat queries with a fixed reply grammar
//! - Reply parsing into display text, speech text and suggestions
//! - Segment-aware speech output (English / Tamil voice selection)
//! - Voice input with explicit recognition events
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  ChatSession                         │
//! │   language  │  conversation log  │  voice input     │
//! └──────┬───────────────────────────────────┬──────────┘
//!        │ send_query                        │ speak
//! ┌──────▼──────────────┐          ┌─────────▼──────────┐
//! │  ChatService        │          │  SpeechDispatcher  │
//! │  (Gemini + search)  │          │  clean → segment → │
//! │        │            │          │  classify → voice  │
//! │  response::parse    │          └─────────┬──────────┘
//! └─────────────────────┘          ┌─────────▼──────────┐
//!                                  │  SpeechPlatform    │
//!                                  └────────────────────┘
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod language;
pub mod message;
pub mod recognition;
pub mod render;
pub mod response;
pub mod session;
pub mod speech;

pub use chat::{AssistantProfile, ChatRequest, ChatService, GeminiClient, ModelReply, send_query};
pub use config::Config;
pub use error::{Error, Result};
pub use language::Language;
pub use message::{ChatMessage, Role};
pub use recognition::{RecognitionEvent, SpeechRecognizer, VoiceInput, WhisperRecognizer};
pub use response::{ParsedResponse, parse};
pub use session::ChatSession;
pub use speech::{
    CommandPlatform, SpeechDispatcher, SpeechPlatform, SpeechSegment, Utterance, Voice,
};
