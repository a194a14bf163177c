//! Streaming research-assistant chat over the DeepSeek chat completions API.
//!
//! A session is a [`ResponseCoordinator`] wrapping a bounded
//! [`ConversationState`] and a [`CompletionProvider`]; the binary drives it
//! from a terminal REPL.

pub mod cli;
pub mod config;
pub mod deepseek_client;
pub mod error;
pub mod provider;

pub use cli::chat::conversation_state::{ConversationState, Message, Role, Speaker};
pub use cli::chat::coordinator::{ResponseCoordinator, FALLBACK_MESSAGE};
pub use config::Config;
pub use deepseek_client::DeepSeekClient;
pub use provider::{ChatRequest, ChunkSink, CompletionProvider};
