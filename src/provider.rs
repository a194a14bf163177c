use async_trait::async_trait;
use serde::Serialize;

use crate::cli::chat::conversation_state::Message;
use crate::error::ProviderError;

/// Body of an OpenAI-compatible chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub stream: bool,
}

/// Receives streamed text fragments in arrival order.
///
/// The bound stays explicitly higher-ranked: `#[async_trait]` renames elided
/// lifetimes, which would tie the fragment to the method call.
pub type ChunkSink<'s> = dyn for<'a> FnMut(&'a str) + Send + 's;

/// A remote model that can stream a chat completion.
///
/// Implementations call `on_chunk` once per text fragment, in arrival order,
/// and resolve with the concatenation of every fragment they delivered.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn stream_chat(
        &self,
        request: &ChatRequest,
        on_chunk: &mut ChunkSink<'_>,
    ) -> Result<String, ProviderError>;
}
