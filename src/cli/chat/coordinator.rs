use std::time::Duration;

use tracing::{debug, error, info};

use super::conversation_state::{ConversationState, Message, Speaker};
use crate::config::{Config, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::error::ProviderError;
use crate::provider::{ChatRequest, ChunkSink, CompletionProvider};

/// Committed as the assistant turn, and shown to the user, whenever a
/// completion fails.
pub const FALLBACK_MESSAGE: &str =
    "I apologize, but I encountered an error while processing your request. Please try again later.";

/// Drives request/response cycles for one chat session.
///
/// The coordinator exclusively owns the session's [`ConversationState`]; all
/// mutation goes through it. `generate_response` borrows the coordinator
/// mutably, so two turns can never interleave on the same history.
pub struct ResponseCoordinator<P> {
    provider: P,
    state: ConversationState,
    model: String,
    temperature: f32,
    timeout: Option<Duration>,
}

impl<P: CompletionProvider> ResponseCoordinator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: ConversationState::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
        }
    }

    pub fn from_config(provider: P, config: &Config) -> Self {
        Self::new(provider)
            .with_model(config.model.clone())
            .with_temperature(config.temperature)
            .with_history_limit(config.max_history)
            .with_timeout(config.timeout)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Replaces the history with a fresh one bounded at `limit` messages.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.state = ConversationState::with_limit(limit);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one turn: record `user_input`, stream the reply through
    /// `on_chunk`, then record the reply.
    ///
    /// Never fails from the caller's point of view. If the provider errors,
    /// `on_chunk` receives [`FALLBACK_MESSAGE`] once and that text becomes the
    /// assistant turn.
    pub async fn generate_response<F>(&mut self, user_input: &str, mut on_chunk: F)
    where
        F: FnMut(&str) + Send,
    {
        self.state.add_message(Speaker::User, user_input);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: self.state.history(),
            temperature: self.temperature,
            stream: true,
        };

        debug!(
            "Generating response: model={}, history={}",
            request.model,
            request.messages.len()
        );

        match self.stream(&request, &mut on_chunk).await {
            Ok(full_response) => {
                info!("Response completed ({} chars)", full_response.chars().count());
                self.state.add_message(Speaker::Assistant, &full_response);
            }
            Err(e) => {
                error!("Error generating response: {}", e);
                on_chunk(FALLBACK_MESSAGE);
                self.state.add_message(Speaker::Assistant, FALLBACK_MESSAGE);
            }
        }
    }

    async fn stream(
        &self,
        request: &ChatRequest,
        on_chunk: &mut ChunkSink<'_>,
    ) -> Result<String, ProviderError> {
        let call = self.provider.stream_chat(request, on_chunk);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProviderError::Timeout(limit))?,
            None => call.await,
        }
    }

    pub fn history(&self) -> Vec<Message> {
        self.state.history()
    }

    pub fn turns(&self) -> usize {
        self.state.turns()
    }

    pub fn clear_history(&mut self) {
        self.state.clear();
    }

    /// Inject a turn directly, e.g. to seed a conversation.
    pub fn add_message(&mut self, speaker: Speaker, content: &str) {
        self.state.add_message(speaker, content);
    }
}
