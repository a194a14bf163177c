use serde::{Deserialize, Serialize};

/// Default ceiling on the number of stored messages, system prompt included.
pub const MAX_HISTORY_LEN: usize = 20;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful research assistant. Provide detailed and accurate responses to user queries.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Who may append a turn. The system prompt is seeded by the store itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl From<Speaker> for Role {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::User => Role::User,
            Speaker::Assistant => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Bounded chat history for one session.
///
/// Index 0 always holds the system prompt. Once the history grows past
/// `limit`, the oldest turns after the system prompt are dropped so that
/// exactly `limit` messages remain.
pub struct ConversationState {
    messages: Vec<Message>,
    limit: usize,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::with_limit(MAX_HISTORY_LEN)
    }

    /// `limit` is clamped to 2 so at least one turn survives next to the
    /// system prompt. Storage grows on demand; only the default window is
    /// reserved up front.
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(2);
        let mut state = Self {
            messages: Vec::with_capacity(limit.min(MAX_HISTORY_LEN) + 1),
            limit,
        };
        state.seed();
        state
    }

    fn seed(&mut self) {
        self.messages.push(Message::new(Role::System, SYSTEM_PROMPT));
    }

    pub fn add_message(&mut self, speaker: Speaker, content: &str) {
        self.messages.push(Message::new(speaker.into(), content));
        self.trim();
    }

    fn trim(&mut self) {
        if self.messages.len() > self.limit {
            let excess = self.messages.len() - self.limit;
            self.messages.drain(1..1 + excess);
        }
    }

    /// Snapshot of the history; changes to it never reach the store.
    pub fn history(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.seed();
    }

    /// Number of user/assistant turns held after the system prompt.
    pub fn turns(&self) -> usize {
        self.messages.len() - 1
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
