//! LLM request/response types for termchat.
//!
//! These types model the data shapes exchanged with a chat-completion
//! provider: the single-turn request the prompt loop sends and the
//! first-choice text it prints.

/// Request to an LLM provider for a completion.
///
/// Requests are stateless and single-turn: one `user` message, no history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    /// Text of the single `user` message.
    pub user_message: String,
}

impl CompletionRequest {
    pub fn single_turn(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            user_message: input.into(),
        }
    }
}

/// Response from an LLM provider.
///
/// `content` is the text of the first choice. `None` means the provider
/// answered successfully but returned no choices (or a choice without text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: Option<String>,
}

/// Errors from LLM provider operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited")]
    RateLimited,

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("request timed out")]
    Timeout,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
