//! Error types for the draft editor
//!
//! None of these are fatal: callers turn them into warning replies.

use thiserror::Error;

/// Reasons a component custom id could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomIdError {
    /// Wrong number of `-` separated parts
    #[error("Expected 4 parts in custom id, found {0}")]
    PartCount(usize),

    /// Unknown scope prefix
    #[error("Unknown component scope: {0}")]
    UnknownScope(String),

    /// Session segment is not a valid session key
    #[error("Invalid session key: {0}")]
    InvalidSession(String),

    /// Field segment is empty
    #[error("Empty field in custom id")]
    EmptyField,

    /// Unknown kind suffix
    #[error("Unknown component kind: {0}")]
    UnknownKind(String),

    /// Field is not one this scope handles
    #[error("Unknown field `{field}` for scope {scope}")]
    UnknownField { scope: String, field: String },
}

/// Errors that can occur while driving a draft editor
#[derive(Debug, Error)]
pub enum EditorError {
    /// The draft has neither content nor a usable embed
    #[error("Can't send empty message")]
    NothingToSend,

    /// The send sink failed to deliver
    #[error("Failed to deliver message: {0}")]
    Delivery(String),

    /// Discord API error
    #[error("Discord API error: {0}")]
    DiscordApi(#[from] Box<poise::serenity_prelude::Error>),

    /// A routed interaction carried a malformed custom id
    #[error(transparent)]
    CustomId(#[from] CustomIdError),
}

impl From<poise::serenity_prelude::Error> for EditorError {
    fn from(error: poise::serenity_prelude::Error) -> Self {
        Self::DiscordApi(Box::new(error))
    }
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
