//! Error types for the bank bot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Recognizer error: {0}")]
    Recognizer(#[from] RecognizerError),

    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read env file {path}: {message}")]
    EnvFile { path: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Channel-related errors (webhook server, CLI).
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Invalid activity: {0}")]
    InvalidActivity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Intent recognition errors.
#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("Recognizer {recognizer} request failed: {reason}")]
    RequestFailed { recognizer: String, reason: String },

    #[error("Invalid response from {recognizer}: {reason}")]
    InvalidResponse { recognizer: String, reason: String },

    #[error("Invalid model URL: {0}")]
    InvalidModelUrl(String),
}

/// Conversation state machine errors.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Conversation {conversation_id} exceeded {limit} steps in a single turn")]
    StepLimitExceeded {
        conversation_id: String,
        limit: usize,
    },

    #[error("Corrupt dialog state for conversation {conversation_id}: {reason}")]
    CorruptState {
        conversation_id: String,
        reason: String,
    },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
