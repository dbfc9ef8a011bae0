//! Error types for the lead-intake agent.

/// Top-level error type for the agent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse settings file {path}: {reason}")]
    ParseError { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Channel {name} cannot address recipients directly")]
    DirectSendUnsupported { name: String },

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
}

/// Errors raised while handing a completed lead to its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Ledger write failed: {0}")]
    Ledger(#[source] DatabaseError),

    #[error("Calendar write failed: {0}")]
    Calendar(#[source] DatabaseError),

    #[error("Forward to unit {unit} failed: {source}")]
    Forward {
        unit: String,
        #[source]
        source: ChannelError,
    },
}
