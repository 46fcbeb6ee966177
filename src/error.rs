//! Error types for mailfiler.

/// Top-level error type for the filing pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wiring error: {0}")]
    Wiring(#[from] WiringError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid timezone offset: {value:?} (expected e.g. \"+02:00\")")]
    InvalidTimezone { value: String },
}

/// A processor was constructed against an incomplete processing context.
///
/// Always a defect in the outer driver — fatal, never retried.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WiringError {
    #[error("Processing context has no thread context set")]
    MissingThreadContext,

    #[error("Processing context has no message context set")]
    MissingMessageContext,
}

/// A computed index is out of bounds against the parent sequence.
///
/// Aborts the single item; the rest of the batch continues.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("Message index {index} out of bounds for thread {thread_id} ({len} messages)")]
    MessageOutOfBounds {
        thread_id: String,
        index: usize,
        len: usize,
    },

    #[error("Attachment index {index} out of bounds for message {message_id} ({len} attachments)")]
    AttachmentOutOfBounds {
        message_id: String,
        index: usize,
        len: usize,
    },
}

/// A template referenced a substitution key the map does not hold.
///
/// Carries the offending key and the full pattern so the failing template
/// can be located without re-running with verbose tracing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("Unknown substitution key {key:?} in pattern {pattern:?}")]
    UnknownKey { key: String, pattern: String },
}

/// The external action dispatcher reported a failure.
///
/// Per-item; the pipeline records it but does not retry.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Write to {location} failed: {reason}")]
    WriteFailed { location: String, reason: String },

    #[error("Target {location} already exists")]
    Conflict { location: String },
}

/// The mail store failed to answer a search.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Search {query:?} failed: {reason}")]
    SearchFailed { query: String, reason: String },
}

/// Result type alias for the pipeline.
pub type Result<T> = std::result::Result<T, Error>;
