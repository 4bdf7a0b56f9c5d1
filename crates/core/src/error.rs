//! Error types for ezvote-participation.

use thiserror::Error;

use crate::EventId;

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Participation count outside the allowed range.
    #[error("participation count {count} not within [{min}, {max}]")]
    ParticipationCount { count: usize, min: usize, max: usize },

    /// More participations than the one-byte count prefix can express.
    #[error("{0} participations cannot be encoded behind a one-byte count")]
    TooManyParticipations(usize),

    /// Two participations in one collection target the same event.
    #[error("multiple participations for the same event: {0}")]
    MultipleEventParticipation(EventId),

    /// A record failed record-level validation.
    #[error("invalid participation: {0}")]
    InvalidParticipation(String),

    /// Input ended in the middle of a record.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// Event not known to the event store.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Event definition the tally cannot process.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Balance lookup failed.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Writing into the checksum accumulator failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON array element failed to parse.
    #[error("pos {pos}: {source}")]
    JsonElement {
        pos: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed event identifier text.
    #[error("invalid event id: {0}")]
    InvalidEventId(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
