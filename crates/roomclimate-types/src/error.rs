//! Error types for the room climate engine.

use thiserror::Error;
use time::OffsetDateTime;

/// Errors raised by the room climate engine.
///
/// None of these come from external I/O. Every variant signals a bug in the
/// caller or a corrupted store, so none of them should be retried.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A room id outside `1..=ROOM_COUNT` was requested.
    #[error("Unknown room: {0} (valid ids are 1..={max})", max = crate::ROOM_COUNT)]
    UnknownRoom(u8),

    /// A history had no entries when its newest reading was requested.
    #[error("History is empty")]
    EmptyHistory,

    /// An append would break the strictly increasing timestamp order.
    #[error("Invariant violation: reading at {attempted} is not after the newest entry at {last}")]
    InvariantViolation {
        /// Timestamp of the current newest entry.
        last: OffsetDateTime,
        /// Timestamp of the rejected reading.
        attempted: OffsetDateTime,
    },

    /// A threshold configuration contained a non-finite value.
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),
}

impl Error {
    /// Whether this error indicates a programming mistake rather than a
    /// runtime condition.
    ///
    /// Every engine error is a programmer error today; the method exists so
    /// hosts can route errors without matching on variants.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownRoom(_)
                | Error::EmptyHistory
                | Error::InvariantViolation { .. }
                | Error::InvalidThresholds(_)
        )
    }
}

/// Result type alias using the engine's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
