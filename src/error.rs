//! Error types for the deltasurf library.
//!
//! Every structural failure aborts construction of the whole surface: a
//! surface with silently missing expirations is never returned. Join
//! mismatches between tickers and instruments are not errors; they are
//! recorded as surface metadata instead.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, DeltaSurfError>;

/// Errors that can occur while building a delta surface.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeltaSurfError {
    /// Builder or configuration input is invalid (bad half grid, missing or
    /// malformed timestamp, unparsable configuration).
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// An expiration has no quotes on the side a stage requires.
    #[error("no {side} quotes for expiration {expiration_timestamp}")]
    EmptySlice {
        expiration_timestamp: i64,
        /// Which quotes were required: `"put"` or `"any"`.
        side: &'static str,
    },

    /// Too few distinct observed deltas to interpolate.
    #[error("insufficient data: {message}")]
    InsufficientData {
        message: String,
        /// Offending expiration, once known.
        expiration_timestamp: Option<i64>,
    },

    /// A quote or query value is missing, non-finite or out of range.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// An output could not be serialized.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl DeltaSurfError {
    /// Attach the offending expiration to an error raised below the slice level.
    ///
    /// Only [`InsufficientData`](DeltaSurfError::InsufficientData) carries an
    /// optional expiration; other variants are returned unchanged.
    pub fn at_expiration(self, expiration_timestamp: i64) -> Self {
        match self {
            DeltaSurfError::InsufficientData {
                message,
                expiration_timestamp: None,
            } => DeltaSurfError::InsufficientData {
                message: format!("{message} (expiration {expiration_timestamp})"),
                expiration_timestamp: Some(expiration_timestamp),
            },
            other => other,
        }
    }
}
