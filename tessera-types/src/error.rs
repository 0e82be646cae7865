use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Frequency;

/// Unified error type for the tessera workspace.
///
/// This covers structural frame mismatches, ingestion policy violations
/// (frequency pinning, create-vs-merge conflicts), missing-series lookups,
/// metadata typing problems, and state restore failures.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TesseraError {
    /// The input frame's index/column structure does not match any supported shape.
    #[error("frame structure mismatch: {0}")]
    Frame(String),

    /// A wide frame with flat columns was supplied without the mandatory symbol.
    #[error("symbol is required for single-level columns; multi-level input carries its own symbols")]
    MissingSymbol,

    /// A series frequency conflicts with the frequency pinned under strict alignment.
    #[error("frequency mismatch: {got} != {expected} (strict alignment; use ffill or none for mixed frequencies)")]
    FrequencyMismatch {
        /// The frequency pinned by the first ingested series.
        expected: Frequency,
        /// The offending frequency of the incoming series.
        got: Frequency,
    },

    /// Strict-create ingestion hit a key that is already stored.
    #[error("series ({symbol}, {name}) already exists; use upsert to merge")]
    AlreadyExists {
        /// Symbol half of the conflicting key.
        symbol: String,
        /// Series-name half of the conflicting key.
        name: String,
    },

    /// A series or resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "series (AAPL, close)".
        what: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A metadata value could not be converted into its typed field.
    #[error("invalid metadata for '{field}': {msg}")]
    Metadata {
        /// The metadata key that failed conversion.
        field: String,
        /// Human-readable description of the typing problem.
        msg: String,
    },

    /// A serialized collection state could not be restored.
    #[error("state restore failed: {0}")]
    State(String),
}

impl TesseraError {
    /// Helper: build a `NotFound` error for a `(symbol, name)` series key.
    pub fn series_not_found(symbol: impl AsRef<str>, name: impl AsRef<str>) -> Self {
        Self::NotFound {
            what: format!("series ({}, {})", symbol.as_ref(), name.as_ref()),
        }
    }

    /// Helper: build a `Frame` error from any displayable message.
    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = TesseraError::series_not_found("AAPL", "close");
        assert_eq!(err.to_string(), "not found: series (AAPL, close)");

        let err = TesseraError::AlreadyExists {
            symbol: "MSFT".into(),
            name: "volume".into(),
        };
        assert!(err.to_string().contains("(MSFT, volume)"));
    }

    #[test]
    fn frequency_mismatch_mentions_both_sides() {
        let err = TesseraError::FrequencyMismatch {
            expected: Frequency::Daily,
            got: Frequency::Hourly,
        };
        let msg = err.to_string();
        assert!(msg.contains("1h"));
        assert!(msg.contains("1d"));
    }
}
