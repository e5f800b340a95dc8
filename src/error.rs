//! Error types for the MBP reconstruction pipeline.
//!
//! Clean error handling using `thiserror` for ergonomic error definitions.
//!
//! Note that the order book itself exposes no error type: `OrderBook::apply`
//! and the query surface are total functions over their inputs. Errors only
//! exist at the I/O boundary (reading the feed, writing snapshots).

use thiserror::Error;

/// Result type alias for reconstruction operations.
pub type Result<T> = std::result::Result<T, MbpError>;

/// Main error type for the reconstruction pipeline.
#[derive(Error, Debug)]
pub enum MbpError {
    /// Underlying I/O failure (unreadable input, unwritable output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV-level read/write failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A record that could not be converted into an [`crate::MboEvent`]
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number of the offending record, when known
        line: u64,
        /// What went wrong with the record
        reason: String,
    },

    /// Generic error with context
    #[error("Error: {0}")]
    Generic(String),
}

impl MbpError {
    /// Create a generic error from any string-like type.
    pub fn generic(msg: impl Into<String>) -> Self {
        MbpError::Generic(msg.into())
    }

    /// Create a malformed-record error.
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        MbpError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

impl From<String> for MbpError {
    fn from(err: String) -> Self {
        MbpError::Generic(err)
    }
}

impl From<&str> for MbpError {
    fn from(err: &str) -> Self {
        MbpError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MbpError::malformed(42, "expected at least 15 fields, got 3");
        assert_eq!(
            err.to_string(),
            "malformed record at line 42: expected at least 15 fields, got 3"
        );
    }

    #[test]
    fn test_generic_from_str() {
        let err: MbpError = "boom".into();
        assert_eq!(err.to_string(), "Error: boom");
    }

    #[test]
    fn test_result_type() {
        let result: Result<i32> = Err(MbpError::generic("bad"));
        assert!(result.is_err());
    }
}
