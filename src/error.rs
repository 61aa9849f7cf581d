use std::fmt;

use uuid::Uuid;

/// Errors surfaced by the journal.
///
/// Validation and storage failures propagate to the immediate caller.
/// Computation edge cases (empty input, zero positions, degenerate
/// ratios) are absorbed by the engine and never appear here.
#[derive(Debug)]
pub enum JournalError {
    /// A trade failed a required-field or non-negativity constraint.
    /// Names the offending field so the caller can report it.
    Validation {
        field: &'static str,
        message: String,
    },
    /// Underlying persistence failure; the ledger is left unmodified.
    Storage(Box<dyn std::error::Error + Send + Sync>),
    /// No trade with the given id exists in the ledger.
    TradeNotFound(Uuid),
}

impl JournalError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field, message } => {
                write!(f, "invalid trade field '{}': {}", field, message)
            }
            Self::Storage(source) => write!(f, "ledger storage failure: {}", source),
            Self::TradeNotFound(id) => write!(f, "no trade with id {}", id),
        }
    }
}

impl std::error::Error for JournalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for JournalError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(Box::new(error))
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(error: serde_json::Error) -> Self {
        Self::Storage(Box::new(error))
    }
}
