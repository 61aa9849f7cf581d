use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument symbol (e.g. "AAPL", "0700.HK", "BTC-USD").
/// Uses NewType pattern for type safety; uppercase-normalized at
/// construction so lookups never depend on user casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol, normalizing to uppercase
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Get the underlying string value
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Get the underlying string as &str (alias for value())
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if symbol is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Default settlement currency derived from the symbol suffix.
    /// Hong Kong listings ("0700.HK") settle in HKD, everything else
    /// defaults to USD.
    pub fn default_currency(&self) -> &'static str {
        if self.0.ends_with(".HK") {
            "HKD"
        } else {
            "USD"
        }
    }

    /// Market venue derived from the symbol suffix
    pub fn market(&self) -> &'static str {
        if self.0.ends_with(".HK") {
            "HK"
        } else {
            "US"
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}
