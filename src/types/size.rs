use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Quantity of units traded, distinct from monetary Price.
/// Signed: a running position uses negative values for net-short state.
/// Fractional quantities are allowed (crypto).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Size = Size(Decimal::ZERO);

    /// Create a new Size from a Decimal
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the underlying Decimal value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Create a Size from a string
    pub fn from_str(s: &str) -> Result<Self, rust_decimal::Error> {
        let decimal = Decimal::from_str(s)?;
        Ok(Self(decimal))
    }

    /// Check if the size is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if the size is strictly positive (a long position)
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Custom serialization to preserve decimal places
impl Serialize for Size {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Size {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let decimal = Decimal::from_str(&s).map_err(serde::de::Error::custom)?;
        Ok(Size(decimal))
    }
}

impl std::ops::Add for Size {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl std::ops::Sub for Size {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl std::ops::Div<Size> for Size {
    type Output = Decimal;

    fn div(self, rhs: Size) -> Decimal {
        self.0 / rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_creation() {
        let size = Size::new(Decimal::new(105, 1)); // 10.5
        assert_eq!(size.value(), Decimal::new(105, 1));
        assert!(size.is_positive());
    }

    #[test]
    fn test_size_arithmetic() {
        let bought = Size::from_str("10").unwrap();
        let sold = Size::from_str("4.5").unwrap();

        let open = bought - sold;
        assert_eq!(open, Size::from_str("5.5").unwrap());
        assert!(!open.is_zero());
    }

    #[test]
    fn test_size_fraction() {
        let surviving = Size::from_str("5").unwrap();
        let original = Size::from_str("10").unwrap();
        assert_eq!(surviving / original, Decimal::new(5, 1)); // 0.5
    }

    #[test]
    fn test_size_serialization() {
        let size = Size::from_str("0.001").unwrap();

        let json = serde_json::to_string(&size).unwrap();
        assert_eq!(json, "\"0.001\"");

        let deserialized: Size = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, size);
    }
}
