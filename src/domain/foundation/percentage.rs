//! Percentage value object (0-100 scale).

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A value between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100);

    /// Creates a new Percentage, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a Percentage, returning error if out of range.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::out_of_range(
                "percentage",
                0,
                100,
                i64::from(value),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Applies this percentage to an amount in minor units, rounding half-up.
    ///
    /// Negative amounts yield zero.
    pub fn of_minor_units(&self, amount: i64) -> i64 {
        if amount <= 0 {
            return 0;
        }
        let scaled = i128::from(amount) * i128::from(self.0) + 50;
        (scaled / 100) as i64
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_new_accepts_valid_values() {
        assert_eq!(Percentage::new(0).value(), 0);
        assert_eq!(Percentage::new(50).value(), 50);
        assert_eq!(Percentage::new(100).value(), 100);
    }

    #[test]
    fn percentage_new_clamps_to_100() {
        assert_eq!(Percentage::new(101).value(), 100);
        assert_eq!(Percentage::new(255).value(), 100);
    }

    #[test]
    fn percentage_try_new_accepts_valid_values() {
        assert!(Percentage::try_new(0).is_ok());
        assert!(Percentage::try_new(50).is_ok());
        assert!(Percentage::try_new(100).is_ok());
    }

    #[test]
    fn percentage_try_new_rejects_over_100() {
        let result = Percentage::try_new(101);
        assert!(result.is_err());
        match result {
            Err(ValidationError::OutOfRange { field, min, max, actual }) => {
                assert_eq!(field, "percentage");
                assert_eq!(min, 0);
                assert_eq!(max, 100);
                assert_eq!(actual, 101);
            }
            _ => panic!("Expected OutOfRange error"),
        }
    }

    #[test]
    fn of_minor_units_rounds_half_up() {
        assert_eq!(Percentage::new(50).of_minor_units(1000), 500);
        assert_eq!(Percentage::new(50).of_minor_units(1001), 501);
        assert_eq!(Percentage::new(33).of_minor_units(1000), 330);
        assert_eq!(Percentage::new(15).of_minor_units(10), 2);
        assert_eq!(Percentage::new(14).of_minor_units(10), 1);
    }

    #[test]
    fn of_minor_units_bounds() {
        assert_eq!(Percentage::ZERO.of_minor_units(12_345), 0);
        assert_eq!(Percentage::HUNDRED.of_minor_units(12_345), 12_345);
        assert_eq!(Percentage::HUNDRED.of_minor_units(-5), 0);
    }

    #[test]
    fn percentage_default_is_zero() {
        assert_eq!(Percentage::default(), Percentage::ZERO);
    }

    #[test]
    fn percentage_serializes_to_json() {
        let pct = Percentage::new(42);
        let json = serde_json::to_string(&pct).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn percentage_deserializes_from_json() {
        let pct: Percentage = serde_json::from_str("75").unwrap();
        assert_eq!(pct.value(), 75);
    }

    #[test]
    fn percentage_ordering_works() {
        let p1 = Percentage::new(25);
        let p2 = Percentage::new(75);
        assert!(p1 < p2);
        assert!(p2 > p1);
    }
}
