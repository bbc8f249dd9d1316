//! Compile-time unit safety for voltage quantities.
//!
//! Nominal voltages are carried as [`Kilovolts`] rather than raw `f64` so a
//! filter threshold can never be compared against a per-unit magnitude by
//! accident.
//!
//! # Usage
//!
//! ```
//! use gat_core::units::Kilovolts;
//!
//! let hv = Kilovolts(400.0);
//! assert!(hv > Kilovolts(225.0));
//! assert_eq!(hv.value(), 400.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Voltage magnitude in kilovolts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl Kilovolts {
    /// Create a new value
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw numeric value
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Check if value is finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Kilovolts {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Kilovolts {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl std::fmt::Display for Kilovolts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} kV", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_and_arithmetic() {
        assert!(Kilovolts(220.0) < Kilovolts(225.0));
        assert_eq!(Kilovolts(400.0) - Kilovolts(175.0), Kilovolts(225.0));
        assert_eq!(Kilovolts(200.0) + Kilovolts(25.0), Kilovolts(225.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Kilovolts(225.0)), "225.0 kV");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Kilovolts(63.0)).unwrap();
        assert_eq!(json, "63.0");
        let back: Kilovolts = serde_json::from_str("90").unwrap();
        assert_eq!(back, Kilovolts(90.0));
    }
}
