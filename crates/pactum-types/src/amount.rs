//! Amount type for the settlement currency
//!
//! Pactum tracks a single settlement currency. Amounts use fixed-point
//! arithmetic over i128 atomic units to keep escrow bookkeeping exact;
//! floating point appears only at the human-readable boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places carried by the settlement currency
pub const SETTLEMENT_DECIMALS: u8 = 12;

/// Multiplier between human units and atomic units
pub const ATOMIC_MULTIPLIER: i128 = 1_000_000_000_000;

/// Fixed-point amount in atomic units of the settlement currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(pub i128);

impl Amount {
    /// Create an amount from raw atomic units
    pub fn from_atomic(value: i128) -> Self {
        Self(value)
    }

    /// Create an amount from a human-readable value (e.g., 10.5)
    pub fn from_human(human_value: f64) -> Self {
        Self((human_value * ATOMIC_MULTIPLIER as f64) as i128)
    }

    /// Create a zero amount
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the human-readable value
    pub fn to_human(&self) -> f64 {
        self.0 as f64 / ATOMIC_MULTIPLIER as f64
    }

    /// Get the raw atomic units
    pub fn atomic(&self) -> i128 {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Take a percentage (0-100) of the amount, rounding toward zero
    pub fn percentage(self, percent: u8) -> Option<Self> {
        self.0
            .checked_mul(percent as i128)
            .map(|v| Self(v / 100))
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_human())
    }
}
