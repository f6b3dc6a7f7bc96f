//! # Trust Thresholds and Verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of voting power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustThreshold {
    /// Numerator.
    pub numerator: u64,
    /// Denominator.
    pub denominator: u64,
}

impl TrustThreshold {
    /// Default skipping trust level.
    pub const ONE_THIRD: Self = Self {
        numerator: 1,
        denominator: 3,
    };

    /// Commit quorum.
    pub const TWO_THIRDS: Self = Self {
        numerator: 2,
        denominator: 3,
    };

    /// Create a threshold; must lie within [1/3, 1].
    pub fn new(numerator: u64, denominator: u64) -> Option<Self> {
        let t = Self {
            numerator,
            denominator,
        };
        t.is_valid().then_some(t)
    }

    /// Whether the threshold lies within [1/3, 1].
    pub fn is_valid(&self) -> bool {
        self.denominator > 0
            && self.numerator <= self.denominator
            && u128::from(self.numerator) * 3 >= u128::from(self.denominator)
    }

    /// `tallied / total >= threshold`.
    pub fn is_met(&self, tallied: u64, total: u64) -> bool {
        total > 0
            && u128::from(tallied) * u128::from(self.denominator)
                >= u128::from(total) * u128::from(self.numerator)
    }

    /// `tallied / total > threshold`.
    pub fn is_exceeded(&self, tallied: u64, total: u64) -> bool {
        total > 0
            && u128::from(tallied) * u128::from(self.denominator)
                > u128::from(total) * u128::from(self.numerator)
    }
}

impl Default for TrustThreshold {
    fn default() -> Self {
        Self::ONE_THIRD
    }
}

impl fmt::Display for TrustThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Outcome of verifying one untrusted block from one trusted block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The untrusted block is now trusted.
    Success,
    /// Too little of the trusted set signed; bisect.
    NotEnoughTrust {
        /// Power of trusted validators that signed
        tallied: u64,
        /// Total trusted power
        total: u64,
    },
    /// Verification failed. Never retried.
    Invalid(String),
}
