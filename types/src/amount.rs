//! Fixed-point asset amounts.
//!
//! Amounts are represented as fixed-point integers (u128) with eight
//! fractional decimal digits to avoid floating-point errors. The smallest
//! unit is 1 raw = 0.00000001.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::DecodeError;

/// Number of fractional decimal digits carried by every amount.
pub const DECIMALS: u32 = 8;

/// Raw units in one whole asset unit.
pub const RAW_PER_UNIT: u128 = 100_000_000;

/// An asset amount with eight fractional decimal digits.
///
/// Serialized as its decimal text form (`"30.00000000"`) so configuration
/// and scenario files stay human readable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole units, e.g. `Amount::from_units(100)` is `100.00000000`.
    pub const fn from_units(units: u64) -> Self {
        Self(units as u128 * RAW_PER_UNIT)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Sum of `amounts`, or `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, a| acc.checked_add(a))
    }
}

// The operators below follow `u128` and overflow the same way. Ledger and
// claim code uses the checked forms.

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, a| acc + a)
    }
}

impl FromStr for Amount {
    type Err = DecodeError;

    /// Parse `<digits>[.<digits>]` with at most eight fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DecodeError::MalformedAmount(s.to_string());
        let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (s, None),
        };
        if !is_digits(whole) {
            return Err(malformed());
        }

        let whole_raw = whole
            .parse::<u128>()
            .ok()
            .and_then(|w| w.checked_mul(RAW_PER_UNIT))
            .ok_or_else(malformed)?;

        let frac_raw = match frac {
            None => 0,
            Some(frac) => {
                if !is_digits(frac) || frac.len() > DECIMALS as usize {
                    return Err(malformed());
                }
                let digits = frac.parse::<u128>().map_err(|_| malformed())?;
                digits * 10u128.pow(DECIMALS - frac.len() as u32)
            }
        };

        whole_raw
            .checked_add(frac_raw)
            .map(Self)
            .ok_or_else(malformed)
    }
}

impl TryFrom<String> for Amount {
    type Error = DecodeError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08}", self.0 / RAW_PER_UNIT, self.0 % RAW_PER_UNIT)
    }
}
