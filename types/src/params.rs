//! Fixed parameters of the distribution arithmetic.

use crate::amount::Amount;

/// Shares are expressed in basis points; a full table sums to this.
pub const BPS_DENOMINATOR: u16 = 10_000;

/// The smallest pool that splits exactly into every basis-point share:
/// `BPS_DENOMINATOR` raw units, i.e. `0.0001`.
pub const DISTRIBUTION_QUANTUM: Amount = Amount::from_raw(BPS_DENOMINATOR as u128);

/// Default minimum initial funding for a new splitter (`0.01`).
pub const MIN_INIT_AMOUNT: Amount = Amount::from_raw(1_000_000);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantum_and_minimum_in_text_form() {
        assert_eq!(DISTRIBUTION_QUANTUM.to_string(), "0.00010000");
        assert_eq!(MIN_INIT_AMOUNT.to_string(), "0.01000000");
    }
}
