//! Per-asset allocations with quantized proportional splitting.
//!
//! A deposit never lands directly on a serial. It is merged with the
//! unallocated remainder into a pool, the largest multiple of
//! [`DISTRIBUTION_QUANTUM`] in that pool is split exactly by basis points,
//! and the sub-quantum rest waits for the next deposit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LedgerError;
use crate::share_table::ShareTable;
use fundsplit_types::{Amount, Serial, DISTRIBUTION_QUANTUM};

/// What a single deposit did to the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositOutcome {
    /// Previous remainder plus the deposit.
    pub pool: Amount,
    /// The quantized part of the pool that was allocated to serials.
    pub distributed: Amount,
    /// The new unallocated remainder.
    pub unallocated: Amount,
}

/// Balances for one asset of one splitter.
///
/// Conservation: `sum(allocated) + unallocated + total_claimed == total_deposited`
/// after every operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLedger {
    allocated: BTreeMap<Serial, Amount>,
    unallocated: Amount,
    total_deposited: Amount,
    total_claimed: Amount,
}

impl AssetLedger {
    /// Empty ledger with a zero allocation for every serial in `shares`.
    pub fn new(shares: &ShareTable) -> Self {
        Self {
            allocated: shares.serials().map(|s| (s, Amount::ZERO)).collect(),
            unallocated: Amount::ZERO,
            total_deposited: Amount::ZERO,
            total_claimed: Amount::ZERO,
        }
    }

    /// Distribute `amount` across the serials of `shares`.
    ///
    /// All-or-nothing: on error the ledger is unchanged.
    pub fn deposit(&mut self, shares: &ShareTable, amount: Amount) -> Result<DepositOutcome, LedgerError> {
        let pool = self
            .unallocated
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let quantum = DISTRIBUTION_QUANTUM.raw();
        let distributed = Amount::from_raw(pool.raw() / quantum * quantum);
        let remainder = pool.saturating_sub(distributed);

        let mut allocated = self.allocated.clone();
        for (serial, portion) in shares.split(distributed)? {
            let slot = allocated
                .get_mut(&serial)
                .ok_or(LedgerError::UnknownSerial(serial))?;
            *slot = slot.checked_add(portion).ok_or(LedgerError::Overflow)?;
        }
        let total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.allocated = allocated;
        self.unallocated = remainder;
        self.total_deposited = total_deposited;

        Ok(DepositOutcome {
            pool,
            distributed,
            unallocated: remainder,
        })
    }

    /// Read and zero the allocation of `serial`. Zero balances are returned as-is.
    pub fn take(&mut self, serial: Serial) -> Result<Amount, LedgerError> {
        let slot = self
            .allocated
            .get_mut(&serial)
            .ok_or(LedgerError::UnknownSerial(serial))?;
        let amount = *slot;
        let total_claimed = self
            .total_claimed
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        *slot = Amount::ZERO;
        self.total_claimed = total_claimed;
        Ok(amount)
    }

    /// Give back an allocation previously returned by [`take`](Self::take).
    pub fn restore(&mut self, serial: Serial, amount: Amount) -> Result<(), LedgerError> {
        let total_claimed = self
            .total_claimed
            .checked_sub(amount)
            .ok_or(LedgerError::RestoreExceedsClaimed {
                amount,
                claimed: self.total_claimed,
            })?;
        let slot = self
            .allocated
            .get_mut(&serial)
            .ok_or(LedgerError::UnknownSerial(serial))?;
        *slot = slot.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.total_claimed = total_claimed;
        Ok(())
    }

    pub fn allocated(&self, serial: Serial) -> Option<Amount> {
        self.allocated.get(&serial).copied()
    }

    pub fn allocations(&self) -> &BTreeMap<Serial, Amount> {
        &self.allocated
    }

    pub fn unallocated(&self) -> Amount {
        self.unallocated
    }

    /// Sum of every serial's allocation, `None` if it does not fit.
    pub fn total_allocated(&self) -> Option<Amount> {
        Amount::checked_sum(self.allocated.values().copied())
    }

    /// Everything this ledger still holds: allocations plus the remainder.
    pub fn held(&self) -> Option<Amount> {
        self.total_allocated()?.checked_add(self.unallocated)
    }

    pub fn total_deposited(&self) -> Amount {
        self.total_deposited
    }

    pub fn total_claimed(&self) -> Amount {
        self.total_claimed
    }

    /// Check the conservation law against the cumulative counters.
    pub fn is_conserved(&self) -> bool {
        self.held()
            .and_then(|held| held.checked_add(self.total_claimed))
            == Some(self.total_deposited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn sub_quantum_deposit_is_carried_forward() {
        let shares = ShareTable::from_shares(&[9999, 1]).unwrap();
        let mut ledger = AssetLedger::new(&shares);

        let outcome = ledger.deposit(&shares, amt("0.00005000")).unwrap();
        assert_eq!(outcome.distributed, Amount::ZERO);
        assert_eq!(ledger.allocated(Serial(0)), Some(Amount::ZERO));
        assert_eq!(ledger.allocated(Serial(1)), Some(Amount::ZERO));
        assert_eq!(ledger.unallocated(), amt("0.00005000"));

        let outcome = ledger.deposit(&shares, amt("0.00019000")).unwrap();
        assert_eq!(outcome.pool, amt("0.00024000"));
        assert_eq!(outcome.distributed, amt("0.00020000"));
        assert_eq!(ledger.allocated(Serial(0)), Some(amt("0.00019998")));
        assert_eq!(ledger.allocated(Serial(1)), Some(amt("0.00000002")));
        assert_eq!(ledger.unallocated(), amt("0.00004000"));
        assert!(ledger.is_conserved());
    }

    #[test]
    fn whole_deposit_splits_by_basis_points() {
        let shares = ShareTable::from_shares(&[3000, 2000, 1000, 1000, 2050, 950]).unwrap();
        let mut ledger = AssetLedger::new(&shares);
        ledger.deposit(&shares, amt("100.0")).unwrap();
        assert_eq!(ledger.allocated(Serial(0)), Some(amt("30")));
        assert_eq!(ledger.allocated(Serial(4)), Some(amt("20.5")));
        assert_eq!(ledger.allocated(Serial(5)), Some(amt("9.5")));
        assert_eq!(ledger.unallocated(), Amount::ZERO);
    }

    #[test]
    fn take_zeroes_and_second_take_yields_zero() {
        let shares = ShareTable::from_shares(&[5000, 5000]).unwrap();
        let mut ledger = AssetLedger::new(&shares);
        ledger.deposit(&shares, amt("1")).unwrap();
        assert_eq!(ledger.take(Serial(0)).unwrap(), amt("0.5"));
        assert_eq!(ledger.take(Serial(0)).unwrap(), Amount::ZERO);
        assert_eq!(ledger.allocated(Serial(1)), Some(amt("0.5")));
        assert_eq!(ledger.total_claimed(), amt("0.5"));
        assert!(ledger.is_conserved());
    }

    #[test]
    fn restore_undoes_a_take() {
        let shares = ShareTable::from_shares(&[5000, 5000]).unwrap();
        let mut ledger = AssetLedger::new(&shares);
        ledger.deposit(&shares, amt("1")).unwrap();
        let before = ledger.clone();

        let taken = ledger.take(Serial(1)).unwrap();
        ledger.restore(Serial(1), taken).unwrap();
        assert_eq!(ledger, before);
        assert!(ledger.is_conserved());
    }

    #[test]
    fn restore_cannot_exceed_what_was_claimed() {
        let shares = ShareTable::from_shares(&[5000, 5000]).unwrap();
        let mut ledger = AssetLedger::new(&shares);
        ledger.deposit(&shares, amt("1")).unwrap();
        ledger.take(Serial(0)).unwrap();
        let before = ledger.clone();

        assert_eq!(
            ledger.restore(Serial(0), amt("0.6")),
            Err(LedgerError::RestoreExceedsClaimed {
                amount: amt("0.6"),
                claimed: amt("0.5"),
            })
        );
        assert_eq!(ledger.restore(Serial(7), amt("0.1")), Err(LedgerError::UnknownSerial(Serial(7))));
        assert_eq!(ledger, before);
    }

    #[test]
    fn held_is_checked() {
        let shares = ShareTable::from_shares(&[5000, 5000]).unwrap();
        let mut ledger = AssetLedger::new(&shares);
        ledger.deposit(&shares, amt("1.00005")).unwrap();
        assert_eq!(ledger.held(), Some(amt("1.00005")));
        assert_eq!(ledger.total_allocated(), Some(amt("1")));
    }

    #[test]
    fn take_unknown_serial_fails() {
        let shares = ShareTable::from_shares(&[10000]).unwrap();
        let mut ledger = AssetLedger::new(&shares);
        assert_eq!(ledger.take(Serial(3)), Err(LedgerError::UnknownSerial(Serial(3))));
    }

    #[test]
    fn overflowing_deposit_leaves_ledger_untouched() {
        let shares = ShareTable::from_shares(&[10000]).unwrap();
        let mut ledger = AssetLedger::new(&shares);
        ledger.deposit(&shares, amt("0.00000001")).unwrap();
        let before = ledger.clone();
        assert_eq!(
            ledger.deposit(&shares, Amount::from_raw(u128::MAX)),
            Err(LedgerError::Overflow)
        );
        assert_eq!(ledger, before);
    }
}
