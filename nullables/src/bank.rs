//! Nullable bank: thread-safe in-memory balances for testing.

use fundsplit_bank::{AssetTransfer, TransferError};
use fundsplit_types::{Address, Amount, AssetId};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct BankState {
    balances: HashMap<(AssetId, Address), Amount>,
    receivers: HashSet<(AssetId, Address)>,
    transfers: u64,
}

/// An in-memory asset bank.
///
/// Transfers are all-or-nothing and counted, so tests can assert that a
/// no-op claim really moved nothing.
pub struct NullBank {
    state: Mutex<BankState>,
}

impl NullBank {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BankState::default()),
        }
    }

    /// Create funds out of thin air. Opens a receiver for `to` if needed.
    pub fn mint(&self, asset: &AssetId, to: &Address, amount: Amount) {
        let mut state = self.state.lock().unwrap();
        state.receivers.insert((asset.clone(), *to));
        let balance = state.balances.entry((asset.clone(), *to)).or_default();
        *balance = *balance + amount;
    }

    /// Total supply of `asset` across all accounts.
    pub fn supply(&self, asset: &AssetId) -> Amount {
        self.state
            .lock()
            .unwrap()
            .balances
            .iter()
            .filter(|((a, _), _)| a == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }

    /// Number of successful transfers so far.
    pub fn transfer_count(&self) -> u64 {
        self.state.lock().unwrap().transfers
    }

    /// Clear all state.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = BankState::default();
    }
}

impl Default for NullBank {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetTransfer for NullBank {
    fn transfer(&self, asset: &AssetId, from: &Address, to: &Address, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state.lock().unwrap();
        if !state.receivers.contains(&(asset.clone(), *to)) {
            return Err(TransferError::MissingReceiver {
                asset: asset.clone(),
                account: *to,
            });
        }
        let available = state
            .balances
            .get(&(asset.clone(), *from))
            .copied()
            .unwrap_or_default();
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| TransferError::InsufficientBalance {
                asset: asset.clone(),
                account: *from,
                needed: amount,
                available,
            })?;
        state.balances.insert((asset.clone(), *from), remaining);
        let credited = state
            .balances
            .get(&(asset.clone(), *to))
            .copied()
            .unwrap_or_default()
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow {
                asset: asset.clone(),
                account: *to,
            });
        match credited {
            Ok(credited) => {
                state.balances.insert((asset.clone(), *to), credited);
                state.transfers += 1;
                Ok(())
            }
            Err(e) => {
                state.balances.insert((asset.clone(), *from), available);
                Err(e)
            }
        }
    }

    fn balance(&self, asset: &AssetId, owner: &Address) -> Amount {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&(asset.clone(), *owner))
            .copied()
            .unwrap_or_default()
    }

    fn has_receiver(&self, asset: &AssetId, owner: &Address) -> bool {
        self.state
            .lock()
            .unwrap()
            .receivers
            .contains(&(asset.clone(), *owner))
    }

    fn open_receiver(&self, asset: &AssetId, owner: &Address) -> Result<(), TransferError> {
        self.state
            .lock()
            .unwrap()
            .receivers
            .insert((asset.clone(), *owner));
        Ok(())
    }
}
