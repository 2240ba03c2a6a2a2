//! Asset-transfer trait.

use crate::TransferError;
use fundsplit_types::{Address, Amount, AssetId};

/// Moves fungible assets between accounts.
///
/// Implementations must be all-or-nothing per call: a transfer either
/// completes or fails leaving every balance untouched.
pub trait AssetTransfer: Send + Sync {
    /// Move `amount` of `asset` from `from` to `to`.
    ///
    /// Fails with [`TransferError::InsufficientBalance`] when `from` cannot
    /// cover the amount and [`TransferError::MissingReceiver`] when `to` has
    /// no receiver for the asset.
    fn transfer(&self, asset: &AssetId, from: &Address, to: &Address, amount: Amount) -> Result<(), TransferError>;

    /// Current balance of `owner` in `asset` (zero when unknown).
    fn balance(&self, asset: &AssetId, owner: &Address) -> Amount;

    /// Whether `owner` can receive `asset`.
    fn has_receiver(&self, asset: &AssetId, owner: &Address) -> bool;

    /// Make `owner` able to receive `asset`. Idempotent.
    fn open_receiver(&self, asset: &AssetId, owner: &Address) -> Result<(), TransferError>;
}
