use fundsplit_types::{Address, Amount, AssetId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient {asset} balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        asset: AssetId,
        account: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("{account} has no receiver for {asset}")]
    MissingReceiver { asset: AssetId, account: Address },

    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),

    #[error("balance overflow for {asset} in {account}")]
    Overflow { asset: AssetId, account: Address },

    #[error("transfer backend error: {0}")]
    Backend(String),
}
