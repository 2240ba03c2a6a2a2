use thiserror::Error;

use fundsplit_bank::TransferError;
use fundsplit_ledger::{LedgerError, ShareError};
use fundsplit_tickets::{AuthorizationError, TicketError};
use fundsplit_types::{Address, Amount, AssetId, DecodeError, ReceiverPath};

/// Business-rule failures of a creation request.
///
/// Always raised before any funds move or tickets are minted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Recipients should not be empty")]
    EmptyRecipients,

    #[error("Tokens should not be empty")]
    EmptyAssets,

    #[error("Invalid tokens: got {addresses} addresses, {names} names and {paths} receiver paths")]
    InvalidTokens {
        addresses: usize,
        names: usize,
        paths: usize,
    },

    #[error("Invalid tokens: {0} is configured twice")]
    DuplicateAsset(String),

    #[error("Invalid shares: {0}")]
    InvalidShares(#[from] ShareError),

    #[error("Init amount should be greater than {minimum}, got {amount}")]
    InitAmountTooSmall { amount: Amount, minimum: Amount },
}

#[derive(Debug, Error)]
pub enum SplitterError {
    #[error("decoding argument failed: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("ticket error: {0}")]
    Ticket(#[from] TicketError),

    #[error("splitter {0} not found")]
    SplitterNotFound(Address),

    #[error("asset with receiver path {0} is not configured on this splitter")]
    UnknownAsset(ReceiverPath),

    #[error("{account} has no receiver for {asset}")]
    MissingReceiver { asset: AssetId, account: Address },

    #[error("splitter {0} cannot pay into a deposit; its funds leave only through claims")]
    SplitterAsPayer(Address),

    #[error("composition cycle: {holder} already passes funds to {origin}")]
    CompositionCycle { origin: Address, holder: Address },

    #[error("state lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("config error: {0}")]
    Config(String),
}
