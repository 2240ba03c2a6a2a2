use fundsplit_types::{Amount, ReceiverPath, Serial};
use thiserror::Error;

/// Why a set of basis-point shares was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("no shares given")]
    Empty,

    #[error("share #{index} is zero")]
    ZeroShare { index: usize },

    #[error("shares sum to {total} bps, expected 10000")]
    InvalidTotal { total: u64 },

    #[error("serial {0} appears twice")]
    DuplicateSerial(Serial),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid shares: {0}")]
    Shares(#[from] ShareError),

    #[error("serial {0} has no allocation in this ledger")]
    UnknownSerial(Serial),

    #[error("no ledger for receiver path {0}")]
    UnknownAsset(ReceiverPath),

    #[error("receiver path {0} configured twice")]
    DuplicateAsset(ReceiverPath),

    #[error("amount overflow while updating the ledger")]
    Overflow,

    #[error("cannot restore {amount}: only {claimed} has been claimed")]
    RestoreExceedsClaimed { amount: Amount, claimed: Amount },
}
