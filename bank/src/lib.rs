//! Abstract asset-transfer interface.
//!
//! The splitter core never moves funds itself. Every fungible asset is
//! reached through [`AssetTransfer`], whatever backs it (an on-chain token
//! contract, a custody service, or the in-memory bank used in tests). The
//! rest of the workspace depends only on this trait.

pub mod error;
pub mod transfer;

pub use error::TransferError;
pub use transfer::AssetTransfer;
