//! Distribution ledger.
//!
//! A splitter's bookkeeping lives here, free of any transfer or ticket
//! concerns:
//! - [`ShareTable`]: the immutable serial → basis-point configuration
//! - [`AssetLedger`]: per-serial allocations plus the unallocated remainder
//!   for one asset, with the quantized deposit split
//! - [`DistributionLedger`]: one share table bound to one asset ledger per
//!   configured receiver path

pub mod asset_ledger;
pub mod distribution;
pub mod error;
pub mod share_table;

pub use asset_ledger::{AssetLedger, DepositOutcome};
pub use distribution::DistributionLedger;
pub use error::{LedgerError, ShareError};
pub use share_table::{parse_share, validate_shares, ShareEntry, ShareTable};
