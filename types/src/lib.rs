//! Fundamental types for the fundsplit ledger.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, fixed-point amounts, asset descriptors, ticket
//! identifiers and the fixed parameters of the distribution arithmetic.

pub mod address;
pub mod amount;
pub mod asset;
pub mod error;
pub mod ids;
pub mod params;

pub use address::Address;
pub use amount::{Amount, DECIMALS, RAW_PER_UNIT};
pub use asset::{AssetDescriptor, AssetId, ReceiverPath};
pub use error::DecodeError;
pub use ids::{EventId, Serial, TicketId};
pub use params::{BPS_DENOMINATOR, DISTRIBUTION_QUANTUM, MIN_INIT_AMOUNT};
