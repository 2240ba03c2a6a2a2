//! Splitter accounts.
//!
//! A splitter receives fungible assets and divides every deposit among a
//! fixed set of share slots (serials). Each serial is withdrawn by whoever
//! holds the matching claim ticket. This crate ties together:
//! - [`creation`]: decoding and validating creation requests
//! - [`SplitterAccount`]: the account aggregate and its ledger lock
//! - [`SplitterRegistry`]: creation, deposits, ticket transfers and queries
//! - [`ClaimProcessor`]: ticket-authorized, all-or-nothing payouts
//! - [`CompositionGraph`]: keeps splitter-holds-splitter chains acyclic
//! - [`EventBus`] and [`SplitterConfig`]: the ambient plumbing

pub mod account;
pub mod claim;
pub mod composition;
pub mod config;
pub mod creation;
pub mod error;
pub mod events;
pub mod query;
pub mod registry;

pub use account::SplitterAccount;
pub use claim::{ClaimProcessor, ClaimReceipt, Payout};
pub use composition::CompositionGraph;
pub use config::{InitialFunding, SplitterConfig};
pub use creation::{validate, CreateSplitterRequest, CreationPlan};
pub use error::{SplitterError, ValidationError};
pub use events::{EventBus, Listener, SplitterEvent};
pub use registry::{
    SplitterRegistry, CLAIMS, CLAIMS_REJECTED, DEPOSITS, SPLITTERS_CREATED, SPLITTER_ADDRESS_BASE,
    TICKETS_TRANSFERRED,
};
