//! Nullable infrastructure for deterministic testing.
//!
//! The splitter core reaches funds and tickets only through the
//! [`AssetTransfer`](fundsplit_bank::AssetTransfer) and
//! [`TicketIssuer`](fundsplit_tickets::TicketIssuer) traits. This crate
//! provides in-memory implementations that:
//! - Return deterministic values
//! - Can be inspected and reset programmatically
//! - Never touch the filesystem or network
//!
//! Every test builds its own instances, so no state leaks between cases.

pub mod bank;
pub mod tickets;

pub use bank::NullBank;
pub use tickets::NullTicketIssuer;
