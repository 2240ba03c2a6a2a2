//! Claim tickets: transferable capabilities authorizing withdrawal.
//!
//! A ticket carries:
//! - `event_id`: the issuing event, which binds it to exactly one splitter
//! - `serial`: which share slot of that splitter it withdraws
//! - `owner`: who may present it right now
//!
//! Minting and transfer are provided by an external [`TicketIssuer`]; the
//! [`TicketRegistry`] owns the verification performed on every claim.

pub mod error;
pub mod issuer;
pub mod registry;
pub mod ticket;

pub use error::{AuthorizationError, TicketError};
pub use issuer::TicketIssuer;
pub use registry::TicketRegistry;
pub use ticket::{ClaimTicket, EventMetadata, TicketEvent};
