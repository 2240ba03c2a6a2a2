//! Ticket-issuance collaborator.

use crate::error::TicketError;
use crate::ticket::{ClaimTicket, EventMetadata, TicketEvent};
use fundsplit_types::{Address, EventId, TicketId};

/// Mints and moves claim tickets.
///
/// Serials are assigned per event in mint order starting at 0.
pub trait TicketIssuer: Send + Sync {
    /// Open a new event hosted by `host` and return its fresh id.
    fn create_event(&self, host: &Address, metadata: EventMetadata) -> Result<EventId, TicketError>;

    fn event(&self, id: EventId) -> Option<TicketEvent>;

    /// Mint the next serial of `event_id` to `recipient`. Only the host may mint.
    fn mint(&self, host: &Address, event_id: EventId, recipient: &Address) -> Result<ClaimTicket, TicketError>;

    fn ticket(&self, id: TicketId) -> Option<ClaimTicket>;

    /// Every ticket currently held by `owner`, across all events.
    fn tickets_owned_by(&self, owner: &Address) -> Vec<ClaimTicket>;

    /// Move ticket `id` from `from` to `to`, returning the updated ticket.
    fn transfer(&self, id: TicketId, from: &Address, to: &Address) -> Result<ClaimTicket, TicketError>;
}
