use fundsplit_types::{Address, EventId, Serial, TicketId};
use thiserror::Error;

/// Failures of the ticket-issuance collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    #[error("event {0} not found")]
    EventNotFound(EventId),

    #[error("ticket {0} not found")]
    TicketNotFound(TicketId),

    #[error("only host {host} may mint tickets for event {event}")]
    NotHost { event: EventId, host: Address },

    #[error("ticket {ticket} is owned by {owner}, not {claimed}")]
    NotOwner {
        ticket: TicketId,
        owner: Address,
        claimed: Address,
    },

    #[error("tickets of event {0} are not transferable")]
    NotTransferable(EventId),

    #[error("ticket backend error: {0}")]
    Backend(String),
}

/// A claim presented a ticket that does not authorize it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("Invalid event: ticket belongs to event {presented}, splitter expects event {expected}")]
    InvalidEvent { expected: EventId, presented: EventId },

    #[error("Unauthorized owner: {claimant} holds no valid ticket of event {event}")]
    UnauthorizedOwner {
        claimant: Address,
        event: EventId,
        serial: Option<Serial>,
    },
}
