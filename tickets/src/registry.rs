//! Ticket registry: issuance on behalf of splitters and claim authentication.

use std::sync::Arc;

use crate::error::{AuthorizationError, TicketError};
use crate::issuer::TicketIssuer;
use crate::ticket::{ClaimTicket, EventMetadata};
use fundsplit_types::{Address, EventId, Serial, TicketId};

/// Verifies ticket ownership against the issuer's records.
///
/// Tickets handed to us by callers are never trusted as-is: only the event
/// binding is read from the presented value, everything else is re-read
/// from the issuer.
#[derive(Clone)]
pub struct TicketRegistry {
    issuer: Arc<dyn TicketIssuer>,
}

impl TicketRegistry {
    pub fn new(issuer: Arc<dyn TicketIssuer>) -> Self {
        Self { issuer }
    }

    pub fn issuer(&self) -> &dyn TicketIssuer {
        self.issuer.as_ref()
    }

    /// Open an event hosted by `host` and mint one ticket per recipient,
    /// in order. Serial `i` goes to `recipients[i]`.
    pub fn issue(
        &self,
        host: &Address,
        metadata: EventMetadata,
        recipients: &[Address],
    ) -> Result<(EventId, Vec<ClaimTicket>), TicketError> {
        let event_id = self.issuer.create_event(host, metadata)?;
        let tickets = recipients
            .iter()
            .map(|recipient| self.issuer.mint(host, event_id, recipient))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(%host, %event_id, count = tickets.len(), "claim tickets issued");
        Ok((event_id, tickets))
    }

    /// Check that `claimant` may claim with `presented` on the splitter bound to `expected`.
    ///
    /// Returns the issuer's record of the ticket on success.
    pub fn authenticate(
        &self,
        presented: &ClaimTicket,
        expected: EventId,
        claimant: &Address,
    ) -> Result<ClaimTicket, AuthorizationError> {
        if presented.event_id != expected {
            return Err(AuthorizationError::InvalidEvent {
                expected,
                presented: presented.event_id,
            });
        }
        let unauthorized = || AuthorizationError::UnauthorizedOwner {
            claimant: *claimant,
            event: expected,
            serial: Some(presented.serial),
        };
        let record = self
            .issuer
            .ticket(presented.id)
            .filter(|t| t.event_id == expected && t.serial == presented.serial)
            .ok_or_else(unauthorized)?;
        if record.owner != *claimant {
            return Err(unauthorized());
        }
        Ok(record)
    }

    /// Tickets of `event_id` currently held by `owner`, ordered by serial.
    pub fn tickets_for(&self, owner: &Address, event_id: EventId) -> Vec<ClaimTicket> {
        let mut tickets: Vec<ClaimTicket> = self
            .issuer
            .tickets_owned_by(owner)
            .into_iter()
            .filter(|t| t.event_id == event_id)
            .collect();
        tickets.sort_by_key(|t| t.serial);
        tickets
    }

    pub fn serials_of(&self, owner: &Address, event_id: EventId) -> Vec<Serial> {
        self.tickets_for(owner, event_id)
            .into_iter()
            .map(|t| t.serial)
            .collect()
    }

    /// Transfer a ticket, honouring its event's transferability flag.
    pub fn transfer(&self, id: TicketId, from: &Address, to: &Address) -> Result<ClaimTicket, TicketError> {
        let ticket = self.issuer.ticket(id).ok_or(TicketError::TicketNotFound(id))?;
        let event = self
            .issuer
            .event(ticket.event_id)
            .ok_or(TicketError::EventNotFound(ticket.event_id))?;
        if !event.metadata.transferable {
            return Err(TicketError::NotTransferable(event.id));
        }
        self.issuer.transfer(id, from, to)
    }
}
