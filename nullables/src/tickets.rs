//! Nullable ticket issuer: in-memory events and tickets.

use fundsplit_tickets::{ClaimTicket, EventMetadata, TicketError, TicketEvent, TicketIssuer};
use fundsplit_types::{Address, EventId, Serial, TicketId};
use std::collections::BTreeMap;
use std::sync::Mutex;

struct IssuerState {
    events: BTreeMap<EventId, TicketEvent>,
    tickets: BTreeMap<TicketId, ClaimTicket>,
    next_event: u64,
    next_ticket: u64,
}

impl Default for IssuerState {
    fn default() -> Self {
        Self {
            events: BTreeMap::new(),
            tickets: BTreeMap::new(),
            next_event: 1,
            next_ticket: 1,
        }
    }
}

/// An in-memory ticket issuer.
///
/// Event and ticket ids are handed out sequentially from 1, so test runs are
/// reproducible. Anyone may open an event, which is exactly what a
/// counterfeit-ticket attack needs.
pub struct NullTicketIssuer {
    state: Mutex<IssuerState>,
}

impl NullTicketIssuer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(IssuerState::default()),
        }
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().unwrap().events.len()
    }

    /// Clear all state.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = IssuerState::default();
    }
}

impl Default for NullTicketIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketIssuer for NullTicketIssuer {
    fn create_event(&self, host: &Address, metadata: EventMetadata) -> Result<EventId, TicketError> {
        let mut state = self.state.lock().unwrap();
        let id = EventId(state.next_event);
        state.next_event += 1;
        state.events.insert(
            id,
            TicketEvent {
                id,
                host: *host,
                metadata,
                minted: 0,
            },
        );
        Ok(id)
    }

    fn event(&self, id: EventId) -> Option<TicketEvent> {
        self.state.lock().unwrap().events.get(&id).cloned()
    }

    fn mint(&self, host: &Address, event_id: EventId, recipient: &Address) -> Result<ClaimTicket, TicketError> {
        let mut state = self.state.lock().unwrap();
        let event = state
            .events
            .get_mut(&event_id)
            .ok_or(TicketError::EventNotFound(event_id))?;
        if event.host != *host {
            return Err(TicketError::NotHost {
                event: event_id,
                host: event.host,
            });
        }
        let serial = Serial(event.minted);
        event.minted += 1;
        let ticket = ClaimTicket {
            id: TicketId(state.next_ticket),
            splitter: *host,
            event_id,
            serial,
            owner: *recipient,
        };
        state.next_ticket += 1;
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    fn ticket(&self, id: TicketId) -> Option<ClaimTicket> {
        self.state.lock().unwrap().tickets.get(&id).cloned()
    }

    fn tickets_owned_by(&self, owner: &Address) -> Vec<ClaimTicket> {
        self.state
            .lock()
            .unwrap()
            .tickets
            .values()
            .filter(|t| t.owner == *owner)
            .cloned()
            .collect()
    }

    fn transfer(&self, id: TicketId, from: &Address, to: &Address) -> Result<ClaimTicket, TicketError> {
        let mut state = self.state.lock().unwrap();
        let event_id = state
            .tickets
            .get(&id)
            .map(|t| t.event_id)
            .ok_or(TicketError::TicketNotFound(id))?;
        let transferable = state
            .events
            .get(&event_id)
            .map(|e| e.metadata.transferable)
            .unwrap_or(false);
        if !transferable {
            return Err(TicketError::NotTransferable(event_id));
        }
        let ticket = state
            .tickets
            .get_mut(&id)
            .ok_or(TicketError::TicketNotFound(id))?;
        if ticket.owner != *from {
            return Err(TicketError::NotOwner {
                ticket: id,
                owner: ticket.owner,
                claimed: *from,
            });
        }
        ticket.owner = *to;
        Ok(ticket.clone())
    }
}
