//! Events emitted by the splitter registry for subscribers.

use serde::Serialize;

use fundsplit_types::{Address, Amount, EventId, ReceiverPath, Serial, TicketId};

/// Registry-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum SplitterEvent {
    /// A splitter account was created and bound to its ticket event.
    SplitterAccountCreated {
        splitter: Address,
        event_id: EventId,
        creator: Address,
    },
    /// A claim ticket was minted for a recipient during creation.
    TicketIssued {
        splitter: Address,
        ticket: TicketId,
        serial: Serial,
        owner: Address,
    },
    /// Funds were deposited and split.
    Deposited {
        splitter: Address,
        receiver_path: ReceiverPath,
        amount: Amount,
        distributed: Amount,
        unallocated: Amount,
    },
    /// One serial's allocation of one asset was paid out.
    Claimed {
        splitter: Address,
        claimant: Address,
        serial: Serial,
        receiver_path: ReceiverPath,
        amount: Amount,
    },
    /// A ticket of `splitter` changed hands through the registry.
    TicketTransferred {
        splitter: Address,
        ticket: TicketId,
        from: Address,
        to: Address,
    },
}

impl SplitterEvent {
    /// The splitter the event is about.
    pub fn splitter(&self) -> Address {
        match self {
            SplitterEvent::SplitterAccountCreated { splitter, .. }
            | SplitterEvent::TicketIssued { splitter, .. }
            | SplitterEvent::Deposited { splitter, .. }
            | SplitterEvent::Claimed { splitter, .. }
            | SplitterEvent::TicketTransferred { splitter, .. } => *splitter,
        }
    }
}

pub type Listener = Box<dyn Fn(&SplitterEvent) + Send + Sync>;

/// Synchronous fan-out event bus for splitter events.
///
/// Listeners are invoked inline on the emitting thread, after the account
/// lock has been released. A listener either sees every event or only
/// those of one splitter.
pub struct EventBus {
    listeners: Vec<(Option<Address>, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push((None, listener));
    }

    /// Listen to the events of `splitter` only.
    pub fn subscribe_splitter(&mut self, splitter: Address, listener: Listener) {
        self.listeners.push((Some(splitter), listener));
    }

    pub fn emit(&self, event: &SplitterEvent) {
        let splitter = event.splitter();
        for (filter, listener) in &self.listeners {
            if filter.map_or(true, |wanted| wanted == splitter) {
                listener(event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&SplitterEvent::TicketTransferred {
            splitter: Address::new(7),
            ticket: TicketId(1),
            from: Address::new(1),
            to: Address::new(2),
        });

        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::new();
        bus.emit(&SplitterEvent::SplitterAccountCreated {
            splitter: Address::new(1),
            event_id: EventId(1),
            creator: Address::new(2),
        });
    }

    #[test]
    fn listeners_receive_the_event() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Arc::clone(&seen);
        bus.subscribe(Box::new(move |e| sink.lock().unwrap().push(e.clone())));

        let event = SplitterEvent::TicketIssued {
            splitter: Address::new(9),
            ticket: TicketId(4),
            serial: Serial(0),
            owner: Address::new(3),
        };
        bus.emit(&event);
        assert_eq!(*seen.lock().unwrap(), vec![event]);
    }

    #[test]
    fn splitter_listeners_only_see_their_splitter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Arc::clone(&seen);
        bus.subscribe_splitter(
            Address::new(9),
            Box::new(move |e| sink.lock().unwrap().push(e.splitter())),
        );

        for splitter in [Address::new(9), Address::new(8), Address::new(9)] {
            bus.emit(&SplitterEvent::SplitterAccountCreated {
                splitter,
                event_id: EventId(1),
                creator: Address::new(2),
            });
        }
        assert_eq!(*seen.lock().unwrap(), vec![Address::new(9), Address::new(9)]);
    }
}
