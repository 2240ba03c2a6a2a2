//! Claim ticket representation.

use fundsplit_types::{Address, EventId, Serial, TicketId};
use serde::{Deserialize, Serialize};

/// A claim ticket: a flat, issuer-bound capability record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTicket {
    /// Unique identifier assigned by the issuer.
    pub id: TicketId,

    /// The splitter account hosting the issuing event.
    pub splitter: Address,

    /// The issuing event. Checked against the splitter on every claim.
    pub event_id: EventId,

    /// Share slot this ticket withdraws.
    pub serial: Serial,

    /// Current holder. Transfers change this and nothing else.
    pub owner: Address,
}

/// Human-readable event metadata plus the transferability flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_transferable")]
    pub transferable: bool,
}

fn default_transferable() -> bool {
    true
}

/// An issuing event as recorded by the issuer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketEvent {
    pub id: EventId,
    pub host: Address,
    pub metadata: EventMetadata,
    /// Number of tickets minted so far; also the next serial.
    pub minted: u32,
}
