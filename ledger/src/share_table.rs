//! Static share configuration: serial → basis points.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, ShareError};
use fundsplit_types::{Amount, DecodeError, Serial, BPS_DENOMINATOR, DISTRIBUTION_QUANTUM};

/// One shareholder slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEntry {
    pub serial: Serial,
    /// Share in basis points, 1..=10000.
    pub bps: u16,
}

/// Decode a share argument.
///
/// Only non-empty runs of ASCII digits are accepted; `"1000.0"`, `"-1"` and
/// `" 10"` are malformed. Values above 10000 decode fine and are left for
/// [`validate_shares`] to reject.
pub fn parse_share(raw: &str) -> Result<u64, DecodeError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::MalformedShareValue(raw.to_string()));
    }
    raw.parse::<u64>()
        .map_err(|_| DecodeError::MalformedShareValue(raw.to_string()))
}

/// Check that shares are all non-zero and sum to exactly 10000 bps.
pub fn validate_shares<I>(shares: I) -> Result<(), ShareError>
where
    I: IntoIterator<Item = u64>,
{
    let mut total: u64 = 0;
    let mut count = 0usize;
    for (index, share) in shares.into_iter().enumerate() {
        if share == 0 {
            return Err(ShareError::ZeroShare { index });
        }
        total = total.saturating_add(share);
        count += 1;
    }
    if count == 0 {
        return Err(ShareError::Empty);
    }
    if total != u64::from(BPS_DENOMINATOR) {
        return Err(ShareError::InvalidTotal { total });
    }
    Ok(())
}

/// Immutable serial → basis-point table, sorted by serial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTable {
    entries: Vec<ShareEntry>,
}

impl ShareTable {
    pub fn new(mut entries: Vec<ShareEntry>) -> Result<Self, ShareError> {
        entries.sort_by_key(|e| e.serial);
        if let Some(dup) = entries.windows(2).find(|w| w[0].serial == w[1].serial) {
            return Err(ShareError::DuplicateSerial(dup[0].serial));
        }
        validate_shares(entries.iter().map(|e| u64::from(e.bps)))?;
        Ok(Self { entries })
    }

    /// Table with serials `0..n` in the given order.
    pub fn from_shares(shares: &[u16]) -> Result<Self, ShareError> {
        Self::new(
            shares
                .iter()
                .enumerate()
                .map(|(i, &bps)| ShareEntry {
                    serial: Serial(i as u32),
                    bps,
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[ShareEntry] {
        &self.entries
    }

    pub fn serials(&self) -> impl Iterator<Item = Serial> + '_ {
        self.entries.iter().map(|e| e.serial)
    }

    pub fn share_of(&self, serial: Serial) -> Option<u16> {
        self.entries
            .binary_search_by_key(&serial, |e| e.serial)
            .ok()
            .map(|i| self.entries[i].bps)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split a distributable pool across all serials.
    ///
    /// `distributable` must be a multiple of [`DISTRIBUTION_QUANTUM`]; every
    /// portion is then exact and the portions sum to `distributable`.
    pub fn split(&self, distributable: Amount) -> Result<Vec<(Serial, Amount)>, LedgerError> {
        debug_assert_eq!(distributable.raw() % DISTRIBUTION_QUANTUM.raw(), 0);
        let denominator = u128::from(BPS_DENOMINATOR);
        self.entries
            .iter()
            .map(|e| {
                distributable
                    .raw()
                    .checked_mul(u128::from(e.bps))
                    .map(|scaled| (e.serial, Amount::from_raw(scaled / denominator)))
                    .ok_or(LedgerError::Overflow)
            })
            .collect()
    }
}
