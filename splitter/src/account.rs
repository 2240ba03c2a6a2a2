//! The splitter account aggregate.

use std::sync::{Mutex, MutexGuard, PoisonError};

use fundsplit_ledger::DistributionLedger;
use fundsplit_tickets::EventMetadata;
use fundsplit_types::{Address, Amount, AssetDescriptor, AssetId, EventId, ReceiverPath};

use crate::SplitterError;

/// A splitter account.
///
/// Everything except the ledger is fixed at creation and readable without
/// locking. The ledger sits behind the account's own mutex, which
/// serializes every deposit and claim against this account while leaving
/// other accounts free.
#[derive(Debug)]
pub struct SplitterAccount {
    address: Address,
    creator: Address,
    event_id: EventId,
    metadata: EventMetadata,
    assets: Vec<AssetDescriptor>,
    /// Initial funding kept out of distribution.
    reserve: Amount,
    ledger: Mutex<DistributionLedger>,
}

impl SplitterAccount {
    pub(crate) fn new(
        address: Address,
        creator: Address,
        event_id: EventId,
        metadata: EventMetadata,
        assets: Vec<AssetDescriptor>,
        reserve: Amount,
        ledger: DistributionLedger,
    ) -> Self {
        Self {
            address,
            creator,
            event_id,
            metadata,
            assets,
            reserve,
            ledger: Mutex::new(ledger),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn creator(&self) -> Address {
        self.creator
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    pub fn assets(&self) -> &[AssetDescriptor] {
        &self.assets
    }

    pub fn reserve(&self) -> Amount {
        self.reserve
    }

    /// The configured asset behind `path`.
    pub fn asset(&self, path: &ReceiverPath) -> Result<&AssetDescriptor, SplitterError> {
        self.assets
            .iter()
            .find(|a| a.receiver_path == *path)
            .ok_or_else(|| SplitterError::UnknownAsset(path.clone()))
    }

    pub fn asset_by_id(&self, id: &AssetId) -> Option<&AssetDescriptor> {
        self.assets
            .iter()
            .find(|a| a.contract_address == id.contract_address && a.contract_name == id.contract_name)
    }

    /// Lock the ledger for a mutation.
    pub(crate) fn lock_ledger(&self) -> Result<MutexGuard<'_, DistributionLedger>, SplitterError> {
        self.ledger
            .lock()
            .map_err(|_| SplitterError::LockPoisoned(format!("splitter {}", self.address)))
    }

    /// A copy of the ledger for read-only queries.
    ///
    /// Every mutation is staged and committed whole, so a poisoned lock
    /// still guards a consistent ledger.
    pub fn ledger_snapshot(&self) -> DistributionLedger {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run `f` against the current ledger without copying it.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&DistributionLedger) -> R) -> R {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        f(&ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundsplit_ledger::ShareTable;
    use fundsplit_types::Serial;

    fn path(s: &str) -> ReceiverPath {
        ReceiverPath::new(s).unwrap()
    }

    fn account() -> SplitterAccount {
        let assets = vec![
            AssetDescriptor::new(Address::new(0x1), "FlowToken", path("flowTokenReceiver")),
            AssetDescriptor::new(Address::new(0x2), "FUSD", path("fusdReceiver")),
        ];
        let shares = ShareTable::from_shares(&[4000, 6000]).unwrap();
        let ledger =
            DistributionLedger::new(shares, assets.iter().map(|a| a.receiver_path.clone())).unwrap();
        SplitterAccount::new(
            Address::new(0x100),
            Address::new(0xad),
            EventId(7),
            EventMetadata::default(),
            assets,
            Amount::from_units(1),
            ledger,
        )
    }

    #[test]
    fn assets_resolve_by_path_and_id() {
        let account = account();
        let fusd = account.asset(&path("fusdReceiver")).unwrap();
        assert_eq!(fusd.contract_name, "FUSD");
        assert_eq!(account.asset_by_id(&fusd.asset_id()), Some(fusd));
        assert!(matches!(
            account.asset(&path("usdcReceiver")),
            Err(SplitterError::UnknownAsset(_))
        ));
    }

    #[test]
    fn ledger_mutations_are_visible_to_snapshots() {
        let account = account();
        account
            .lock_ledger()
            .unwrap()
            .deposit(&path("fusdReceiver"), Amount::from_units(10))
            .unwrap();
        let snapshot = account.ledger_snapshot();
        assert_eq!(
            snapshot.allocated(&path("fusdReceiver"), Serial(1)),
            Some(Amount::from_units(6))
        );
        assert_eq!(
            account.with_ledger(|l| l.allocated(&path("fusdReceiver"), Serial(0))),
            Some(Amount::from_units(4))
        );
    }
}
