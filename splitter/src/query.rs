//! Read-only queries. Unknown splitters, paths and serials read as empty.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError};

use fundsplit_types::{Address, Amount, EventId, ReceiverPath, Serial};

use crate::account::SplitterAccount;
use crate::registry::SplitterRegistry;

impl SplitterRegistry {
    pub fn splitter(&self, address: &Address) -> Option<Arc<SplitterAccount>> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }

    pub fn is_splitter(&self, address: &Address) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(address)
    }

    /// Every registered splitter, sorted.
    pub fn splitters(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        addresses.sort();
        addresses
    }

    pub fn event_id_of(&self, splitter: &Address) -> Option<EventId> {
        self.splitter(splitter).map(|a| a.event_id())
    }

    pub fn allocated_balance(&self, splitter: &Address, path: &ReceiverPath, serial: Serial) -> Option<Amount> {
        self.splitter(splitter)?
            .with_ledger(|ledger| ledger.allocated(path, serial))
    }

    /// Allocated balance of every serial, for each of `paths`.
    pub fn splitter_balances(
        &self,
        splitter: &Address,
        paths: &[ReceiverPath],
    ) -> BTreeMap<ReceiverPath, BTreeMap<Serial, Amount>> {
        let Some(account) = self.splitter(splitter) else {
            return BTreeMap::new();
        };
        account.with_ledger(|ledger| {
            paths
                .iter()
                .filter_map(|path| {
                    let asset = ledger.asset(path)?;
                    Some((path.clone(), asset.allocations().clone()))
                })
                .collect()
        })
    }

    /// Unallocated remainder, for each of `paths`.
    pub fn unallocated_balances(&self, splitter: &Address, paths: &[ReceiverPath]) -> BTreeMap<ReceiverPath, Amount> {
        let Some(account) = self.splitter(splitter) else {
            return BTreeMap::new();
        };
        account.with_ledger(|ledger| {
            paths
                .iter()
                .filter_map(|path| Some((path.clone(), ledger.unallocated(path)?)))
                .collect()
        })
    }

    /// Serials of `event_id` currently owned by `owner`, ascending.
    pub fn serials_of(&self, owner: &Address, event_id: EventId) -> Vec<Serial> {
        self.tickets.serials_of(owner, event_id)
    }

    /// Serials of `splitter`'s event currently owned by `owner`.
    pub fn serials_held(&self, owner: &Address, splitter: &Address) -> Vec<Serial> {
        self.event_id_of(splitter)
            .map(|event_id| self.serials_of(owner, event_id))
            .unwrap_or_default()
    }

    /// Operation counts for one splitter, by stat name.
    pub fn splitter_stats(&self, splitter: &Address) -> BTreeMap<&'static str, u64> {
        if !self.is_splitter(splitter) {
            return BTreeMap::new();
        }
        self.stats.scope_snapshot(splitter)
    }

    /// Splitters currently holding tickets of `splitter`.
    pub fn holders_of(&self, splitter: &Address) -> Vec<Address> {
        self.composition
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .holders_of(splitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CreateSplitterRequest, SplitterConfig};
    use fundsplit_nullables::{NullBank, NullTicketIssuer};
    use fundsplit_types::AssetDescriptor;

    const ADMIN: Address = Address::new(0xad);
    const ALICE: Address = Address::new(0xa1);
    const BOB: Address = Address::new(0xb0);

    fn flow() -> AssetDescriptor {
        AssetDescriptor::new(
            Address::new(0x0ae53cb6e3f42a79),
            "FlowToken",
            ReceiverPath::new("flowTokenReceiver").unwrap(),
        )
    }

    fn registry() -> SplitterRegistry {
        let bank = Arc::new(NullBank::new());
        bank.mint(&flow().asset_id(), &ADMIN, Amount::from_units(100));
        SplitterRegistry::new(SplitterConfig::default(), bank, Arc::new(NullTicketIssuer::new()))
    }

    #[test]
    fn balances_after_a_deposit() {
        let registry = registry();
        let request = CreateSplitterRequest::new(&[flow()], [(ALICE, "2500"), (BOB, "7500")], "1");
        let splitter = registry.create_splitter(&ADMIN, &request).unwrap().address();
        registry
            .deposit(&splitter, &ADMIN, &flow().receiver_path, Amount::from_raw(4_000_005_000))
            .unwrap();

        let paths = [flow().receiver_path];
        let balances = registry.splitter_balances(&splitter, &paths);
        let flow_balances = &balances[&flow().receiver_path];
        assert_eq!(flow_balances[&Serial(0)].to_string(), "10.00000000");
        assert_eq!(flow_balances[&Serial(1)].to_string(), "30.00000000");
        assert_eq!(
            registry.unallocated_balances(&splitter, &paths)[&flow().receiver_path],
            Amount::from_raw(5_000)
        );
        assert_eq!(
            registry.allocated_balance(&splitter, &flow().receiver_path, Serial(1)),
            Some(Amount::from_units(30))
        );

        let stats = registry.splitter_stats(&splitter);
        assert_eq!(stats[crate::DEPOSITS], 1);
        assert_eq!(stats[crate::SPLITTERS_CREATED], 1);
        assert_eq!(stats[crate::CLAIMS], 0);
    }

    #[test]
    fn serials_are_visible_per_owner() {
        let registry = registry();
        let request = CreateSplitterRequest::new(&[flow()], [(ALICE, "2500"), (BOB, "7500")], "1");
        let splitter = registry.create_splitter(&ADMIN, &request).unwrap().address();
        let event = registry.event_id_of(&splitter).unwrap();
        assert_eq!(registry.serials_of(&BOB, event), vec![Serial(1)]);
        assert_eq!(registry.serials_held(&ALICE, &splitter), vec![Serial(0)]);
        assert!(registry.serials_held(&ADMIN, &splitter).is_empty());
    }

    #[test]
    fn unknown_lookups_are_empty() {
        let registry = registry();
        let nowhere = Address::new(0x404);
        let paths = [flow().receiver_path];
        assert!(registry.splitter_balances(&nowhere, &paths).is_empty());
        assert!(registry.unallocated_balances(&nowhere, &paths).is_empty());
        assert_eq!(registry.allocated_balance(&nowhere, &paths[0], Serial(0)), None);
        assert_eq!(registry.event_id_of(&nowhere), None);
        assert!(registry.serials_held(&ALICE, &nowhere).is_empty());
        assert!(!registry.is_splitter(&nowhere));
        assert!(registry.splitter_stats(&nowhere).is_empty());
    }
}
