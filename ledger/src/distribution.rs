//! One share table bound to one asset ledger per receiver path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::asset_ledger::{AssetLedger, DepositOutcome};
use crate::error::LedgerError;
use crate::share_table::ShareTable;
use fundsplit_types::{Amount, ReceiverPath, Serial};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionLedger {
    shares: ShareTable,
    assets: BTreeMap<ReceiverPath, AssetLedger>,
}

impl DistributionLedger {
    pub fn new<I>(shares: ShareTable, paths: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = ReceiverPath>,
    {
        let mut assets = BTreeMap::new();
        for path in paths {
            if assets.contains_key(&path) {
                return Err(LedgerError::DuplicateAsset(path));
            }
            let ledger = AssetLedger::new(&shares);
            assets.insert(path, ledger);
        }
        Ok(Self { shares, assets })
    }

    pub fn shares(&self) -> &ShareTable {
        &self.shares
    }

    pub fn paths(&self) -> impl Iterator<Item = &ReceiverPath> {
        self.assets.keys()
    }

    pub fn asset(&self, path: &ReceiverPath) -> Option<&AssetLedger> {
        self.assets.get(path)
    }

    pub fn deposit(&mut self, path: &ReceiverPath, amount: Amount) -> Result<DepositOutcome, LedgerError> {
        let ledger = self
            .assets
            .get_mut(path)
            .ok_or_else(|| LedgerError::UnknownAsset(path.clone()))?;
        ledger.deposit(&self.shares, amount)
    }

    /// Read and zero one serial's allocation of one asset.
    pub fn take(&mut self, path: &ReceiverPath, serial: Serial) -> Result<Amount, LedgerError> {
        self.assets
            .get_mut(path)
            .ok_or_else(|| LedgerError::UnknownAsset(path.clone()))?
            .take(serial)
    }

    /// Undo a [`take`](Self::take) of one serial's allocation.
    pub fn restore(&mut self, path: &ReceiverPath, serial: Serial, amount: Amount) -> Result<(), LedgerError> {
        self.assets
            .get_mut(path)
            .ok_or_else(|| LedgerError::UnknownAsset(path.clone()))?
            .restore(serial, amount)
    }

    pub fn allocated(&self, path: &ReceiverPath, serial: Serial) -> Option<Amount> {
        self.assets.get(path).and_then(|l| l.allocated(serial))
    }

    pub fn unallocated(&self, path: &ReceiverPath) -> Option<Amount> {
        self.assets.get(path).map(AssetLedger::unallocated)
    }

    /// Total held for one asset: everything allocated plus the remainder.
    pub fn held(&self, path: &ReceiverPath) -> Option<Amount> {
        self.assets
            .get(path)
            .and_then(AssetLedger::held)
    }

    pub fn is_conserved(&self) -> bool {
        self.assets.values().all(AssetLedger::is_conserved)
    }
}
