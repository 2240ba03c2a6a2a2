//! Ticket-authorized claims.
//!
//! A claim runs in three steps under the source account's ledger lock:
//! authorize the presented tickets, check every requested asset can be
//! delivered, then settle. Settling drains the serials' allocations on a
//! staged copy of the ledger, transfers one aggregated amount per asset and
//! commits only if every transfer went through.
//!
//! When the claimant is itself a splitter, its own ledger is credited after
//! the source lock is released. If that credit cannot be applied, the claim
//! is unwound: the funds go back and the serials get their allocations back.

use serde::Serialize;
use std::slice;
use std::sync::Arc;

use fundsplit_bank::AssetTransfer;
use fundsplit_ledger::{DistributionLedger, LedgerError};
use fundsplit_tickets::{AuthorizationError, ClaimTicket, TicketRegistry};
use fundsplit_types::{Address, Amount, AssetId, ReceiverPath, Serial};

use crate::account::SplitterAccount;
use crate::events::SplitterEvent;
use crate::registry::{SplitterRegistry, CLAIMS, CLAIMS_REJECTED};
use crate::SplitterError;

/// One serial's allocation of one asset, as paid out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Payout {
    pub serial: Serial,
    pub receiver_path: ReceiverPath,
    pub amount: Amount,
}

/// Result of a successful claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimReceipt {
    pub splitter: Address,
    pub claimant: Address,
    pub payouts: Vec<Payout>,
    /// One aggregated amount per requested asset, in request order.
    totals: Vec<(ReceiverPath, Amount)>,
    /// The claimant was a splitter and the payout was split on arrival.
    pub nested: bool,
}

impl ClaimReceipt {
    /// Total paid for one asset.
    pub fn total(&self, path: &ReceiverPath) -> Amount {
        self.totals
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, amount)| *amount)
            .unwrap_or_default()
    }

    /// Per-asset totals, in the order the assets were requested.
    pub fn totals(&self) -> &[(ReceiverPath, Amount)] {
        &self.totals
    }

    /// Nothing was owed.
    pub fn is_empty(&self) -> bool {
        self.totals.iter().all(|(_, amount)| amount.is_zero())
    }
}

/// Authorizes and settles claims against one splitter account.
pub struct ClaimProcessor<'a> {
    bank: &'a dyn AssetTransfer,
    tickets: &'a TicketRegistry,
}

impl<'a> ClaimProcessor<'a> {
    pub fn new(bank: &'a dyn AssetTransfer, tickets: &'a TicketRegistry) -> Self {
        Self { bank, tickets }
    }

    /// Serials `claimant` may withdraw from `account` with `presented`.
    ///
    /// Every ticket must pass; one bad ticket fails the whole claim.
    pub fn authorize(
        &self,
        account: &SplitterAccount,
        claimant: &Address,
        presented: &[ClaimTicket],
    ) -> Result<Vec<Serial>, AuthorizationError> {
        if presented.is_empty() {
            return Err(AuthorizationError::UnauthorizedOwner {
                claimant: *claimant,
                event: account.event_id(),
                serial: None,
            });
        }
        let mut serials = presented
            .iter()
            .map(|ticket| {
                self.tickets
                    .authenticate(ticket, account.event_id(), claimant)
                    .map(|record| record.serial)
            })
            .collect::<Result<Vec<_>, _>>()?;
        serials.sort();
        serials.dedup();
        Ok(serials)
    }

    /// Check every requested asset is configured and can reach `claimant`.
    pub fn check_deliverable(
        &self,
        account: &SplitterAccount,
        claimant: &Address,
        nested: Option<&SplitterAccount>,
        paths: &[ReceiverPath],
    ) -> Result<(), SplitterError> {
        for path in paths {
            let asset = account.asset(path)?.asset_id();
            let missing = || SplitterError::MissingReceiver {
                asset: asset.clone(),
                account: *claimant,
            };
            if !self.bank.has_receiver(&asset, claimant) {
                return Err(missing());
            }
            if let Some(target) = nested {
                target.asset_by_id(&asset).ok_or_else(missing)?;
            }
        }
        Ok(())
    }

    /// Pay `serials`' allocations of each listed asset to `claimant`.
    ///
    /// `ledger` is replaced only on success. A failed transfer reverses the
    /// ones already made.
    pub fn settle(
        &self,
        account: &SplitterAccount,
        ledger: &mut DistributionLedger,
        claimant: &Address,
        serials: &[Serial],
        paths: &[ReceiverPath],
    ) -> Result<ClaimReceipt, SplitterError> {
        let mut staged = ledger.clone();
        let mut payouts = Vec::new();
        let mut totals = Vec::with_capacity(paths.len());
        let mut transfers: Vec<(AssetId, Amount)> = Vec::new();

        for path in paths {
            let asset = account.asset(path)?.asset_id();
            let mut total = Amount::ZERO;
            for &serial in serials {
                let amount = staged.take(path, serial)?;
                total = total.checked_add(amount).ok_or(LedgerError::Overflow)?;
                payouts.push(Payout {
                    serial,
                    receiver_path: path.clone(),
                    amount,
                });
            }
            totals.push((path.clone(), total));
            if !total.is_zero() {
                transfers.push((asset, total));
            }
        }

        let source = account.address();
        for (done, (asset, amount)) in transfers.iter().enumerate() {
            if let Err(e) = self.bank.transfer(asset, &source, claimant, *amount) {
                self.reverse(&source, claimant, &transfers[..done]);
                return Err(e.into());
            }
        }

        *ledger = staged;
        Ok(ClaimReceipt {
            splitter: source,
            claimant: *claimant,
            payouts,
            totals,
            nested: false,
        })
    }

    fn reverse(&self, source: &Address, claimant: &Address, completed: &[(AssetId, Amount)]) {
        for (asset, amount) in completed.iter().rev() {
            if let Err(e) = self.bank.transfer(asset, claimant, source, *amount) {
                tracing::error!(
                    splitter = %source,
                    %claimant,
                    %asset,
                    %amount,
                    error = %e,
                    "compensating transfer failed"
                );
            }
        }
    }
}

impl SplitterRegistry {
    /// Claim with every ticket of this splitter the caller owns.
    pub fn claim(
        &self,
        splitter: &Address,
        caller: &Address,
        paths: &[ReceiverPath],
    ) -> Result<ClaimReceipt, SplitterError> {
        self.observe_claim(splitter, caller, || {
            let account = self.account(splitter)?;
            let presented = self.tickets.tickets_for(caller, account.event_id());
            self.execute_claim(&account, caller, &presented, paths)
        })
    }

    /// Claim on behalf of `target`, paying `target`. Anyone may trigger it.
    pub fn claim_for_address(
        &self,
        splitter: &Address,
        target: &Address,
        paths: &[ReceiverPath],
    ) -> Result<ClaimReceipt, SplitterError> {
        self.observe_claim(splitter, target, || {
            let account = self.account(splitter)?;
            let presented = self.tickets.tickets_for(target, account.event_id());
            self.execute_claim(&account, target, &presented, paths)
        })
    }

    /// Claim with one explicitly presented ticket.
    pub fn claim_with_ticket(
        &self,
        splitter: &Address,
        caller: &Address,
        ticket: &ClaimTicket,
        paths: &[ReceiverPath],
    ) -> Result<ClaimReceipt, SplitterError> {
        self.observe_claim(splitter, caller, || {
            let account = self.account(splitter)?;
            self.execute_claim(&account, caller, slice::from_ref(ticket), paths)
        })
    }

    fn observe_claim(
        &self,
        splitter: &Address,
        claimant: &Address,
        claim: impl FnOnce() -> Result<ClaimReceipt, SplitterError>,
    ) -> Result<ClaimReceipt, SplitterError> {
        let result = claim();
        match &result {
            Ok(receipt) => {
                self.stats.increment_in(splitter, CLAIMS);
                tracing::info!(
                    %splitter,
                    %claimant,
                    payouts = receipt.payouts.len(),
                    nested = receipt.nested,
                    "claim settled"
                );
                for payout in &receipt.payouts {
                    self.events.emit(&SplitterEvent::Claimed {
                        splitter: *splitter,
                        claimant: *claimant,
                        serial: payout.serial,
                        receiver_path: payout.receiver_path.clone(),
                        amount: payout.amount,
                    });
                }
            }
            Err(e) => {
                self.stats.increment_in(splitter, CLAIMS_REJECTED);
                tracing::warn!(%splitter, %claimant, error = %e, "claim rejected");
            }
        }
        result
    }

    fn execute_claim(
        &self,
        account: &Arc<SplitterAccount>,
        claimant: &Address,
        presented: &[ClaimTicket],
        paths: &[ReceiverPath],
    ) -> Result<ClaimReceipt, SplitterError> {
        let processor = ClaimProcessor::new(self.bank.as_ref(), &self.tickets);
        let nested = self.splitter(claimant);

        let (mut receipt, routes) = {
            let mut ledger = account.lock_ledger()?;
            let serials = processor.authorize(account, claimant, presented)?;
            processor.check_deliverable(account, claimant, nested.as_deref(), paths)?;
            let routes = match &nested {
                Some(target) => nested_routes(account, target, claimant, paths)?,
                None => Vec::new(),
            };
            let receipt = processor.settle(account, &mut ledger, claimant, &serials, paths)?;
            (receipt, routes)
        };

        if let Some(target) = nested {
            receipt.nested = true;
            let credits: Vec<(ReceiverPath, Amount)> = receipt
                .totals()
                .iter()
                .zip(&routes)
                .filter(|((_, total), _)| !total.is_zero())
                .map(|((_, total), target_path)| (target_path.clone(), *total))
                .collect();
            if let Err(e) = self.credit(&target, &credits) {
                tracing::error!(
                    splitter = %account.address(),
                    nested = %claimant,
                    error = %e,
                    "nested splitter could not take the payout, unwinding claim"
                );
                self.unwind_claim(account, &receipt);
                return Err(e);
            }
        }
        Ok(receipt)
    }

    /// Return a settled claim's funds to `account` and give its serials
    /// their allocations back.
    fn unwind_claim(&self, account: &SplitterAccount, receipt: &ClaimReceipt) {
        let source = account.address();
        for (path, total) in receipt.totals().iter().rev() {
            if total.is_zero() {
                continue;
            }
            let returned = account
                .asset(path)
                .map(|a| a.asset_id())
                .and_then(|asset| Ok(self.bank.transfer(&asset, &receipt.claimant, &source, *total)?));
            if let Err(e) = returned {
                tracing::error!(
                    splitter = %source,
                    claimant = %receipt.claimant,
                    %path,
                    amount = %total,
                    error = %e,
                    "returning claimed funds failed"
                );
                return;
            }
        }
        let restored = account.lock_ledger().and_then(|mut ledger| {
            let mut staged = ledger.clone();
            for payout in &receipt.payouts {
                staged.restore(&payout.receiver_path, payout.serial, payout.amount)?;
            }
            *ledger = staged;
            Ok(())
        });
        if let Err(e) = restored {
            tracing::error!(splitter = %source, error = %e, "restoring claimed allocations failed");
        }
    }
}

/// For each requested path, the matching receiver path on the nested splitter.
fn nested_routes(
    account: &SplitterAccount,
    target: &SplitterAccount,
    claimant: &Address,
    paths: &[ReceiverPath],
) -> Result<Vec<ReceiverPath>, SplitterError> {
    paths
        .iter()
        .map(|path| {
            let asset = account.asset(path)?.asset_id();
            target
                .asset_by_id(&asset)
                .map(|a| a.receiver_path.clone())
                .ok_or(SplitterError::MissingReceiver {
                    asset,
                    account: *claimant,
                })
        })
        .collect()
}
