//! The splitter registry: account index, creation, deposits and ticket
//! transfers.
//!
//! Concurrency model:
//! - operations on the same splitter are serialized by that account's ledger
//!   lock, operations on different splitters run in parallel
//! - no operation holds two ledger locks at once
//! - lock order is composition graph, then account index, then a ledger
//!   lock; nothing acquires them the other way round

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use fundsplit_bank::AssetTransfer;
use fundsplit_ledger::{DepositOutcome, DistributionLedger, LedgerError, ShareEntry, ShareTable};
use fundsplit_tickets::{ClaimTicket, TicketError, TicketIssuer, TicketRegistry};
use fundsplit_types::{Address, Amount, AssetId, ReceiverPath, TicketId};
use fundsplit_utils::StatsCounter;

use crate::account::SplitterAccount;
use crate::composition::CompositionGraph;
use crate::config::{InitialFunding, SplitterConfig};
use crate::creation::{self, CreateSplitterRequest, CreationPlan};
use crate::events::{EventBus, Listener, SplitterEvent};
use crate::SplitterError;

/// First address handed to a splitter account. Later ones count up from here.
pub const SPLITTER_ADDRESS_BASE: u64 = 0x5e00_0000_0000_0000;

pub const SPLITTERS_CREATED: &str = "splitters_created";
pub const DEPOSITS: &str = "deposits";
pub const CLAIMS: &str = "claims";
pub const CLAIMS_REJECTED: &str = "claims_rejected";
pub const TICKETS_TRANSFERRED: &str = "tickets_transferred";

const STAT_NAMES: &[&str] = &[
    SPLITTERS_CREATED,
    DEPOSITS,
    CLAIMS,
    CLAIMS_REJECTED,
    TICKETS_TRANSFERRED,
];

/// Owns every splitter account and the collaborators they share.
pub struct SplitterRegistry {
    pub(crate) config: SplitterConfig,
    pub(crate) bank: Arc<dyn AssetTransfer>,
    pub(crate) tickets: TicketRegistry,
    pub(crate) accounts: RwLock<HashMap<Address, Arc<SplitterAccount>>>,
    pub(crate) composition: Mutex<CompositionGraph>,
    next_address: AtomicU64,
    pub(crate) events: EventBus,
    pub(crate) stats: StatsCounter<Address>,
}

impl SplitterRegistry {
    pub fn new(config: SplitterConfig, bank: Arc<dyn AssetTransfer>, issuer: Arc<dyn TicketIssuer>) -> Self {
        Self {
            config,
            bank,
            tickets: TicketRegistry::new(issuer),
            accounts: RwLock::new(HashMap::new()),
            composition: Mutex::new(CompositionGraph::new()),
            next_address: AtomicU64::new(SPLITTER_ADDRESS_BASE),
            events: EventBus::new(),
            stats: StatsCounter::new(STAT_NAMES),
        }
    }

    /// Register an event listener. Listeners run after locks are released.
    pub fn subscribe(&mut self, listener: Listener) {
        self.events.subscribe(listener);
    }

    /// Register a listener for the events of one splitter.
    pub fn subscribe_splitter(&mut self, splitter: Address, listener: Listener) {
        self.events.subscribe_splitter(splitter, listener);
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Totals across all splitters, plus per-splitter counts.
    pub fn stats(&self) -> &StatsCounter<Address> {
        &self.stats
    }

    pub fn tickets(&self) -> &TicketRegistry {
        &self.tickets
    }

    pub fn bank(&self) -> &dyn AssetTransfer {
        self.bank.as_ref()
    }

    pub(crate) fn account(&self, address: &Address) -> Result<Arc<SplitterAccount>, SplitterError> {
        self.splitter(address)
            .ok_or(SplitterError::SplitterNotFound(*address))
    }

    fn lock_composition(&self) -> Result<MutexGuard<'_, CompositionGraph>, SplitterError> {
        self.composition
            .lock()
            .map_err(|_| SplitterError::LockPoisoned("composition graph".to_string()))
    }

    fn allocate_address(&self) -> Address {
        loop {
            let candidate = Address::new(self.next_address.fetch_add(1, Ordering::Relaxed));
            if !self.is_splitter(&candidate) {
                return candidate;
            }
        }
    }

    /// A splitter's balance backs its allocations; it never pays directly.
    fn ensure_not_splitter(&self, payer: &Address) -> Result<(), SplitterError> {
        if self.is_splitter(payer) {
            return Err(SplitterError::SplitterAsPayer(*payer));
        }
        Ok(())
    }

    // ── Creation ───────────────────────────────────────────────────────

    /// Create a splitter funded by `creator`.
    ///
    /// Validation happens before anything moves. Once the initial funding
    /// has been drawn, any later failure refunds it and no account is
    /// registered.
    pub fn create_splitter(
        &self,
        creator: &Address,
        request: &CreateSplitterRequest,
    ) -> Result<Arc<SplitterAccount>, SplitterError> {
        let result = self.try_create(creator, request);
        if let Err(e) = &result {
            tracing::warn!(%creator, error = %e, "splitter creation rejected");
        }
        result
    }

    fn try_create(
        &self,
        creator: &Address,
        request: &CreateSplitterRequest,
    ) -> Result<Arc<SplitterAccount>, SplitterError> {
        let plan = creation::validate(request, self.config.min_init_amount)?;
        self.ensure_not_splitter(creator)?;
        let address = self.allocate_address();
        for asset in &plan.assets {
            self.bank.open_receiver(&asset.asset_id(), &address)?;
        }

        let funding = plan.funding_asset().asset_id();
        let init_amount = plan.init_amount;
        self.bank.transfer(&funding, creator, &address, init_amount)?;

        match self.register(address, creator, plan) {
            Ok(account) => Ok(account),
            Err(e) => {
                self.refund(&funding, &address, creator, init_amount);
                Err(e)
            }
        }
    }

    fn register(
        &self,
        address: Address,
        creator: &Address,
        plan: CreationPlan,
    ) -> Result<Arc<SplitterAccount>, SplitterError> {
        let recipients: Vec<Address> = plan.recipients.iter().map(|(a, _)| *a).collect();

        // Held from the cycle check until the account is visible.
        let mut graph = self.lock_composition()?;
        for recipient in &recipients {
            if *recipient == address || (self.is_splitter(recipient) && graph.would_cycle(&address, recipient)) {
                return Err(SplitterError::CompositionCycle {
                    origin: address,
                    holder: *recipient,
                });
            }
        }

        let (event_id, tickets) = self.tickets.issue(&address, plan.metadata.clone(), &recipients)?;
        let entries = tickets
            .iter()
            .zip(&plan.recipients)
            .map(|(ticket, (_, bps))| ShareEntry {
                serial: ticket.serial,
                bps: *bps,
            })
            .collect();
        let shares = ShareTable::new(entries).map_err(LedgerError::from)?;
        let mut ledger =
            DistributionLedger::new(shares, plan.assets.iter().map(|a| a.receiver_path.clone()))?;

        let reserve = match self.config.initial_funding {
            InitialFunding::Reserve => plan.init_amount,
            InitialFunding::Distribute => {
                ledger.deposit(&plan.funding_asset().receiver_path, plan.init_amount)?;
                Amount::ZERO
            }
        };

        for ticket in &tickets {
            if self.is_splitter(&ticket.owner) {
                graph.add_edge(address, ticket.owner)?;
            }
        }
        let account = Arc::new(SplitterAccount::new(
            address,
            *creator,
            event_id,
            plan.metadata,
            plan.assets,
            reserve,
            ledger,
        ));
        self.accounts
            .write()
            .map_err(|_| SplitterError::LockPoisoned("account index".to_string()))?
            .insert(address, Arc::clone(&account));
        drop(graph);

        self.stats.increment_in(&address, SPLITTERS_CREATED);
        tracing::info!(
            splitter = %address,
            %creator,
            %event_id,
            recipients = tickets.len(),
            init_amount = %plan.init_amount,
            "splitter account created"
        );
        self.events.emit(&SplitterEvent::SplitterAccountCreated {
            splitter: address,
            event_id,
            creator: *creator,
        });
        for ticket in &tickets {
            self.events.emit(&SplitterEvent::TicketIssued {
                splitter: address,
                ticket: ticket.id,
                serial: ticket.serial,
                owner: ticket.owner,
            });
        }
        Ok(account)
    }

    fn refund(&self, asset: &AssetId, splitter: &Address, creator: &Address, amount: Amount) {
        if let Err(e) = self.bank.transfer(asset, splitter, creator, amount) {
            tracing::error!(%splitter, %creator, %amount, error = %e, "refund of initial funding failed");
        }
    }

    // ── Deposits ───────────────────────────────────────────────────────

    /// Move `amount` from `from` into `splitter` and split it.
    ///
    /// The ledger change is staged and only committed once the transfer
    /// has gone through.
    pub fn deposit(
        &self,
        splitter: &Address,
        from: &Address,
        path: &ReceiverPath,
        amount: Amount,
    ) -> Result<DepositOutcome, SplitterError> {
        let account = self.account(splitter)?;
        let asset = account.asset(path)?.asset_id();
        if let Err(e) = self.ensure_not_splitter(from) {
            tracing::warn!(%splitter, %from, error = %e, "deposit rejected");
            return Err(e);
        }
        let outcome = {
            let mut ledger = account.lock_ledger()?;
            let mut staged = ledger.clone();
            let outcome = staged.deposit(path, amount)?;
            self.bank.transfer(&asset, from, splitter, amount)?;
            *ledger = staged;
            outcome
        };
        self.record_deposit(splitter, path, amount, &outcome);
        Ok(outcome)
    }

    /// Split funds that already sit in `account`'s balance.
    ///
    /// Every credit lands or none does.
    pub(crate) fn credit(
        &self,
        account: &SplitterAccount,
        credits: &[(ReceiverPath, Amount)],
    ) -> Result<(), SplitterError> {
        let outcomes = {
            let mut ledger = account.lock_ledger()?;
            let mut staged = ledger.clone();
            let outcomes = credits
                .iter()
                .map(|(path, amount)| staged.deposit(path, *amount))
                .collect::<Result<Vec<_>, _>>()?;
            *ledger = staged;
            outcomes
        };
        for ((path, amount), outcome) in credits.iter().zip(&outcomes) {
            self.record_deposit(&account.address(), path, *amount, outcome);
        }
        Ok(())
    }

    fn record_deposit(&self, splitter: &Address, path: &ReceiverPath, amount: Amount, outcome: &DepositOutcome) {
        self.stats.increment_in(splitter, DEPOSITS);
        tracing::debug!(
            %splitter,
            %path,
            %amount,
            distributed = %outcome.distributed,
            unallocated = %outcome.unallocated,
            "deposit split"
        );
        self.events.emit(&SplitterEvent::Deposited {
            splitter: *splitter,
            receiver_path: path.clone(),
            amount,
            distributed: outcome.distributed,
            unallocated: outcome.unallocated,
        });
    }

    // ── Ticket transfers ───────────────────────────────────────────────

    /// Transfer a claim ticket, keeping the composition graph acyclic.
    pub fn transfer_ticket(&self, id: TicketId, from: &Address, to: &Address) -> Result<ClaimTicket, SplitterError> {
        let ticket = self
            .tickets
            .issuer()
            .ticket(id)
            .ok_or(TicketError::TicketNotFound(id))?;
        let source = ticket.splitter;

        let mut graph = self.lock_composition()?;
        let tracked = self.is_splitter(&source);
        if tracked && (*to == source || (self.is_splitter(to) && graph.would_cycle(&source, to))) {
            tracing::warn!(ticket = %id, %source, holder = %to, "ticket transfer would close a composition cycle");
            return Err(SplitterError::CompositionCycle { origin: source, holder: *to });
        }
        let moved = self.tickets.transfer(id, from, to)?;
        if tracked {
            if self.is_splitter(from) {
                graph.remove_edge(&source, from);
            }
            if self.is_splitter(to) {
                graph.add_edge(source, *to)?;
            }
        }
        drop(graph);

        self.stats.increment_in(&source, TICKETS_TRANSFERRED);
        tracing::info!(ticket = %id, splitter = %source, %from, %to, "ticket transferred");
        self.events.emit(&SplitterEvent::TicketTransferred {
            splitter: source,
            ticket: id,
            from: *from,
            to: *to,
        });
        Ok(moved)
    }
}
