//! TOML scenarios: a declared world plus a list of steps to run against it.
//!
//! ```toml
//! [[assets]]
//! contract_address = "0x0ae53cb6e3f42a79"
//! contract_name = "FlowToken"
//! receiver_path = "flowTokenReceiver"
//!
//! [[accounts]]
//! name = "admin"
//! address = "0xf8d6e0586b0a20c7"
//! balances = { flowTokenReceiver = "1000" }
//!
//! [[steps]]
//! action = "create"
//! signer = "admin"
//! label = "team"
//! recipients = { alice = "3000", bob = "7000" }
//! ```
//!
//! Accounts and splitters are referred to by name; plain `0x…` addresses
//! work too.

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use fundsplit_bank::AssetTransfer;
use fundsplit_nullables::{NullBank, NullTicketIssuer};
use fundsplit_splitter::{CreateSplitterRequest, SplitterConfig, SplitterError, SplitterRegistry};
use fundsplit_tickets::EventMetadata;
use fundsplit_types::{Address, Amount, AssetDescriptor, EventId, ReceiverPath, Serial};

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    pub assets: Vec<AssetDescriptor>,
    #[serde(default)]
    pub accounts: Vec<AccountSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AccountSpec {
    pub name: String,
    pub address: Address,
    /// Starting balance per receiver path.
    #[serde(default)]
    pub balances: BTreeMap<ReceiverPath, Amount>,
    /// Open a receiver for every scenario asset up front.
    #[serde(default = "default_true")]
    pub open_receivers: bool,
}

fn default_true() -> bool {
    true
}

fn default_init_amount() -> String {
    "0.01".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    /// The step must fail with an error containing this text.
    #[serde(default)]
    pub expect_error: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Create {
        signer: String,
        /// Name later steps use for the new splitter.
        label: String,
        recipients: BTreeMap<String, String>,
        #[serde(default = "default_init_amount")]
        init_amount: String,
        /// Receiver paths of the scenario assets to accept; all when empty.
        #[serde(default)]
        assets: Vec<ReceiverPath>,
        #[serde(default)]
        metadata: Option<EventMetadata>,
    },
    Deposit {
        from: String,
        splitter: String,
        receiver_path: ReceiverPath,
        amount: Amount,
    },
    Claim {
        signer: String,
        splitter: String,
        /// All of the splitter's assets when empty.
        #[serde(default)]
        receiver_paths: Vec<ReceiverPath>,
    },
    ClaimForAddress {
        splitter: String,
        target: String,
        #[serde(default)]
        receiver_paths: Vec<ReceiverPath>,
    },
    TransferTicket {
        splitter: String,
        from: String,
        to: String,
        /// Which of `from`'s tickets; the lowest serial when omitted.
        #[serde(default)]
        serial: Option<u32>,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Create { .. } => "create",
            Action::Deposit { .. } => "deposit",
            Action::Claim { .. } => "claim",
            Action::ClaimForAddress { .. } => "claim_for_address",
            Action::TransferTicket { .. } => "transfer_ticket",
        }
    }
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("invalid scenario")
    }

    pub fn from_toml_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

// ── Report ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Report {
    pub steps: Vec<StepReport>,
    pub accounts: Vec<AccountReport>,
    pub splitters: Vec<SplitterReport>,
    pub stats: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    /// `None` on success, otherwise the (expected) error text.
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountReport {
    pub name: String,
    pub address: Address,
    pub balances: BTreeMap<ReceiverPath, Amount>,
}

#[derive(Debug, Serialize)]
pub struct SplitterReport {
    pub label: String,
    pub address: Address,
    pub event_id: EventId,
    pub reserve: Amount,
    pub allocated: BTreeMap<ReceiverPath, BTreeMap<Serial, Amount>>,
    pub unallocated: BTreeMap<ReceiverPath, Amount>,
    pub stats: BTreeMap<String, u64>,
}

impl Report {
    pub fn render_text(&self) -> String {
        let mut out = String::from("steps:\n");
        for step in &self.steps {
            match &step.error {
                None => out.push_str(&format!("  #{} {}: ok\n", step.index, step.action)),
                Some(e) => out.push_str(&format!("  #{} {}: failed as expected: {e}\n", step.index, step.action)),
            }
        }
        out.push_str("accounts:\n");
        for account in &self.accounts {
            out.push_str(&format!("  {} ({})\n", account.name, account.address));
            for (path, amount) in &account.balances {
                out.push_str(&format!("    {path}: {amount}\n"));
            }
        }
        out.push_str("splitters:\n");
        for splitter in &self.splitters {
            out.push_str(&format!(
                "  {} ({}) event {} reserve {}\n",
                splitter.label, splitter.address, splitter.event_id, splitter.reserve
            ));
            for (path, serials) in &splitter.allocated {
                let unallocated = splitter.unallocated.get(path).copied().unwrap_or_default();
                out.push_str(&format!("    {path}: unallocated {unallocated}\n"));
                for (serial, amount) in serials {
                    out.push_str(&format!("      serial {serial}: {amount}\n"));
                }
            }
            let counts: Vec<String> = splitter
                .stats
                .iter()
                .filter(|(_, &value)| value > 0)
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            if !counts.is_empty() {
                out.push_str(&format!("    stats: {}\n", counts.join(" ")));
            }
        }
        out
    }
}

// ── Simulation ─────────────────────────────────────────────────────────

/// An isolated in-memory world built from one scenario.
struct Simulation {
    bank: Arc<NullBank>,
    registry: SplitterRegistry,
    assets: Vec<AssetDescriptor>,
    names: BTreeMap<String, Address>,
    labels: Vec<(String, Address)>,
}

impl Simulation {
    fn new(config: SplitterConfig, scenario: &Scenario) -> anyhow::Result<Self> {
        let bank = Arc::new(NullBank::new());
        let issuer = Arc::new(NullTicketIssuer::new());
        let mut names = BTreeMap::new();
        for account in &scenario.accounts {
            if names.insert(account.name.clone(), account.address).is_some() {
                bail!("account {} is declared twice", account.name);
            }
            if account.open_receivers {
                for asset in &scenario.assets {
                    bank.open_receiver(&asset.asset_id(), &account.address)?;
                }
            }
            for (path, amount) in &account.balances {
                let asset = find_asset(&scenario.assets, path)?;
                bank.mint(&asset.asset_id(), &account.address, *amount);
            }
        }
        let registry = SplitterRegistry::new(config, bank.clone(), issuer);
        Ok(Self {
            bank,
            registry,
            assets: scenario.assets.clone(),
            names,
            labels: Vec::new(),
        })
    }

    fn resolve(&self, who: &str) -> anyhow::Result<Address> {
        if let Some(address) = self.names.get(who) {
            return Ok(*address);
        }
        who.parse()
            .map_err(|_| anyhow!("unknown account or splitter {who:?}"))
    }

    fn splitter_paths(&self, splitter: &Address, requested: &[ReceiverPath]) -> Vec<ReceiverPath> {
        if !requested.is_empty() {
            return requested.to_vec();
        }
        self.registry
            .splitter(splitter)
            .map(|account| account.assets().iter().map(|a| a.receiver_path.clone()).collect())
            .unwrap_or_default()
    }

    fn run_step(&mut self, action: &Action) -> anyhow::Result<Result<(), SplitterError>> {
        match action {
            Action::Create {
                signer,
                label,
                recipients,
                init_amount,
                assets,
                metadata,
            } => {
                let signer = self.resolve(signer)?;
                if self.names.contains_key(label) {
                    bail!("name {label:?} is already taken");
                }
                let chosen: Vec<AssetDescriptor> = if assets.is_empty() {
                    self.assets.clone()
                } else {
                    assets
                        .iter()
                        .map(|path| find_asset(&self.assets, path).cloned())
                        .collect::<anyhow::Result<_>>()?
                };
                let recipients = recipients
                    .iter()
                    .map(|(who, share)| Ok((self.resolve(who)?, share.as_str())))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                let mut request = CreateSplitterRequest::new(&chosen, recipients, init_amount);
                if let Some(metadata) = metadata {
                    request = request.with_metadata(metadata.clone());
                }
                Ok(self.registry.create_splitter(&signer, &request).map(|account| {
                    self.names.insert(label.clone(), account.address());
                    self.labels.push((label.clone(), account.address()));
                }))
            }
            Action::Deposit {
                from,
                splitter,
                receiver_path,
                amount,
            } => {
                let (from, splitter) = (self.resolve(from)?, self.resolve(splitter)?);
                Ok(self
                    .registry
                    .deposit(&splitter, &from, receiver_path, *amount)
                    .map(|_| ()))
            }
            Action::Claim {
                signer,
                splitter,
                receiver_paths,
            } => {
                let (signer, splitter) = (self.resolve(signer)?, self.resolve(splitter)?);
                let paths = self.splitter_paths(&splitter, receiver_paths);
                Ok(self.registry.claim(&splitter, &signer, &paths).map(|_| ()))
            }
            Action::ClaimForAddress {
                splitter,
                target,
                receiver_paths,
            } => {
                let (target, splitter) = (self.resolve(target)?, self.resolve(splitter)?);
                let paths = self.splitter_paths(&splitter, receiver_paths);
                Ok(self
                    .registry
                    .claim_for_address(&splitter, &target, &paths)
                    .map(|_| ()))
            }
            Action::TransferTicket {
                splitter,
                from,
                to,
                serial,
            } => {
                let splitter = self.resolve(splitter)?;
                let (from, to) = (self.resolve(from)?, self.resolve(to)?);
                let event = self
                    .registry
                    .event_id_of(&splitter)
                    .ok_or_else(|| anyhow!("{splitter} is not a splitter"))?;
                let ticket = self
                    .registry
                    .tickets()
                    .tickets_for(&from, event)
                    .into_iter()
                    .find(|t| serial.map_or(true, |s| t.serial == Serial(s)))
                    .ok_or_else(|| anyhow!("{from} holds no matching ticket of {splitter}"))?;
                Ok(self.registry.transfer_ticket(ticket.id, &from, &to).map(|_| ()))
            }
        }
    }

    fn report(&self, scenario: &Scenario, steps: Vec<StepReport>) -> Report {
        let accounts = scenario
            .accounts
            .iter()
            .map(|account| AccountReport {
                name: account.name.clone(),
                address: account.address,
                balances: self
                    .assets
                    .iter()
                    .map(|a| (a.receiver_path.clone(), self.bank.balance(&a.asset_id(), &account.address)))
                    .collect(),
            })
            .collect();
        let splitters = self
            .labels
            .iter()
            .filter_map(|(label, address)| {
                let account = self.registry.splitter(address)?;
                let paths: Vec<ReceiverPath> =
                    account.assets().iter().map(|a| a.receiver_path.clone()).collect();
                Some(SplitterReport {
                    label: label.clone(),
                    address: *address,
                    event_id: account.event_id(),
                    reserve: account.reserve(),
                    allocated: self.registry.splitter_balances(address, &paths),
                    unallocated: self.registry.unallocated_balances(address, &paths),
                    stats: self
                        .registry
                        .splitter_stats(address)
                        .into_iter()
                        .map(|(name, value)| (name.to_string(), value))
                        .collect(),
                })
            })
            .collect();
        let stats = self
            .registry
            .stats()
            .snapshot()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        Report {
            steps,
            accounts,
            splitters,
            stats,
        }
    }
}

fn find_asset<'a>(assets: &'a [AssetDescriptor], path: &ReceiverPath) -> anyhow::Result<&'a AssetDescriptor> {
    assets
        .iter()
        .find(|a| a.receiver_path == *path)
        .ok_or_else(|| anyhow!("no scenario asset with receiver path {path}"))
}

/// Run every step in order. The first unexpected outcome aborts the run.
pub fn run(scenario: &Scenario, config: SplitterConfig) -> anyhow::Result<Report> {
    let mut simulation = Simulation::new(config, scenario)?;
    let mut steps = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        let action = step.action.name();
        let outcome = simulation
            .run_step(&step.action)
            .with_context(|| format!("step #{index} ({action})"))?;
        let error = match (outcome, &step.expect_error) {
            (Ok(()), None) => None,
            (Ok(()), Some(expected)) => {
                bail!("step #{index} ({action}) succeeded, expected an error containing {expected:?}")
            }
            (Err(e), None) => bail!("step #{index} ({action}) failed: {e}"),
            (Err(e), Some(expected)) => {
                let text = e.to_string();
                if !text.contains(expected.as_str()) {
                    bail!("step #{index} ({action}) failed with {text:?}, expected {expected:?}");
                }
                Some(text)
            }
        };
        tracing::debug!(index, action, ok = error.is_none(), "scenario step done");
        steps.push(StepReport { index, action, error });
    }

    Ok(simulation.report(scenario, steps))
}
