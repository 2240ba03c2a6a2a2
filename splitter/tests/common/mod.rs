//! Shared fixtures: a FLOW/FUSD world with a funded admin and six testers.

#![allow(dead_code)]

use std::sync::Arc;

use fundsplit_bank::AssetTransfer;
use fundsplit_nullables::{NullBank, NullTicketIssuer};
use fundsplit_splitter::{CreateSplitterRequest, SplitterConfig, SplitterError, SplitterRegistry};
use fundsplit_tickets::TicketIssuer;
use fundsplit_types::{Address, Amount, AssetDescriptor, ReceiverPath};

pub const ADMIN: Address = Address::new(0xf8d6e0586b0a20c7);
pub const ALICE: Address = Address::new(0x01cf0e2f2f715450);
pub const BOB: Address = Address::new(0x179b6b1cb6755e31);
pub const CARL: Address = Address::new(0xf3fcd2c1a78f5eee);
pub const DAVID: Address = Address::new(0xe03daebed8ca0615);
pub const EVA: Address = Address::new(0x045a1763c93006ca);
pub const FRANK: Address = Address::new(0x120e725050340cab);
/// Has no receivers at all.
pub const GEORGE: Address = Address::new(0xf669cb8d41ce0c74);

pub const TESTERS: [Address; 6] = [ALICE, BOB, CARL, DAVID, EVA, FRANK];

pub fn flow() -> AssetDescriptor {
    AssetDescriptor::new(
        Address::new(0x0ae53cb6e3f42a79),
        "FlowToken",
        ReceiverPath::new("flowTokenReceiver").unwrap(),
    )
}

pub fn fusd() -> AssetDescriptor {
    AssetDescriptor::new(
        Address::new(0xf8d6e0586b0a20c7),
        "FUSD",
        ReceiverPath::new("fusdReceiver").unwrap(),
    )
}

pub fn both_paths() -> Vec<ReceiverPath> {
    vec![flow().receiver_path, fusd().receiver_path]
}

pub fn amount(s: &str) -> Amount {
    s.parse().unwrap()
}

pub struct World {
    pub bank: Arc<NullBank>,
    pub issuer: Arc<NullTicketIssuer>,
    pub registry: SplitterRegistry,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(SplitterConfig::default())
    }

    pub fn with_config(config: SplitterConfig) -> Self {
        let issuer = Arc::new(NullTicketIssuer::new());
        Self::with_issuer(config, issuer.clone(), issuer)
    }

    /// A world whose registry talks to `registry_issuer`, which may wrap `issuer`.
    pub fn with_issuer(
        config: SplitterConfig,
        issuer: Arc<NullTicketIssuer>,
        registry_issuer: Arc<dyn TicketIssuer>,
    ) -> Self {
        let bank = Arc::new(NullBank::new());
        bank.mint(&flow().asset_id(), &ADMIN, Amount::from_units(1000));
        bank.mint(&fusd().asset_id(), &ADMIN, Amount::from_units(1000));
        for tester in TESTERS {
            // Account creation leaves every tester with 0.001 FLOW on top.
            bank.mint(&flow().asset_id(), &tester, amount("10.001"));
            bank.open_receiver(&fusd().asset_id(), &tester).unwrap();
        }
        let registry = SplitterRegistry::new(config, bank.clone(), registry_issuer);
        Self { bank, issuer, registry }
    }

    pub fn request(&self, recipients: &[(Address, &str)], init: &str) -> CreateSplitterRequest {
        CreateSplitterRequest::new(&[flow(), fusd()], recipients.iter().copied(), init)
    }

    /// Create a FLOW/FUSD splitter funded by the admin.
    pub fn create(&self, recipients: &[(Address, &str)]) -> Result<Address, SplitterError> {
        self.registry
            .create_splitter(&ADMIN, &self.request(recipients, "0.01"))
            .map(|account| account.address())
    }

    pub fn deposit_flow(&self, splitter: &Address, value: &str) {
        self.registry
            .deposit(splitter, &ADMIN, &flow().receiver_path, amount(value))
            .unwrap();
    }

    pub fn deposit_fusd(&self, splitter: &Address, value: &str) {
        self.registry
            .deposit(splitter, &ADMIN, &fusd().receiver_path, amount(value))
            .unwrap();
    }

    pub fn flow_balance(&self, owner: &Address) -> String {
        self.bank.balance(&flow().asset_id(), owner).to_string()
    }

    pub fn fusd_balance(&self, owner: &Address) -> String {
        self.bank.balance(&fusd().asset_id(), owner).to_string()
    }

    pub fn check_flow_balances(&self, expected: &[(Address, &str)]) {
        for (owner, balance) in expected {
            assert_eq!(self.flow_balance(owner), *balance, "FLOW balance of {owner}");
        }
    }

    pub fn check_fusd_balances(&self, expected: &[(Address, &str)]) {
        for (owner, balance) in expected {
            assert_eq!(self.fusd_balance(owner), *balance, "FUSD balance of {owner}");
        }
    }

    /// `owner` holds exactly one serial of `splitter`; check its two allocations.
    pub fn check_splitter_balances(&self, splitter: &Address, owner: &Address, flow_amount: &str, fusd_amount: &str) {
        let serials = self.registry.serials_held(owner, splitter);
        assert_eq!(serials.len(), 1, "{owner} should hold one serial");
        let balances = self.registry.splitter_balances(splitter, &both_paths());
        assert_eq!(balances[&flow().receiver_path][&serials[0]].to_string(), flow_amount);
        assert_eq!(balances[&fusd().receiver_path][&serials[0]].to_string(), fusd_amount);
    }

    pub fn check_remain_balances(&self, splitter: &Address, flow_amount: &str, fusd_amount: &str) {
        let remain = self.registry.unallocated_balances(splitter, &both_paths());
        assert_eq!(remain[&flow().receiver_path].to_string(), flow_amount);
        assert_eq!(remain[&fusd().receiver_path].to_string(), fusd_amount);
    }

    /// The splitter's bank balance equals its reserve plus everything its
    /// ledger still holds.
    pub fn assert_conserved(&self, splitter: &Address) {
        let account = self.registry.splitter(splitter).unwrap();
        let ledger = account.ledger_snapshot();
        assert!(ledger.is_conserved());
        for asset in account.assets() {
            let mut expected = ledger.held(&asset.receiver_path).unwrap();
            if asset.asset_id() == account.assets()[0].asset_id() {
                expected = expected + account.reserve();
            }
            assert_eq!(
                self.bank.balance(&asset.asset_id(), splitter),
                expected,
                "{}",
                asset.asset_id()
            );
        }
    }
}
