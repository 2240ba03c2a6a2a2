use proptest::prelude::*;

use fundsplit_ledger::{AssetLedger, ShareTable};
use fundsplit_types::{Amount, Serial, DISTRIBUTION_QUANTUM};

/// Share vectors that sum to exactly 10000 bps with no zero entry.
fn valid_shares() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(1u16..2000, 1..8).prop_map(|mut raw| {
        let total: u32 = raw.iter().map(|&b| u32::from(b)).sum();
        if total < 10_000 {
            raw.push((10_000 - total) as u16);
            raw
        } else {
            // Scale down, then top up the first entry.
            let mut scaled: Vec<u16> = raw
                .iter()
                .map(|&b| ((u32::from(b) * 9_000) / total).max(1) as u16)
                .collect();
            let sum: u32 = scaled.iter().map(|&b| u32::from(b)).sum();
            scaled[0] += (10_000 - sum) as u16;
            scaled
        }
    })
}

#[derive(Clone, Debug)]
enum Op {
    Deposit(u64),
    Claim(usize),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (0u64..5_000_000).prop_map(Op::Deposit),
            (0usize..8).prop_map(Op::Claim),
        ],
        0..40,
    )
}

proptest! {
    /// Conservation: allocated + unallocated + claimed == deposited after every step.
    #[test]
    fn conservation_holds_for_any_sequence(shares in valid_shares(), ops in ops()) {
        let table = ShareTable::from_shares(&shares).unwrap();
        let mut ledger = AssetLedger::new(&table);
        let mut deposited = Amount::ZERO;
        let mut claimed = Amount::ZERO;

        for op in ops {
            match op {
                Op::Deposit(raw) => {
                    let d = Amount::from_raw(raw as u128);
                    ledger.deposit(&table, d).unwrap();
                    deposited = deposited + d;
                }
                Op::Claim(i) => {
                    let serial = Serial((i % shares.len()) as u32);
                    claimed = claimed + ledger.take(serial).unwrap();
                }
            }
            prop_assert_eq!(ledger.held().unwrap() + claimed, deposited);
            prop_assert!(ledger.is_conserved());
            prop_assert!(ledger.unallocated() < DISTRIBUTION_QUANTUM);
        }
    }

    /// Two deposits and one combined deposit end in identical ledgers.
    #[test]
    fn deposits_are_associative(shares in valid_shares(), a in 0u64..10_000_000, b in 0u64..10_000_000) {
        let table = ShareTable::from_shares(&shares).unwrap();
        let mut split = AssetLedger::new(&table);
        split.deposit(&table, Amount::from_raw(a as u128)).unwrap();
        split.deposit(&table, Amount::from_raw(b as u128)).unwrap();

        let mut combined = AssetLedger::new(&table);
        combined.deposit(&table, Amount::from_raw(a as u128 + b as u128)).unwrap();

        prop_assert_eq!(split.allocations(), combined.allocations());
        prop_assert_eq!(split.unallocated(), combined.unallocated());
    }

    /// A pool below the quantum changes nothing but the remainder.
    #[test]
    fn sub_quantum_pools_only_grow_the_remainder(shares in valid_shares(), a in 0u128..5_000, b in 0u128..5_000) {
        let table = ShareTable::from_shares(&shares).unwrap();
        let mut ledger = AssetLedger::new(&table);
        ledger.deposit(&table, Amount::from_raw(a)).unwrap();
        ledger.deposit(&table, Amount::from_raw(b)).unwrap();
        prop_assert_eq!(ledger.unallocated(), Amount::from_raw(a + b));
        prop_assert_eq!(ledger.total_allocated(), Some(Amount::ZERO));
    }

    /// A quantized pool gives every serial exactly pool * bps / 10000.
    #[test]
    fn quantized_pools_split_proportionally(shares in valid_shares(), quanta in 0u128..1_000_000) {
        let table = ShareTable::from_shares(&shares).unwrap();
        let mut ledger = AssetLedger::new(&table);
        let pool = Amount::from_raw(quanta * DISTRIBUTION_QUANTUM.raw());
        ledger.deposit(&table, pool).unwrap();

        prop_assert_eq!(ledger.unallocated(), Amount::ZERO);
        for (i, &bps) in shares.iter().enumerate() {
            let expected = pool.raw() * u128::from(bps);
            prop_assert_eq!(expected % 10_000, 0);
            prop_assert_eq!(ledger.allocated(Serial(i as u32)), Some(Amount::from_raw(expected / 10_000)));
        }
    }
}
