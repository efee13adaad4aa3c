//! # Invariant Fuzz Tests
//!
//! Random sequences of purchases, clock advances, round reconfigurations,
//! vesting starts and claims against a three-round sale. After every step the sale must satisfy:
//!
//! 1. `raised <= supply` for every round
//! 2. `claimed <= vested(bought, now) <= bought` for every participant
//! 3. claimable entitlement never shrinks while only time passes
//! 4. the round cursor never moves back, and every round behind it is sold out
//! 5. no purchase succeeds once vesting has started
//! 6. a claim above the claimable amount fails and changes nothing
//!
//! plus conservation: the books, the rounds and the payout asset agree.

use proptest::prelude::*;
use tokensale_facade::{OpenGate, SaleFacade};
use tokensale_ledger::{AssetLedger, InMemoryAssets};
use tokensale_schedule::{LinearVesting, MultiRound};
use tokensale_types::{
    Address, Amount, CallContext, InstrumentId, RoundPlan, SaleConfig, SaleError, VestingParams,
};

type Sale = SaleFacade<MultiRound, LinearVesting, OpenGate, InMemoryAssets>;

const T0: u64 = 1_700_000_000;
const SUPPLIES: [Amount; 3] = [5_000, 3_000, 2_000];
const TOTAL_SUPPLY: Amount = 10_000;
/// Headroom for rounds grown by reconfiguration.
const RESERVE: Amount = TOTAL_SUPPLY + 1_500;

// ── Helpers ─────────────────────────────────────────────────────────

fn owner() -> Address {
    Address::derive(b"owner")
}

fn flash() -> InstrumentId {
    InstrumentId::Asset(Address::derive(b"flash"))
}

fn usdt() -> InstrumentId {
    InstrumentId::Asset(Address::derive(b"usdt"))
}

fn buyers() -> Vec<Address> {
    (0..3)
        .map(|i| Address::derive(format!("buyer-{i}").as_bytes()))
        .collect()
}

fn setup() -> Sale {
    let mut sale = SaleFacade::new(
        Address::derive(b"sale"),
        MultiRound::new(SUPPLIES.len()).unwrap(),
        LinearVesting::default(),
        OpenGate,
        InMemoryAssets::new(),
    );
    let config = SaleConfig {
        sale_asset: Some(Address::derive(b"flash")),
        accepted_instruments: vec![usdt()],
        // 1 usdt buys 1 unit.
        rounds: Some(RoundPlan::new(SUPPLIES.to_vec(), vec![10_000; SUPPLIES.len()])),
        vesting: Some(VestingParams {
            margin_duration: 100,
            round_duration: 50,
            total_rounds: 4,
        }),
        ..SaleConfig::default()
    };
    sale.initialize(&CallContext::at(owner(), T0), config)
        .unwrap();

    let sale_addr = sale.address();
    let assets = sale.assets_mut();
    assets.mint(&flash(), &sale_addr, RESERVE).unwrap();
    for buyer in buyers() {
        assets.mint(&usdt(), &buyer, 1_000_000).unwrap();
        assets.approve(&usdt(), &buyer, &sale_addr, 1_000_000).unwrap();
    }
    sale
}

#[derive(Debug, Clone)]
enum Op {
    Buy { who: usize, amount: Amount },
    Advance(u64),
    Reconfigure { index: usize, extra: Amount },
    StartVesting,
    /// 0: everything claimable, 1: half of it, 2: one more than claimable.
    Claim { who: usize, mode: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..3, 0u128..3_000).prop_map(|(who, amount)| Op::Buy { who, amount }),
        3 => (1u64..120).prop_map(Op::Advance),
        1 => (0usize..3, 0u128..500).prop_map(|(index, extra)| Op::Reconfigure { index, extra }),
        1 => Just(Op::StartVesting),
        3 => (0usize..3, 0u8..3).prop_map(|(who, mode)| Op::Claim { who, mode }),
    ]
}

fn assert_sale_invariants(sale: &Sale, buyers: &[Address], now: u64) {
    // 1
    for index in 0..SUPPLIES.len() {
        let round = sale.round_info(index).unwrap();
        assert!(round.raised <= round.supply, "round {index} oversold");
    }

    // 2
    let mut bought_sum = 0;
    let mut claimed_sum = 0;
    for buyer in buyers {
        let record = sale.accounting_of(buyer);
        let claimable = sale.claimable_of(buyer, now).unwrap();
        assert!(record.claimed <= record.bought);
        assert!(record.claimed + claimable <= record.bought);
        bought_sum += record.bought;
        claimed_sum += record.claimed;
    }

    // 4
    let cursor = sale.current_sale_info().round;
    for index in 0..cursor.min(SUPPLIES.len()) {
        assert!(sale.round_info(index).unwrap().is_sold_out());
    }

    // Conservation across books, rounds and the payout asset.
    let status = sale.status();
    assert_eq!(status.total_bought, bought_sum);
    assert_eq!(status.total_claimed, claimed_sum);
    assert_eq!(sale.total_raised().unwrap(), bought_sum);
    let paid_out: Amount = buyers
        .iter()
        .map(|b| sale.assets().balance_of(&flash(), b))
        .sum();
    assert_eq!(paid_out, claimed_sum);
    assert_eq!(
        sale.assets().balance_of(&flash(), &sale.address()) + paid_out,
        RESERVE
    );
    assert!(sale.verify_reserve().is_ok());
}

// ── Fuzzed life-cycles ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fuzz_sale_lifecycle(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut sale = setup();
        let buyers = buyers();
        let mut now = T0;

        for op in ops {
            let cursor_before = sale.current_sale_info().round;
            match op {
                Op::Buy { who, amount } => {
                    let started = sale.vesting_started();
                    let result = sale.buy(
                        &CallContext::at(buyers[who], now),
                        usdt(),
                        buyers[who],
                        amount,
                    );
                    // 5
                    if started {
                        prop_assert!(matches!(result, Err(SaleError::VestingStarted)));
                    }
                }
                Op::Advance(seconds) => {
                    let before: Vec<Amount> = buyers
                        .iter()
                        .map(|b| sale.claimable_of(b, now).unwrap())
                        .collect();
                    now += seconds;
                    // 3
                    for (buyer, earlier) in buyers.iter().zip(before) {
                        prop_assert!(sale.claimable_of(buyer, now).unwrap() >= earlier);
                    }
                }
                Op::Reconfigure { index, extra } => {
                    let result = sale.configure_round(
                        &CallContext::at(owner(), now),
                        index,
                        SUPPLIES[index] + extra,
                        10_000,
                    );
                    if index < cursor_before {
                        prop_assert!(
                            matches!(result, Err(SaleError::IncorrectRound { .. })),
                            "closed round {} was reopened", index
                        );
                    }
                }
                Op::StartVesting => {
                    let started = sale.vesting_started();
                    let result = sale.start_vesting(&CallContext::at(owner(), now));
                    prop_assert_eq!(result.is_ok(), !started);
                }
                Op::Claim { who, mode } => {
                    let recipient = buyers[who];
                    let claimable = sale.claimable_of(&recipient, now).unwrap();
                    let amount = match mode {
                        0 => claimable,
                        1 => claimable / 2,
                        _ => claimable + 1,
                    };
                    let before = sale.accounting_of(&recipient);
                    let result = sale.claim(
                        &CallContext::at(recipient, now),
                        None,
                        recipient,
                        amount,
                    );
                    // 6
                    if amount > claimable {
                        prop_assert!(
                            matches!(result, Err(SaleError::ExceedsClaimable { .. })),
                            "over-claim was accepted"
                        );
                        prop_assert_eq!(sale.accounting_of(&recipient), before);
                    } else {
                        prop_assert!(result.is_ok());
                        prop_assert_eq!(
                            sale.accounting_of(&recipient).claimed,
                            before.claimed + amount
                        );
                    }
                }
            }
            // 4
            prop_assert!(sale.current_sale_info().round >= cursor_before);
            assert_sale_invariants(&sale, &buyers, now);
        }
    }

    #[test]
    fn fuzz_everything_vests_at_horizon(
        amounts in prop::collection::vec(1u128..2_000, 1..6),
        extra in 0u64..1_000,
    ) {
        let mut sale = setup();
        let buyers = buyers();
        for (i, amount) in amounts.into_iter().enumerate() {
            let buyer = buyers[i % buyers.len()];
            // Oversized purchases are rejected; that is fine here.
            let _ = sale.buy(&CallContext::at(buyer, T0), usdt(), buyer, amount);
        }
        if !sale.vesting_started() {
            sale.start_vesting(&CallContext::at(owner(), T0)).unwrap();
        }
        let start = sale.vesting_config().unwrap().start_time;
        // margin + total_rounds * round_duration
        let horizon = start + 100 + 4 * 50 + extra;

        for buyer in &buyers {
            let record = sale.accounting_of(buyer);
            prop_assert_eq!(sale.claimable_of(buyer, horizon).unwrap(), record.bought);
            sale.claim(&CallContext::at(*buyer, horizon), None, *buyer, record.bought)
                .unwrap();
        }
        prop_assert_eq!(sale.outstanding_entitlement(), 0);
        assert_sale_invariants(&sale, &buyers, horizon);
    }
}
