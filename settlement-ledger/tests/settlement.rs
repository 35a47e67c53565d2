// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! End-to-end settlement scenarios across the controller and the custody
//! collaborators.

use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};

use core_types::{AccountId, AssetId, OptionTerms, SECONDS_PER_DAY};
use custody_api::{InMemoryAssetLedger, InMemoryTokenLedger, ManualClock, TokenLedger};
use events::NullSink;
use settlement_ledger::{
    OptionTypeLedger, SettlementConfig, SettlementController, SettlementError,
};

const WETH: AssetId = [0x11; 20];
const USDC: AssetId = [0x22; 20];
const ALICE: AccountId = [0xa1; 20];
const BOB: AccountId = [0xb0; 20];
const CAROL: AccountId = [0xc0; 20];

const T0: i64 = 2_000 * SECONDS_PER_DAY;
const FUNDING: u128 = 10_000_000;

struct Harness {
    clock: Arc<ManualClock>,
    assets: Arc<InMemoryAssetLedger>,
    tokens: Arc<InMemoryTokenLedger>,
    controller: SettlementController,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(T0));
    let assets = Arc::new(InMemoryAssetLedger::new());
    let tokens = Arc::new(InMemoryTokenLedger::new());
    for account in [ALICE, BOB, CAROL] {
        assets.mint(WETH, account, FUNDING);
        assets.mint(USDC, account, FUNDING);
    }
    let controller = SettlementController::new(
        SettlementConfig::default(),
        clock.clone(),
        assets.clone(),
        tokens.clone(),
        Arc::new(NullSink),
    );
    Harness {
        clock,
        assets,
        tokens,
        controller,
    }
}

/// Terms exercisable from creation onward, expiring a month out.
fn open_terms() -> OptionTerms {
    OptionTerms {
        underlying_asset: WETH,
        underlying_amount: 1,
        exercise_asset: USDC,
        exercise_amount: 100,
        exercise_ts: T0,
        expiry_ts: T0 + 30 * SECONDS_PER_DAY,
    }
}

#[test]
fn single_claim_lifecycle_settles_exactly() {
    let hx = harness();
    let option_id = hx.controller.new_option_type(open_terms()).unwrap();
    let lot = hx.controller.write(ALICE, option_id, 10).unwrap();

    let position = hx.controller.position(lot.claim_id).unwrap();
    assert_eq!(position.amount_written, 10);
    assert_eq!(position.amount_exercised, 0);
    assert_eq!(position.amount_unexercised, 10);

    // holder buys 4 contracts worth of options and exercises them
    hx.tokens.burn(ALICE, option_id, 4).unwrap();
    hx.tokens.mint(BOB, option_id, 4);
    hx.controller.exercise(BOB, option_id, 4).unwrap();

    let position = hx.controller.position(lot.claim_id).unwrap();
    assert_eq!(position.amount_exercised, 4);
    assert_eq!(position.amount_unexercised, 6);

    assert_eq!(hx.assets.balance_of(WETH, BOB), FUNDING + 4);
    assert_eq!(hx.assets.balance_of(USDC, BOB), FUNDING - 400);

    hx.clock.set(open_terms().expiry_ts);
    let outcome = hx.controller.redeem(ALICE, lot.claim_id).unwrap();
    assert_eq!(outcome.exercise_amount, 400);
    assert_eq!(outcome.underlying_amount, 6);
    assert_eq!(hx.assets.balance_of(USDC, ALICE), FUNDING + 400);
    assert_eq!(hx.assets.balance_of(WETH, ALICE), FUNDING - 10 + 6);

    // redemption is terminal
    let err = hx.controller.redeem(ALICE, lot.claim_id).unwrap_err();
    assert_eq!(err, SettlementError::TokenNotFound);
    // all custody for this type is settled
    assert_eq!(hx.assets.custodied(WETH), 0);
    assert_eq!(hx.assets.custodied(USDC), 0);
}

#[test]
fn shared_bucket_floor_rounding_leaves_dust_custodied() {
    let hx = harness();
    let option_id = hx.controller.new_option_type(open_terms()).unwrap();

    // day 0: only Alice's first contract exists, so exercising it drains
    // bucket 0 deterministically
    let lot_a = hx.controller.write(ALICE, option_id, 1).unwrap();
    hx.tokens.burn(ALICE, option_id, 1).unwrap();
    hx.tokens.mint(CAROL, option_id, 1);
    hx.controller.exercise(CAROL, option_id, 1).unwrap();

    // day 1: Alice extends her claim and Bob opens his own; both land in
    // bucket 1, which is now the only available bucket
    hx.clock.advance(SECONDS_PER_DAY);
    hx.controller.write(ALICE, lot_a.claim_id, 1).unwrap();
    let lot_b = hx.controller.write(BOB, option_id, 1).unwrap();

    hx.tokens.burn(ALICE, option_id, 1).unwrap();
    hx.tokens.mint(CAROL, option_id, 1);
    hx.controller.exercise(CAROL, option_id, 1).unwrap();

    // bucket 1 holds 2 written / 1 exercised: each 1-contract share floors
    // to zero on both sides of the split
    let position_a = hx.controller.position(lot_a.claim_id).unwrap();
    assert_eq!(position_a.amount_written, 2);
    assert_eq!(position_a.amount_exercised, 1); // bucket 0 was fully assigned
    assert_eq!(position_a.amount_unexercised, 0);

    let position_b = hx.controller.position(lot_b.claim_id).unwrap();
    assert_eq!(position_b.amount_written, 1);
    assert_eq!(position_b.amount_exercised, 0);
    assert_eq!(position_b.amount_unexercised, 0);

    hx.clock.set(open_terms().expiry_ts);
    let outcome_a = hx.controller.redeem(ALICE, lot_a.claim_id).unwrap();
    assert_eq!(outcome_a.exercise_amount, 100);
    assert_eq!(outcome_a.underlying_amount, 0);
    let outcome_b = hx.controller.redeem(BOB, lot_b.claim_id).unwrap();
    assert_eq!(outcome_b.exercise_amount, 0);
    assert_eq!(outcome_b.underlying_amount, 0);

    // the unattributed remainder of bucket 1 stays custodied
    assert_eq!(hx.assets.custodied(WETH), 1);
    assert_eq!(hx.assets.custodied(USDC), 100);
}

#[test]
fn drained_bucket_becomes_assignable_after_same_day_write() {
    let hx = harness();
    let option_id = hx.controller.new_option_type(open_terms()).unwrap();

    hx.controller.write(ALICE, option_id, 2).unwrap();
    hx.controller.exercise(ALICE, option_id, 2).unwrap();

    // the sole bucket is fully consumed; a same-day write must make it
    // selectable again
    let lot_b = hx.controller.write(BOB, option_id, 3).unwrap();
    hx.controller.exercise(BOB, option_id, 2).unwrap();

    let position = hx.controller.position(lot_b.claim_id).unwrap();
    assert_eq!(position.amount_written, 3);
    // bucket totals: 5 written, 4 exercised; Bob's share floors from 3*4/5
    assert_eq!(position.amount_exercised, 2);
    assert_eq!(position.amount_unexercised, 0);
}

#[test]
fn writes_merge_by_day_and_split_across_days() {
    let hx = harness();
    let option_id = hx.controller.new_option_type(open_terms()).unwrap();

    let lot = hx.controller.write(ALICE, option_id, 5).unwrap();
    hx.controller.write(ALICE, lot.claim_id, 5).unwrap();
    let view = hx.controller.claim(lot.claim_id).unwrap();
    assert_eq!(view.position.amount_written, 10);

    hx.clock.advance(SECONDS_PER_DAY);
    hx.controller.write(ALICE, lot.claim_id, 5).unwrap();
    let view = hx.controller.claim(lot.claim_id).unwrap();
    assert_eq!(view.position.amount_written, 15);
}

#[test]
fn randomized_activity_preserves_conservation() {
    let mut rng = StdRng::seed_from_u64(7);
    let terms = open_terms();
    let mut ledger = OptionTypeLedger::new([0x5a; 20], terms);
    let mut claims = Vec::new();
    let mut outstanding = 0u64;

    for day in 0..60u32 {
        for _ in 0..rng.gen_range(0..4) {
            let amount = rng.gen_range(1..50u64);
            if claims.is_empty() || rng.gen_bool(0.5) {
                claims.push(ledger.write_new_claim(amount, day));
            } else {
                let seq = claims[rng.gen_range(0..claims.len())];
                ledger.write_to_claim(seq, amount, day);
            }
            outstanding += amount;
        }
        if outstanding > 0 && rng.gen_bool(0.6) {
            let amount = rng.gen_range(1..=outstanding);
            let taken = ledger.assign_exercise(amount).unwrap();
            assert_eq!(taken.iter().map(|t| t.amount).sum::<u64>(), amount);
            outstanding -= amount;
        }

        // per-bucket conservation: exercised never exceeds written, and
        // claim contributions reconstruct every bucket's written total
        let buckets = ledger.buckets();
        let mut contributed = vec![0u64; buckets.bucket_count()];
        for seq in &claims {
            for entry in ledger.claim_record(*seq).unwrap().entries() {
                contributed[entry.bucket as usize] += entry.amount;
            }
        }
        for (index, bucket) in buckets.buckets().iter().enumerate() {
            assert!(bucket.amount_exercised <= bucket.amount_written);
            assert_eq!(contributed[index], bucket.amount_written);
            assert_eq!(
                buckets.available().contains(index as u32),
                bucket.spare() > 0,
                "availability must track spare capacity"
            );
        }

        // split completeness: shares never exceed the written amount, and
        // the rounding shortfall is bounded by the touched bucket count
        for seq in &claims {
            let record = ledger.claim_record(*seq).unwrap();
            let position = ledger.claim_position(*seq).unwrap();
            let settled = position.amount_exercised + position.amount_unexercised;
            assert!(settled <= position.amount_written);
            assert!(position.amount_written - settled <= record.entries().len() as u64);
            assert_eq!(position.amount_written, record.amount_written());
        }
    }
}
