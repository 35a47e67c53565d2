// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Lot-bucketing and fair-exercise-assignment engine for collateralized
//! options.
//!
//! The crate exposes:
//! - [`SettlementController`]: public surface for creating option types,
//!   writing lots, exercising, and redeeming claims.
//! - [`BucketLedger`] / [`AvailabilitySet`]: day-granularity aggregation of
//!   written lots with O(1) capacity bookkeeping.
//! - [`assign`]: seeded pseudorandom assignment of exercised amounts across
//!   outstanding buckets.
//! - [`claim_position`]: pro-rata exercised/unexercised split for a claim at
//!   any query time.

pub mod assign;
pub mod bucket;
pub mod claim;
pub mod config;
pub mod controller;
pub mod error;
pub mod ledger;
pub mod position;

pub use assign::{assign, next_seed, seed_from_key, AssignError, BucketAssignment};
pub use bucket::{AvailabilitySet, BucketIndex, BucketLedger, DayBucket};
pub use claim::{ClaimIndex, ClaimRecord};
pub use config::SettlementConfig;
pub use controller::{ClaimView, RedeemOutcome, SettlementController, WriteOutcome};
pub use error::{Result, SettlementError};
pub use ledger::OptionTypeLedger;
pub use position::{claim_position, ClaimPosition};
