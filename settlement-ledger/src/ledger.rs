use std::collections::HashMap;

use core_types::{ClaimSeq, DayIndex, OptionKey, OptionTerms};

use crate::assign::{assign, seed_from_key, AssignError, BucketAssignment};
use crate::bucket::BucketLedger;
use crate::claim::{ClaimIndex, ClaimRecord};
use crate::position::{claim_position, ClaimPosition};

/// Mutable settlement state for one option type: the day buckets, every
/// live claim's index entries, the evolving settlement seed, and the claim
/// sequence allocator. Owned by the controller, one instance per option
/// key, mutated only under that key's lock.
#[derive(Clone, Debug)]
pub struct OptionTypeLedger {
    terms: OptionTerms,
    settlement_seed: u64,
    next_claim_seq: ClaimSeq,
    buckets: BucketLedger,
    claims: HashMap<ClaimSeq, ClaimRecord>,
}

impl OptionTypeLedger {
    pub fn new(key: OptionKey, terms: OptionTerms) -> Self {
        Self {
            terms,
            settlement_seed: seed_from_key(&key),
            next_claim_seq: 1,
            buckets: BucketLedger::default(),
            claims: HashMap::new(),
        }
    }

    pub fn terms(&self) -> &OptionTerms {
        &self.terms
    }

    pub fn buckets(&self) -> &BucketLedger {
        &self.buckets
    }

    pub fn settlement_seed(&self) -> u64 {
        self.settlement_seed
    }

    /// Opens a new claim absorbing a write of `amount` on `today`.
    pub fn write_new_claim(&mut self, amount: u64, today: DayIndex) -> ClaimSeq {
        let seq = self.next_claim_seq;
        self.next_claim_seq += 1;
        let bucket = self.buckets.record_write(amount, today);
        self.claims.entry(seq).or_default().record(bucket, amount);
        seq
    }

    /// Adds a write to an existing live claim. Callers resolve claim
    /// liveness first; an unknown sequence here is an internal defect.
    pub fn write_to_claim(&mut self, seq: ClaimSeq, amount: u64, today: DayIndex) {
        let bucket = self.buckets.record_write(amount, today);
        let Some(record) = self.claims.get_mut(&seq) else {
            panic!("write into unknown claim {seq}");
        };
        record.record(bucket, amount);
    }

    /// Runs one assignment pass over the availability set.
    pub fn assign_exercise(&mut self, amount: u64) -> Result<Vec<BucketAssignment>, AssignError> {
        assign(&mut self.buckets, &mut self.settlement_seed, amount)
    }

    pub fn claim_record(&self, seq: ClaimSeq) -> Option<&ClaimRecord> {
        self.claims.get(&seq)
    }

    pub fn claim_is_live(&self, seq: ClaimSeq) -> bool {
        self.claims
            .get(&seq)
            .map_or(false, |record| !record.is_drained())
    }

    /// Current split for a live claim; `None` once drained or unknown.
    pub fn claim_position(&self, seq: ClaimSeq) -> Option<ClaimPosition> {
        let record = self.claims.get(&seq)?;
        if record.is_drained() {
            return None;
        }
        Some(claim_position(&self.buckets, record.entries()))
    }

    /// Terminally retires a claim, returning its drained entries.
    pub fn drain_claim(&mut self, seq: ClaimSeq) -> Vec<ClaimIndex> {
        self.claims
            .get_mut(&seq)
            .map(|record| record.drain())
            .unwrap_or_default()
    }
}
