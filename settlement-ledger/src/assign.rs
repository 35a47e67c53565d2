//! Pseudorandom assignment of exercised amounts across day buckets.
//!
//! The starting cursor for each pass is the evolving settlement seed
//! reduced modulo the availability set size, so no bucket is structurally
//! favored by submission order, yet the whole sequence is deterministic
//! and replayable from the option type's initial seed.

use blake3::Hasher;
use thiserror::Error;

use core_types::OptionKey;

use crate::bucket::{BucketIndex, BucketLedger};

const SEED_DOMAIN: &[u8] = b"settlement_seed.v1";

/// Amount taken from one bucket by a single assignment pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketAssignment {
    pub bucket: BucketIndex,
    pub amount: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignError {
    #[error("no available bucket capacity with {remaining} contracts unassigned")]
    CapacityExhausted { remaining: u64 },
}

/// Initial settlement seed for an option type, taken from its key so the
/// very first assignment already differs across types.
pub fn seed_from_key(key: &OptionKey) -> u64 {
    u64::from_le_bytes(key[..8].try_into().unwrap())
}

/// Mixes the seed with the final cursor of an assignment pass, making the
/// next pass's starting point depend on all prior exercise activity.
pub fn next_seed(seed: u64, cursor: u64) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(&(SEED_DOMAIN.len() as u32).to_le_bytes());
    hasher.update(SEED_DOMAIN);
    hasher.update(&seed.to_le_bytes());
    hasher.update(&cursor.to_le_bytes());
    u64::from_le_bytes(hasher.finalize().as_bytes()[..8].try_into().unwrap())
}

/// Consumes `amount` contracts of spare bucket capacity, starting at the
/// seed-selected cursor and advancing only by draining buckets out of the
/// availability set (swap-removal re-fills the cursor slot; draining the
/// tail slot wraps to the front).
///
/// Returns the per-bucket amounts taken. Runs out of capacity only when
/// upstream outstanding-supply accounting was violated; such a failure can
/// leave partial consumption behind, and callers recover by restoring
/// their checkpoint of the ledger.
pub fn assign(
    buckets: &mut BucketLedger,
    seed: &mut u64,
    amount: u64,
) -> Result<Vec<BucketAssignment>, AssignError> {
    debug_assert!(amount > 0, "assignment amount must be nonzero");
    let mut remaining = amount;
    let width = buckets.available().len();
    if width == 0 {
        return Err(AssignError::CapacityExhausted { remaining });
    }
    let mut cursor = (*seed % width as u64) as usize;
    let mut taken = Vec::new();
    while remaining > 0 {
        let width = buckets.available().len();
        if width == 0 {
            return Err(AssignError::CapacityExhausted { remaining });
        }
        if cursor >= width {
            cursor = 0;
        }
        let index = buckets.available().get(cursor);
        let bucket = buckets.bucket_mut(index);
        let spare = bucket.spare();
        let take = remaining.min(spare);
        bucket.amount_exercised += take;
        remaining -= take;
        taken.push(BucketAssignment {
            bucket: index,
            amount: take,
        });
        if take == spare {
            buckets.remove_available_slot(cursor);
        }
    }
    *seed = next_seed(*seed, cursor as u64);
    Ok(taken)
}
