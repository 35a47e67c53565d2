use serde::{Deserialize, Serialize};

use crate::bucket::BucketLedger;
use crate::claim::ClaimIndex;

/// Contract-count split of a claim between assigned and unassigned
/// collateral at some query time.
///
/// Shares use floor division per bucket, so `amount_exercised +
/// amount_unexercised` can fall short of `amount_written` by at most one
/// contract per bucket the claim touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPosition {
    pub amount_written: u64,
    pub amount_exercised: u64,
    pub amount_unexercised: u64,
}

/// Pro-rata split for a claim's index entries against current bucket state.
///
/// Every claim contributing to a bucket absorbs that bucket's assignment in
/// proportion to its contribution, regardless of when within the bucket's
/// day it wrote.
pub fn claim_position(buckets: &BucketLedger, entries: &[ClaimIndex]) -> ClaimPosition {
    let mut position = ClaimPosition::default();
    for entry in entries {
        let bucket = buckets.bucket(entry.bucket);
        position.amount_written += entry.amount;
        position.amount_exercised += pro_rata(bucket.amount_exercised, entry.amount, bucket.amount_written);
        position.amount_unexercised += pro_rata(
            bucket.amount_written - bucket.amount_exercised,
            entry.amount,
            bucket.amount_written,
        );
    }
    position
}

fn pro_rata(part: u64, weight: u64, total: u64) -> u64 {
    debug_assert!(total > 0, "buckets always carry written amount");
    ((part as u128 * weight as u128) / total as u128) as u64
}
