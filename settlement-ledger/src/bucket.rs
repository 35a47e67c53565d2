use std::collections::{hash_map::Entry, HashMap};

use core_types::DayIndex;

pub type BucketIndex = u32;

/// Aggregate of every lot written on one calendar day for one option type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayBucket {
    pub amount_written: u64,
    pub amount_exercised: u64,
    pub day: DayIndex,
}

impl DayBucket {
    /// Capacity still assignable from this bucket.
    pub fn spare(&self) -> u64 {
        self.amount_written - self.amount_exercised
    }
}

/// Bucket indices with spare capacity, order-unstable.
///
/// A side table maps each member to its current slot so membership tests,
/// insertion, and swap-with-last removal all stay O(1). Invariant: a bucket
/// index is a member iff its bucket has `amount_written > amount_exercised`.
#[derive(Clone, Debug, Default)]
pub struct AvailabilitySet {
    slots: Vec<BucketIndex>,
    positions: HashMap<BucketIndex, usize>,
}

impl AvailabilitySet {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, bucket: BucketIndex) -> bool {
        self.positions.contains_key(&bucket)
    }

    /// Member currently occupying `slot`.
    pub fn get(&self, slot: usize) -> BucketIndex {
        self.slots[slot]
    }

    pub fn as_slice(&self) -> &[BucketIndex] {
        &self.slots
    }

    /// Adds a bucket index; a no-op when it is already a member.
    pub fn insert(&mut self, bucket: BucketIndex) {
        if let Entry::Vacant(entry) = self.positions.entry(bucket) {
            entry.insert(self.slots.len());
            self.slots.push(bucket);
        }
    }

    /// Removes and returns the member at `slot` by swapping in the last
    /// member; the vacated slot is then occupied by the swapped element.
    pub fn remove_slot(&mut self, slot: usize) -> BucketIndex {
        let bucket = self.slots.swap_remove(slot);
        self.positions.remove(&bucket);
        if let Some(&moved) = self.slots.get(slot) {
            self.positions.insert(moved, slot);
        }
        bucket
    }
}

/// Append-only day-bucket sequence for one option type, plus its
/// availability set.
#[derive(Clone, Debug, Default)]
pub struct BucketLedger {
    buckets: Vec<DayBucket>,
    available: AvailabilitySet,
}

impl BucketLedger {
    /// Absorbs a write of `amount` contracts on day `today` and returns the
    /// index of the bucket that took it.
    ///
    /// Opens a new bucket on the first write of a new day; later writes on
    /// the same day merge into the open bucket. Either way the absorbing
    /// bucket regains availability if assignment had drained it.
    pub fn record_write(&mut self, amount: u64, today: DayIndex) -> BucketIndex {
        debug_assert!(amount > 0, "bucket writes must be nonzero");
        let index = match self.buckets.last_mut() {
            Some(last) if last.day >= today => {
                last.amount_written += amount;
                (self.buckets.len() - 1) as BucketIndex
            }
            _ => {
                self.buckets.push(DayBucket {
                    amount_written: amount,
                    amount_exercised: 0,
                    day: today,
                });
                (self.buckets.len() - 1) as BucketIndex
            }
        };
        self.available.insert(index);
        index
    }

    pub fn bucket(&self, index: BucketIndex) -> &DayBucket {
        &self.buckets[index as usize]
    }

    pub(crate) fn bucket_mut(&mut self, index: BucketIndex) -> &mut DayBucket {
        &mut self.buckets[index as usize]
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn available(&self) -> &AvailabilitySet {
        &self.available
    }

    pub(crate) fn remove_available_slot(&mut self, slot: usize) -> BucketIndex {
        self.available.remove_slot(slot)
    }
}
