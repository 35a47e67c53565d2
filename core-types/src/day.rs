// Copyright (c) James Kassemi, SC, US. All rights reserved.

pub type DayIndex = u32;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Calendar-day bucket index for a unix timestamp.
///
/// Timestamps are expected at or after the epoch; the settlement entry
/// points validate time ordering before any day math runs.
pub fn day_index(ts: i64) -> DayIndex {
    debug_assert!(ts >= 0, "timestamp before epoch: {ts}");
    (ts / SECONDS_PER_DAY) as DayIndex
}
