//! Price-level bookkeeping shared by add, cancel and sequence resolution.
//!
//! # Invariant
//!
//! A level exists in a side's map if and only if `size > 0` and `count > 0`.
//! Levels are deleted the instant either total drops to zero or below; they
//! never linger at zero. The totals are kept signed internally so the update
//! primitive can apply decreasing deltas and test the result, but a level
//! that survives an update always has strictly positive totals.

use std::collections::BTreeMap;

/// Running totals for one price level on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTotals {
    /// Sum of live order sizes at this price
    pub size: i64,
    /// Number of live orders at this price
    pub count: i32,
}

/// Apply signed deltas to the level at `price`, creating or deleting it as
/// the totals demand.
///
/// - Existing level: both deltas are applied; the level is deleted if either
///   resulting total is `<= 0`.
/// - Absent level: inserted only when both deltas are positive; a
///   non-positive delta against an absent level is a no-op.
///
/// The guard means the map never exposes a level with non-positive totals,
/// even when called with decreasing deltas against a just-created level.
#[inline]
pub fn update_price_level(
    levels: &mut BTreeMap<i64, LevelTotals>,
    price: i64,
    size_delta: i64,
    count_delta: i32,
) {
    match levels.get_mut(&price) {
        Some(level) => {
            level.size += size_delta;
            level.count += count_delta;
            if level.size <= 0 || level.count <= 0 {
                levels.remove(&price);
            }
        }
        None => {
            if size_delta > 0 && count_delta > 0 {
                levels.insert(
                    price,
                    LevelTotals {
                        size: size_delta,
                        count: count_delta,
                    },
                );
            }
        }
    }
}
