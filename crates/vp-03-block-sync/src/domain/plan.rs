//! # Batch Planning
//!
//! Splits the missing height range `[start, latest]` into consecutive
//! batches of at most `batch_size` heights.

use std::ops::RangeInclusive;

use shared_types::Height;

/// First height a pass should fetch, or `None` when nothing is missing.
///
/// An empty store starts at `initial_height`.
pub fn first_missing_height(
    persisted: Option<Height>,
    latest: Height,
    initial_height: Height,
) -> Option<Height> {
    let start = match persisted {
        Some(h) => h.checked_add(1)?,
        None => initial_height,
    };
    (start <= latest).then_some(start)
}

/// Consecutive, ascending batches covering `[start, latest]` exactly.
pub fn plan_batches(
    start: Height,
    latest: Height,
    batch_size: usize,
) -> Vec<RangeInclusive<Height>> {
    let step = batch_size.max(1) as u64;
    let mut batches = Vec::new();
    let mut from = start;

    while from <= latest {
        let to = from.saturating_add(step - 1).min(latest);
        batches.push(from..=to);
        match to.checked_add(1) {
            Some(next) => from = next,
            None => break,
        }
    }
    batches
}
