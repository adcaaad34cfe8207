//! Workout phase labeling.
//!
//! Phases are derived on the client from the position of a track in the
//! service's ordering. The list must not be re-sorted before labeling.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Peak,
    Cooldown,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Warmup => "Warm-up",
            Phase::Peak => "Peak",
            Phase::Cooldown => "Cool-down",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Phase band boundaries for a list of `total` tracks: `(warmup_end, peak_end)`.
pub fn boundaries(total: usize) -> (usize, usize) {
    let warmup_end = (total / 5).max(1);
    let peak_end = (total * 4 / 5).max(warmup_end + 1);
    (warmup_end, peak_end)
}

/// Label the track at `index` out of `total`.
///
/// A single track is a warm-up. With two or more tracks the peak band is
/// never empty.
pub fn phase_of(index: usize, total: usize) -> Phase {
    let (warmup_end, peak_end) = boundaries(total);
    if index < warmup_end {
        Phase::Warmup
    } else if index < peak_end {
        Phase::Peak
    } else {
        Phase::Cooldown
    }
}

/// Pair each item with its phase, in the order given.
pub fn label<T>(items: &[T]) -> impl Iterator<Item = (Phase, &T)> {
    let total = items.len();
    items
        .iter()
        .enumerate()
        .map(move |(i, item)| (phase_of(i, total), item))
}
