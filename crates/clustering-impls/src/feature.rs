//! Fragment features and closeness predicates for [`GreedyClustering`](crate::GreedyClustering).

use ransim_core::{frag::Fragment, units::Frequency};

/// Fragments whose center frequencies differ by less than this are adjacent.
pub const PROXIMITY_THRESHOLD: Frequency = Frequency::new(150);

/// The fragment's center frequency.
pub fn center_freq(fragment: &Fragment) -> Frequency {
    fragment.center_freq
}

/// A predicate that holds when two frequencies are strictly closer than `threshold`.
pub fn within(threshold: Frequency) -> impl Fn(&Frequency, &Frequency) -> bool + Copy {
    move |a, b| a.distance(*b) < threshold
}
