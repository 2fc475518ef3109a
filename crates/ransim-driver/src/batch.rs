//! Paired batches of clustered and flat fragmentation runs.

use log::info;
use rayon::prelude::*;
use ransim_core::metrics;

use crate::simulate_frag;

/// Aggregate of `runs` paired FRAG runs. Run `i` uses seed `base_seed + i` for both modes.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClusteringBatch {
    pub runs: usize,
    /// Mean spectrum utilization with proximity clustering.
    pub clustered_utilization: f64,
    /// Mean spectrum utilization with per-fragment allocation.
    pub flat_utilization: f64,
    /// Runs where clustering did at least as well as the flat allocation.
    pub not_worse: usize,
}

impl ClusteringBatch {
    /// Whether clustering did no worse than flat allocation on average.
    pub fn holds(&self) -> bool {
        self.clustered_utilization >= self.flat_utilization
    }
}

pub fn clustering_batch(runs: usize, slots: usize, base_seed: u64) -> ClusteringBatch {
    let pairs = (0..runs)
        .into_par_iter()
        .map(|i| {
            let seed = Some(base_seed.wrapping_add(i as u64));
            let clustered = simulate_frag(true, slots, seed).spectrum_utilization;
            let flat = simulate_frag(false, slots, seed).spectrum_utilization;
            (clustered, flat)
        })
        .collect::<Vec<_>>();
    let (clustered, flat): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
    let not_worse = pairs.iter().filter(|(c, f)| c >= f).count();
    let batch = ClusteringBatch {
        runs,
        clustered_utilization: metrics::mean(&clustered),
        flat_utilization: metrics::mean(&flat),
        not_worse,
    };
    info!(
        "Clustering batch of {runs}: {:.2}% clustered vs {:.2}% flat",
        batch.clustered_utilization, batch.flat_utilization
    );
    batch
}
