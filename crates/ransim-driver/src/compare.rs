//! Side-by-side comparisons of a policy against its baseline.

use ransim_core::{
    das::{self, DasOutput},
    frag::FragOutput,
    metrics,
};

use crate::{scenario::DasRequest, simulate_frag, Error, Scenario};

/// `(baseline - candidate) / baseline` in percent; 0 for a zero baseline.
fn reduction(baseline: f64, candidate: f64) -> f64 {
    metrics::safe_ratio(baseline - candidate, baseline) * 100.0
}

/// `(candidate - baseline) / baseline` in percent; 0 for a zero baseline.
fn gain(baseline: f64, candidate: f64) -> f64 {
    metrics::safe_ratio(candidate - baseline, baseline) * 100.0
}

/// A DAS run against the proportional-fair baseline.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DasComparison {
    pub baseline: DasOutput,
    pub candidate: DasOutput,
    /// Reduction of the URLLC timeout rate relative to the baseline, in percent.
    pub timeout_reduction: f64,
    /// Reduction of the mean URLLC delay relative to the baseline, in percent.
    pub delay_reduction: f64,
}

impl DasComparison {
    pub fn new(baseline: DasOutput, candidate: DasOutput) -> Self {
        let timeout_reduction =
            reduction(baseline.urllc_timeout_rate, candidate.urllc_timeout_rate);
        let delay_reduction = reduction(baseline.avg_urllc_delay, candidate.avg_urllc_delay);
        Self {
            baseline,
            candidate,
            timeout_reduction,
            delay_reduction,
        }
    }
}

/// Runs the request and the PF baseline with the same slots, users and seed. Without a seed
/// the two runs draw independent traffic.
pub fn compare_das(req: &DasRequest) -> Result<DasComparison, Error> {
    Scenario::Das(req.clone()).validate()?;
    let baseline = das::simulate_pf(req.num_slots, req.num_users, req.seed);
    let candidate = das::simulate(&req.into());
    Ok(DasComparison::new(baseline, candidate))
}

/// Clustered allocation against flat per-fragment allocation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FragComparison {
    pub baseline: FragOutput,
    pub candidate: FragOutput,
    /// Utilization gain over the baseline, in percent of the baseline.
    pub utilization_gain: f64,
    /// Throughput gain over the baseline, in percent of the baseline.
    pub throughput_gain: f64,
}

impl FragComparison {
    pub fn new(baseline: FragOutput, candidate: FragOutput) -> Self {
        let utilization_gain = gain(
            baseline.spectrum_utilization,
            candidate.spectrum_utilization,
        );
        let throughput_gain = gain(baseline.avg_throughput, candidate.avg_throughput);
        Self {
            baseline,
            candidate,
            utilization_gain,
            throughput_gain,
        }
    }
}

pub fn compare_frag(slots: usize, seed: Option<u64>) -> FragComparison {
    let baseline = simulate_frag(false, slots, seed);
    let candidate = simulate_frag(true, slots, seed);
    FragComparison::new(baseline, candidate)
}

/// How strongly a CSI `alpha` smooths the channel reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingRegime {
    /// `alpha < 0.15`: stable but slow to follow the channel.
    Heavy,
    /// `0.15 <= alpha < 0.3`.
    Balanced,
    /// `alpha >= 0.3`: responsive but exposed to report noise.
    Responsive,
}

impl SmoothingRegime {
    pub fn from_alpha(alpha: f64) -> Self {
        if alpha < 0.15 {
            SmoothingRegime::Heavy
        } else if alpha < 0.3 {
            SmoothingRegime::Balanced
        } else {
            SmoothingRegime::Responsive
        }
    }
}

impl std::fmt::Display for SmoothingRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SmoothingRegime::Heavy => "heavy smoothing: stable, slow to adapt",
            SmoothingRegime::Balanced => "balanced smoothing",
            SmoothingRegime::Responsive => "light smoothing: responsive, noise-prone",
        };
        f.write_str(text)
    }
}
