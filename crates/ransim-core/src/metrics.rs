//! Running aggregation of per-slot samples.

/// Maximum number of trailing samples returned as a history.
pub const HISTORY_WINDOW: usize = 50;

/// An append-only series of per-slot samples.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Series {
    samples: Vec<f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: f64) {
        self.samples.push(sample);
    }

    /// Mean of every sample, or 0.0 for an empty series.
    pub fn mean(&self) -> f64 {
        mean(&self.samples)
    }

    /// The last [`HISTORY_WINDOW`] samples, oldest first.
    pub fn tail(&self) -> Vec<f64> {
        let start = self.samples.len().saturating_sub(HISTORY_WINDOW);
        self.samples[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Extend<f64> for Series {
    fn extend<T: IntoIterator<Item = f64>>(&mut self, iter: T) {
        self.samples.extend(iter)
    }
}

pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// `weight * sample + (1 - weight) * old`
pub fn ewma(weight: f64, sample: f64, old: f64) -> f64 {
    weight * sample + (1.0 - weight) * old
}

/// `numerator / max(denominator, 1) * 100` for event counts.
pub fn percent(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator.max(1) as f64 * 100.0
}

/// `numerator / denominator`, or 0.0 when the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_is_neutral() {
        let s = Series::new();
        assert_eq!(s.mean(), 0.0);
        assert!(s.tail().is_empty());
    }

    #[test]
    fn tail_keeps_most_recent_window() {
        let mut s = Series::new();
        s.extend((0..200).map(f64::from));
        let tail = s.tail();
        assert_eq!(tail.len(), HISTORY_WINDOW);
        assert_eq!(tail[0], 150.0);
        assert_eq!(tail[HISTORY_WINDOW - 1], 199.0);

        let mut short = Series::new();
        short.extend((0..10).map(f64::from));
        assert_eq!(short.tail().len(), 10);
    }

    #[test]
    fn mean_and_ratios() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(percent(1, 4), 25.0);
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert!((ewma(0.1, 20.0, 10.0) - 11.0).abs() < 1e-12);
    }
}
