//! Opportunistic scheduling over EWMA-smoothed channel-quality reports (CSI).
//!
//! Each slot the true CQI of every user drifts, users report a noisy copy of it, and the
//! scheduler only ever sees the smoothed reports. A transmission to the chosen user succeeds
//! with a probability that falls as the smoothed estimate drifts away from the truth.

use log::{debug, info};

use crate::env::Environment;
use crate::metrics::{self, Series};
use crate::types::{Mobility, UserId};
use crate::utils;

const HIGH_MOBILITY_USERS: usize = 5;
const INITIAL_CQI: f64 = 10.0;
const INITIAL_AVG_THROUGHPUT: f64 = 5.0;
const MIN_CQI: f64 = 1.0;
const MIN_AVG_THROUGHPUT: f64 = 0.1;
const THROUGHPUT_EWMA_WEIGHT: f64 = 0.1;
const MIN_SUCCESS_PROBABILITY: f64 = 0.5;
const ERROR_SCALE: f64 = 10.0;

/// Options for a CSI run.
#[derive(Debug, Clone, PartialEq, typed_builder::TypedBuilder)]
pub struct CsiOpts {
    /// Weight of the newest report in the smoothed CQI.
    #[builder(default = 0.2)]
    pub alpha: f64,
    #[builder(default = 100)]
    pub slots: usize,
    #[builder(default = 15)]
    pub users: usize,
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

impl Default for CsiOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct CsiUser {
    pub id: UserId,
    pub mobility: Mobility,
    pub true_cqi: f64,
    pub reported_cqi: f64,
    pub smoothed_cqi: f64,
    pub avg_throughput: f64,
    pub successful_tx: u64,
    pub retransmissions: u64,
}

impl CsiUser {
    pub fn new(id: UserId, mobility: Mobility) -> Self {
        Self {
            id,
            mobility,
            true_cqi: INITIAL_CQI,
            reported_cqi: INITIAL_CQI,
            smoothed_cqi: INITIAL_CQI,
            avg_throughput: INITIAL_AVG_THROUGHPUT,
            successful_tx: 0,
            retransmissions: 0,
        }
    }

    fn observe(&mut self, alpha: f64, env: &mut Environment) {
        let drift = env.normal(0.0, self.mobility.channel_std_dev());
        self.true_cqi = (self.true_cqi + drift).max(MIN_CQI);
        let noise = env.normal(0.0, self.mobility.report_noise_std_dev());
        self.reported_cqi = (self.true_cqi + noise).max(MIN_CQI);
        self.smoothed_cqi = metrics::ewma(alpha, self.reported_cqi, self.smoothed_cqi);
    }

    pub fn metric(&self) -> f64 {
        self.smoothed_cqi / self.avg_throughput.max(MIN_AVG_THROUGHPUT)
    }

    /// Probability that a transmission sized from the smoothed CQI gets through.
    pub fn success_probability(&self) -> f64 {
        let error = (self.smoothed_cqi - self.true_cqi).abs();
        (1.0 - error / ERROR_SCALE).max(MIN_SUCCESS_PROBABILITY)
    }

    fn record(&mut self, success: bool) {
        if success {
            self.successful_tx += 1;
            self.avg_throughput =
                metrics::ewma(THROUGHPUT_EWMA_WEIGHT, self.smoothed_cqi, self.avg_throughput);
        } else {
            self.retransmissions += 1;
        }
    }
}

/// Bookkeeping for one simulated slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CsiSlot {
    pub slot: usize,
    pub selected: Option<UserId>,
    pub success: bool,
    /// Retransmissions over all attempts so far, in percent. Cumulative over the run.
    pub retransmission_rate: f64,
    /// Mean smoothed CQI across users.
    pub spectral_efficiency: f64,
}

/// Aggregate results of a CSI run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CsiOutput {
    pub spectral_efficiency: f64,
    pub retransmission_rate: f64,
    pub se_history: Vec<f64>,
    pub retrans_history: Vec<f64>,
}

/// A CSI run in progress.
#[derive(Debug)]
pub struct CsiSim {
    alpha: f64,
    slots: usize,
    env: Environment,
    users: Vec<CsiUser>,
    spectral_efficiency: Series,
    retransmission_rate: Series,
    slot: usize,
}

impl CsiSim {
    pub fn new(opts: &CsiOpts) -> Self {
        let users = (0..opts.users)
            .map(|i| {
                let mobility = if i < HIGH_MOBILITY_USERS {
                    Mobility::High
                } else {
                    Mobility::Low
                };
                CsiUser::new(UserId::new(i), mobility)
            })
            .collect();
        Self {
            alpha: opts.alpha,
            slots: opts.slots,
            env: Environment::new(opts.seed),
            users,
            spectral_efficiency: Series::new(),
            retransmission_rate: Series::new(),
            slot: 0,
        }
    }

    pub fn users(&self) -> &[CsiUser] {
        &self.users
    }

    pub fn step(&mut self) -> CsiSlot {
        for user in &mut self.users {
            user.observe(self.alpha, &mut self.env);
        }

        let mut selected = None;
        let mut success = false;
        if let Some(winner) = utils::first_max(self.users.iter().map(CsiUser::metric)) {
            let user = &mut self.users[winner];
            success = self.env.chance(user.success_probability());
            user.record(success);
            selected = Some(user.id);
        }

        let retransmissions = self.users.iter().map(|u| u.retransmissions).sum::<u64>();
        let attempts = self
            .users
            .iter()
            .map(|u| u.successful_tx + u.retransmissions)
            .sum::<u64>();
        let retransmission_rate = metrics::percent(retransmissions, attempts);
        let smoothed = self.users.iter().map(|u| u.smoothed_cqi).collect::<Vec<_>>();
        let spectral_efficiency = metrics::mean(&smoothed);
        self.retransmission_rate.push(retransmission_rate);
        self.spectral_efficiency.push(spectral_efficiency);

        let report = CsiSlot {
            slot: self.slot,
            selected,
            success,
            retransmission_rate,
            spectral_efficiency,
        };
        debug!(
            "csi slot {}: served {:?} (success: {}), se {:.3}, retx {:.2}%",
            report.slot, report.selected, report.success, spectral_efficiency, retransmission_rate
        );
        self.slot += 1;
        report
    }

    pub fn run(mut self) -> CsiOutput {
        while self.slot < self.slots {
            self.step();
        }
        self.finish()
    }

    pub fn finish(&self) -> CsiOutput {
        let output = CsiOutput {
            spectral_efficiency: self.spectral_efficiency.mean(),
            retransmission_rate: self.retransmission_rate.mean(),
            se_history: self.spectral_efficiency.tail(),
            retrans_history: self.retransmission_rate.tail(),
        };
        info!(
            "csi alpha={} over {} slots: se {:.3}, retx {:.2}%",
            self.alpha,
            self.spectral_efficiency.len(),
            output.spectral_efficiency,
            output.retransmission_rate
        );
        output
    }
}

/// Runs a complete CSI simulation.
pub fn simulate(opts: &CsiOpts) -> CsiOutput {
    CsiSim::new(opts).run()
}
