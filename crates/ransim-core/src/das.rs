//! Delay-aware packet scheduling (DAS).
//!
//! Every user keeps a FIFO queue of packets, each with a delay budget that counts down once
//! per slot. One user is served per slot, chosen by a blend of delay urgency and a
//! proportional-fair channel term weighted by `beta`. With `beta = 0` this is exactly the
//! proportional-fair baseline.

use std::collections::VecDeque;

use log::{debug, info};

use crate::env::Environment;
use crate::metrics::{self, Series};
use crate::types::{ServiceClass, UserId};
use crate::utils;

const USERS_PER_CLASS: usize = 5;
const ARRIVAL_PROBABILITY: f64 = 0.3;
const PACKET_SIZE_RANGE: (f64, f64) = (1.0, 5.0);
const INITIAL_RATE_RANGE: (f64, f64) = (5.0, 20.0);
const INITIAL_AVG_THROUGHPUT: f64 = 10.0;
const THROUGHPUT_EWMA_WEIGHT: f64 = 0.1;
const MIN_AVG_THROUGHPUT: f64 = 0.001;
const CHANNEL_STD_DEV: f64 = 2.0;
const MIN_RATE: f64 = 1.0;

/// Options for a DAS run.
#[derive(Debug, Clone, PartialEq, typed_builder::TypedBuilder)]
pub struct DasOpts {
    /// Weight of the delay-urgency term; `1 - beta` weights the proportional-fair term.
    #[builder(default = 0.7)]
    pub beta: f64,
    /// Number of timeslots to simulate.
    #[builder(default = 100)]
    pub slots: usize,
    /// Number of users.
    #[builder(default = 15)]
    pub users: usize,
    /// Seed for the run's random environment.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

impl Default for DasOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A queued packet.
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Packet {
    /// Payload units.
    pub size: f64,
    /// Slots left before the packet times out.
    pub remaining: i64,
}

/// A packet that left its queue by being served.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Transmission {
    pub user: UserId,
    pub size: f64,
    /// Slots the packet waited, `pdb - remaining` at removal.
    pub delay: i64,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub class: ServiceClass,
    /// Packet delay budget in slots.
    pub pdb: i64,
    /// Instantaneous channel rate.
    pub rate: f64,
    pub avg_throughput: f64,
    pub(crate) queue: VecDeque<Packet>,
    arrivals: u64,
    timeouts: u64,
    delays: Vec<f64>,
}

impl User {
    pub fn new(id: UserId, class: ServiceClass, rate: f64) -> Self {
        Self {
            id,
            class,
            pdb: class.packet_delay_budget(),
            rate,
            avg_throughput: INITIAL_AVG_THROUGHPUT,
            queue: VecDeque::new(),
            arrivals: 0,
            timeouts: 0,
            delays: Vec::new(),
        }
    }

    /// Queued packets, oldest first.
    pub fn queue(&self) -> &VecDeque<Packet> {
        &self.queue
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    pub fn delays(&self) -> &[f64] {
        &self.delays
    }

    /// Queues a packet with a full delay budget.
    pub fn enqueue(&mut self, size: f64) {
        self.queue.push_back(Packet::new(size, self.pdb));
        self.arrivals += 1;
    }

    /// Delay urgency of the buffer: each live packet contributes its share of the buffered
    /// payload times how much of its budget has been used.
    pub fn urgency(&self) -> f64 {
        let total = self.queue.iter().map(|p| p.size).sum::<f64>();
        if total <= 0.0 {
            return 0.0;
        }
        self.queue
            .iter()
            .filter(|p| p.remaining > 0)
            .map(|p| {
                let used = 1.0 - p.remaining as f64 / self.pdb as f64;
                (p.size / total) * used.max(0.0)
            })
            .sum()
    }

    /// Proportional-fair term.
    pub fn fairness(&self) -> f64 {
        self.rate / self.avg_throughput.max(MIN_AVG_THROUGHPUT)
    }

    pub fn priority(&self, beta: f64) -> f64 {
        beta * self.urgency() + (1.0 - beta) * self.fairness()
    }

    fn age(&mut self) {
        for packet in &mut self.queue {
            packet.remaining -= 1;
        }
    }

    /// Serves the head-of-line packet, if any.
    fn transmit(&mut self) -> Option<Transmission> {
        let packet = self.queue.pop_front()?;
        let delay = self.pdb - packet.remaining;
        self.delays.push(delay as f64);
        self.avg_throughput =
            metrics::ewma(THROUGHPUT_EWMA_WEIGHT, packet.size, self.avg_throughput);
        Some(Transmission {
            user: self.id,
            size: packet.size,
            delay,
        })
    }

    /// Drops every packet whose budget is spent and returns how many were dropped.
    fn sweep(&mut self) -> u64 {
        let before = self.queue.len();
        self.queue.retain(|p| p.remaining > 0);
        let expired = (before - self.queue.len()) as u64;
        self.timeouts += expired;
        expired
    }
}

/// Bookkeeping for one simulated slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DasSlot {
    pub slot: usize,
    pub arrivals: usize,
    pub transmission: Option<Transmission>,
    pub timeouts: u64,
    /// Packets queued across all users when the slot started.
    pub queued_before: usize,
    /// Packets queued across all users when the slot ended.
    pub queued_after: usize,
}

/// Aggregate results of a DAS run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DasOutput {
    /// URLLC timeouts per URLLC arrival, in percent.
    pub urllc_timeout_rate: f64,
    /// Mean delay of transmitted URLLC packets, in slots.
    pub avg_urllc_delay: f64,
    /// Mean payload transmitted per slot.
    pub avg_throughput: f64,
    /// Payload transmitted in each of the most recent slots.
    pub throughput_history: Vec<f64>,
}

/// A DAS run in progress.
#[derive(Debug)]
pub struct DasSim {
    beta: f64,
    slots: usize,
    env: Environment,
    users: Vec<User>,
    throughput: Series,
    slot: usize,
}

impl DasSim {
    pub fn new(opts: &DasOpts) -> Self {
        let mut env = Environment::new(opts.seed);
        let users = (0..opts.users)
            .map(|i| {
                let class = ServiceClass::from_index(i, USERS_PER_CLASS);
                let rate = env.uniform(INITIAL_RATE_RANGE.0, INITIAL_RATE_RANGE.1);
                User::new(UserId::new(i), class, rate)
            })
            .collect();
        Self {
            beta: opts.beta,
            slots: opts.slots,
            env,
            users,
            throughput: Series::new(),
            slot: 0,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Total packets queued across all users.
    pub fn queued(&self) -> usize {
        self.users.iter().map(|u| u.queue.len()).sum()
    }

    /// Advances the run by one slot.
    pub fn step(&mut self) -> DasSlot {
        let queued_before = self.queued();

        let mut arrivals = 0;
        for user in &mut self.users {
            if self.env.chance(ARRIVAL_PROBABILITY) {
                let size = self.env.uniform(PACKET_SIZE_RANGE.0, PACKET_SIZE_RANGE.1);
                user.enqueue(size);
                arrivals += 1;
            }
        }

        for user in &mut self.users {
            user.age();
        }

        let beta = self.beta;
        let transmission = utils::first_max(self.users.iter().map(|u| u.priority(beta)))
            .and_then(|winner| self.users[winner].transmit());

        // Sweep after selection so an expiring head-of-line packet can still be served.
        let timeouts = self.users.iter_mut().map(User::sweep).sum::<u64>();

        self.throughput
            .push(transmission.as_ref().map_or(0.0, |t| t.size));

        for user in &mut self.users {
            let step = self.env.normal(0.0, CHANNEL_STD_DEV);
            user.rate = (user.rate + step).max(MIN_RATE);
        }

        let report = DasSlot {
            slot: self.slot,
            arrivals,
            transmission,
            timeouts,
            queued_before,
            queued_after: self.queued(),
        };
        debug!(
            "das slot {}: {} arrivals, {} timeouts, served {:?}",
            report.slot,
            report.arrivals,
            report.timeouts,
            report.transmission.as_ref().map(|t| t.user)
        );
        self.slot += 1;
        report
    }

    /// Runs every remaining slot and aggregates the results.
    pub fn run(mut self) -> DasOutput {
        while self.slot < self.slots {
            self.step();
        }
        self.finish()
    }

    /// Aggregates the slots simulated so far.
    pub fn finish(&self) -> DasOutput {
        let urllc = || self.users.iter().filter(|u| u.class.is_urllc());
        let arrivals = urllc().map(|u| u.arrivals).sum::<u64>();
        let timeouts = urllc().map(|u| u.timeouts).sum::<u64>();
        let delays = urllc()
            .flat_map(|u| u.delays.iter().copied())
            .collect::<Vec<_>>();
        let output = DasOutput {
            urllc_timeout_rate: metrics::percent(timeouts, arrivals),
            avg_urllc_delay: metrics::mean(&delays),
            avg_throughput: self.throughput.mean(),
            throughput_history: self.throughput.tail(),
        };
        info!(
            "das beta={} over {} slots: urllc timeout {:.2}%, urllc delay {:.2}, throughput {:.2}",
            self.beta,
            self.throughput.len(),
            output.urllc_timeout_rate,
            output.avg_urllc_delay,
            output.avg_throughput
        );
        output
    }
}

/// Runs a complete DAS simulation.
pub fn simulate(opts: &DasOpts) -> DasOutput {
    DasSim::new(opts).run()
}

/// The proportional-fair baseline: DAS with `beta = 0`.
pub fn simulate_pf(slots: usize, users: usize, seed: Option<u64>) -> DasOutput {
    let opts = DasOpts {
        beta: 0.0,
        slots,
        users,
        seed,
    };
    simulate(&opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn urgency_weights_packets_by_buffer_share() {
        // Budget 5: a packet with 1 slot left has used 80% of it, a fresh one 0%.
        let user = testing::das_user(ServiceClass::Urllc, &[(2.0, 1), (2.0, 5)]);
        assert!((user.urgency() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn expired_packets_count_toward_buffer_but_not_urgency() {
        let user = testing::das_user(ServiceClass::Urllc, &[(1.0, 0), (3.0, 1)]);
        // Only the live packet contributes: 3/4 * (1 - 1/5).
        assert!((user.urgency() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn empty_buffer_has_no_urgency() {
        let user = testing::das_user(ServiceClass::Embb, &[]);
        assert_eq!(user.urgency(), 0.0);
        assert_eq!(user.priority(1.0), 0.0);
    }

    #[test]
    fn beta_zero_is_proportional_fair() {
        let mut user = testing::das_user(ServiceClass::Mmtc, &[(4.0, 2)]);
        user.rate = 12.0;
        user.avg_throughput = 4.0;
        assert_eq!(user.priority(0.0), 3.0);
    }

    #[test]
    fn fairness_floors_average_throughput() {
        let mut user = testing::das_user(ServiceClass::Embb, &[]);
        user.rate = 2.0;
        user.avg_throughput = 0.0;
        assert!((user.fairness() - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn transmit_serves_oldest_and_updates_average() {
        let mut user = testing::das_user(ServiceClass::Urllc, &[(2.0, 3), (5.0, 4)]);
        let sent = user.transmit().unwrap();
        assert_eq!(sent.size, 2.0);
        assert_eq!(sent.delay, 2);
        assert_eq!(user.delays(), &[2.0]);
        assert!((user.avg_throughput - 9.2).abs() < 1e-12);
        assert_eq!(user.queue().len(), 1);
    }

    #[test]
    fn sweep_drops_spent_packets() {
        let mut user = testing::das_user(ServiceClass::Urllc, &[(1.0, 0), (1.0, -1), (1.0, 2)]);
        assert_eq!(user.sweep(), 2);
        assert_eq!(user.timeouts(), 2);
        assert_eq!(user.queue().len(), 1);
    }

    #[test]
    fn zero_slots_aggregate_to_zero() {
        let out = simulate(&DasOpts::builder().slots(0).seed(1).build());
        assert_eq!(out.urllc_timeout_rate, 0.0);
        assert_eq!(out.avg_urllc_delay, 0.0);
        assert_eq!(out.avg_throughput, 0.0);
        assert!(out.throughput_history.is_empty());
    }

    #[test]
    fn no_users_transmit_nothing() {
        let out = simulate(&DasOpts::builder().users(0).slots(20).seed(1).build());
        assert_eq!(out.avg_throughput, 0.0);
        assert_eq!(out.throughput_history, vec![0.0; 20]);
    }

    #[test]
    fn at_most_one_packet_per_slot() {
        let mut sim = DasSim::new(&DasOpts::builder().slots(100).seed(5).build());
        for _ in 0..100 {
            let slot = sim.step();
            if let Some(t) = &slot.transmission {
                assert!((1.0..5.0).contains(&t.size));
                assert!(t.delay >= 0);
            }
        }
    }
}
