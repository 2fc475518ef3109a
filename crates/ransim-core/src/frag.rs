//! Fragmentation-aware multi-resource allocation (FRAG).
//!
//! Spectrum is split into a few fragments of fixed nominal capacity. Every slot a fresh
//! population of users with class-dependent demands and deadlines is ranked by a weighted
//! urgency score and greedily filled from the fragments, visiting them cluster by cluster.
//! Capacity is slot-scoped: it is consumed during a slot and restored when the slot ends.

use std::ops::Range;

use log::{debug, info};

use crate::cluster::{Cluster, ClusteringAlgo};
use crate::env::Environment;
use crate::metrics::{self, Series};
use crate::types::{FragmentId, ServiceClass, UserId};
use crate::units::{Bandwidth, Frequency};

/// Users of each service class generated per slot.
pub const USERS_PER_CLASS: usize = 4;
const NR_USERS: usize = 3 * USERS_PER_CLASS;

/// A block of spectrum that can be allocated independently.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Fragment {
    pub id: FragmentId,
    /// Capacity restored at the end of every slot.
    pub nominal: Bandwidth,
    /// Capacity still available in the current slot.
    pub capacity: Bandwidth,
    pub center_freq: Frequency,
}

impl Fragment {
    pub fn new(id: FragmentId, nominal: Bandwidth, center_freq: Frequency) -> Self {
        Self {
            id,
            nominal,
            capacity: nominal,
            center_freq,
        }
    }

    /// Takes up to `want` units and returns how much was granted.
    pub fn consume(&mut self, want: Bandwidth) -> Bandwidth {
        let granted = std::cmp::min(want, self.capacity);
        self.capacity -= granted;
        granted
    }

    /// Capacity used so far in the current slot.
    pub fn consumed(&self) -> Bandwidth {
        self.nominal.saturating_sub(self.capacity)
    }

    pub fn reset(&mut self) {
        self.capacity = self.nominal;
    }
}

/// The four fragments of the reference band plan.
pub fn default_fragments() -> Vec<Fragment> {
    [(50, 3500), (40, 3600), (30, 3800), (35, 2600)]
        .into_iter()
        .enumerate()
        .map(|(i, (capacity, freq))| {
            Fragment::new(
                FragmentId::new(i),
                Bandwidth::new(capacity),
                Frequency::new(freq),
            )
        })
        .collect()
}

/// Demand a user of `class` draws from, in bandwidth units.
pub fn demand_range(class: ServiceClass) -> Range<u64> {
    match class {
        ServiceClass::Urllc => 5..15,
        ServiceClass::Embb => 15..30,
        ServiceClass::Mmtc => 3..10,
    }
}

/// Deadline a user of `class` draws from, in slots.
pub fn deadline_range(class: ServiceClass) -> Range<u64> {
    match class {
        ServiceClass::Urllc => 3..6,
        ServiceClass::Embb => 10..20,
        ServiceClass::Mmtc => 30..50,
    }
}

/// A user that exists for a single slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FragUser {
    pub id: UserId,
    pub class: ServiceClass,
    pub demand: Bandwidth,
    /// Deadline in slots.
    pub deadline: u64,
    pub weight: f64,
    pub allocated: Bandwidth,
}

impl FragUser {
    pub fn new(id: UserId, class: ServiceClass, demand: Bandwidth, deadline: u64) -> Self {
        Self {
            id,
            class,
            demand,
            deadline,
            weight: class.weight(),
            allocated: Bandwidth::ZERO,
        }
    }

    /// Draws a demand and then a deadline from the class's ranges.
    pub fn generate(id: UserId, class: ServiceClass, env: &mut Environment) -> Self {
        let demand = Bandwidth::new(env.int_range(demand_range(class)));
        let deadline = env.int_range(deadline_range(class));
        Self::new(id, class, demand, deadline)
    }

    /// Weighted deadline urgency plus a fairness bonus that shrinks with what the user has
    /// already been granted.
    pub fn score(&self) -> f64 {
        self.weight * (1.0 / self.deadline as f64) + 1.0 / (self.allocated.into_f64() + 1.0)
    }

    pub fn remaining(&self) -> Bandwidth {
        self.demand.saturating_sub(self.allocated)
    }

    pub fn is_satisfied(&self) -> bool {
        self.allocated >= self.demand
    }
}

/// Orders users by descending score. The sort is stable, so equal scores keep their order.
pub fn rank(users: &mut [FragUser]) {
    users.sort_by(|a, b| b.score().total_cmp(&a.score()));
}

/// Greedily fills each user, in order, from the fragments of each cluster in turn. Returns the
/// total granted.
pub fn allocate(
    users: &mut [FragUser],
    fragments: &mut [Fragment],
    clusters: &[Cluster],
) -> Bandwidth {
    let mut total = Bandwidth::ZERO;
    for user in users.iter_mut() {
        'clusters: for cluster in clusters {
            for id in cluster.members() {
                if user.remaining() == Bandwidth::ZERO {
                    break 'clusters;
                }
                let Some(fragment) = fragments.iter_mut().find(|f| f.id == *id) else {
                    continue;
                };
                let granted = fragment.consume(user.remaining());
                user.allocated += granted;
                total += granted;
            }
        }
    }
    total
}

/// Share of URLLC users whose demand was fully met, in percent. 100 when there are none.
pub fn urllc_compliance(users: &[FragUser]) -> f64 {
    let urllc = users.iter().filter(|u| u.class.is_urllc()).collect::<Vec<_>>();
    if urllc.is_empty() {
        return 100.0;
    }
    let met = urllc.iter().filter(|u| u.is_satisfied()).count();
    met as f64 / urllc.len() as f64 * 100.0
}

/// Options for a FRAG run.
#[derive(Debug, Clone, PartialEq, typed_builder::TypedBuilder)]
pub struct FragOpts {
    #[builder(default = 100)]
    pub slots: usize,
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
    #[builder(default = default_fragments())]
    pub fragments: Vec<Fragment>,
}

impl Default for FragOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Bookkeeping for one simulated slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FragSlot {
    pub slot: usize,
    /// Users in allocation order, with what each was granted.
    pub users: Vec<FragUser>,
    pub total_allocated: Bandwidth,
    /// Capacity taken out of the fragments before they were reset.
    pub consumed: Bandwidth,
    pub utilization: f64,
    pub urllc_compliance: f64,
    pub nr_clusters: usize,
}

/// Aggregate results of a FRAG run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FragOutput {
    pub spectrum_utilization: f64,
    pub avg_throughput: f64,
    pub urllc_compliance: f64,
    pub util_history: Vec<f64>,
    pub throughput_history: Vec<f64>,
}

/// A FRAG run in progress.
#[derive(Debug)]
pub struct FragSim<C> {
    slots: usize,
    env: Environment,
    fragments: Vec<Fragment>,
    nominal_total: Bandwidth,
    clustering: C,
    utilization: Series,
    throughput: Series,
    compliance: Series,
    slot: usize,
}

impl<C: ClusteringAlgo> FragSim<C> {
    pub fn new(opts: &FragOpts, clustering: C) -> Self {
        let fragments = opts.fragments.clone();
        let nominal_total = fragments.iter().map(|f| f.nominal).sum();
        Self {
            slots: opts.slots,
            env: Environment::new(opts.seed),
            fragments,
            nominal_total,
            clustering,
            utilization: Series::new(),
            throughput: Series::new(),
            compliance: Series::new(),
            slot: 0,
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn step(&mut self) -> FragSlot {
        let mut users = (0..NR_USERS)
            .map(|i| {
                let class = ServiceClass::from_index(i, USERS_PER_CLASS);
                FragUser::generate(UserId::new(i), class, &mut self.env)
            })
            .collect::<Vec<_>>();
        rank(&mut users);

        // Fragment frequencies never change, but the grouping is slot-scoped like the capacity.
        let clusters = self.clustering.cluster(&self.fragments);
        let total_allocated = allocate(&mut users, &mut self.fragments, &clusters);
        let consumed = self.fragments.iter().map(Fragment::consumed).sum();

        let utilization =
            metrics::safe_ratio(total_allocated.into_f64(), self.nominal_total.into_f64()) * 100.0;
        let urllc_compliance = urllc_compliance(&users);
        self.utilization.push(utilization);
        self.throughput.push(total_allocated.into_f64());
        self.compliance.push(urllc_compliance);

        for fragment in &mut self.fragments {
            fragment.reset();
        }

        debug!(
            "frag slot {}: {} allocated over {} clusters, utilization {:.1}%, urllc {:.0}%",
            self.slot,
            total_allocated,
            clusters.len(),
            utilization,
            urllc_compliance
        );
        let report = FragSlot {
            slot: self.slot,
            users,
            total_allocated,
            consumed,
            utilization,
            urllc_compliance,
            nr_clusters: clusters.len(),
        };
        self.slot += 1;
        report
    }

    pub fn run(mut self) -> FragOutput {
        while self.slot < self.slots {
            self.step();
        }
        self.finish()
    }

    pub fn finish(&self) -> FragOutput {
        let output = FragOutput {
            spectrum_utilization: self.utilization.mean(),
            avg_throughput: self.throughput.mean(),
            urllc_compliance: self.compliance.mean(),
            util_history: self.utilization.tail(),
            throughput_history: self.throughput.tail(),
        };
        info!(
            "frag over {} slots: utilization {:.2}%, throughput {:.2}, urllc compliance {:.2}%",
            self.utilization.len(),
            output.spectrum_utilization,
            output.avg_throughput,
            output.urllc_compliance
        );
        output
    }
}

/// Runs a complete FRAG simulation with the given clustering algorithm.
pub fn simulate<C: ClusteringAlgo>(opts: &FragOpts, clustering: C) -> FragOutput {
    FragSim::new(opts, clustering).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::DefaultClustering;
    use crate::testing;
    use crate::types::ServiceClass::{Embb, Mmtc, Urllc};

    #[test]
    fn reference_band_plan() {
        insta::assert_yaml_snapshot!(default_fragments(), @r###"
        ---
        - id: 0
          nominal: 50
          capacity: 50
          center_freq: 3500
        - id: 1
          nominal: 40
          capacity: 40
          center_freq: 3600
        - id: 2
          nominal: 30
          capacity: 30
          center_freq: 3800
        - id: 3
          nominal: 35
          capacity: 35
          center_freq: 2600
        "###);
    }

    #[test]
    fn score_favours_tight_deadlines() {
        let users = testing::frag_users(&[(Urllc, 10, 4), (Mmtc, 5, 40)]);
        assert_eq!(users[0].score(), 3.5);
        assert!((users[1].score() - 1.025).abs() < 1e-12);
    }

    #[test]
    fn rank_is_stable_for_equal_scores() {
        let mut users = testing::frag_users(&[(Embb, 20, 10), (Urllc, 5, 20), (Embb, 25, 10)]);
        rank(&mut users);
        let order = users.iter().map(|u| u.id.index()).collect::<Vec<_>>();
        // eMBB/10 and URLLC/20 both score 1.5; the three tie and keep their order.
        assert_eq!(order, vec![0, 1, 2]);

        let mut users = testing::frag_users(&[(Mmtc, 5, 40), (Urllc, 5, 3)]);
        rank(&mut users);
        assert_eq!(users[0].class, Urllc);
    }

    #[test]
    fn greedy_fill_in_fragment_order() {
        let mut fragments = default_fragments();
        let clusters = DefaultClustering.cluster(&fragments);
        let mut users = testing::frag_users(&[(Urllc, 60, 3), (Embb, 50, 10), (Mmtc, 60, 30)]);
        let total = allocate(&mut users, &mut fragments, &clusters);

        assert_eq!(total, Bandwidth::new(155));
        assert_eq!(users[0].allocated, Bandwidth::new(60));
        assert_eq!(users[1].allocated, Bandwidth::new(50));
        assert_eq!(users[2].allocated, Bandwidth::new(45));
        assert!(!users[2].is_satisfied());
        assert!(fragments.iter().all(|f| f.capacity == Bandwidth::ZERO));
    }

    #[test]
    fn clusters_set_the_visiting_order() {
        let mut fragments = default_fragments();
        let mut first = Cluster::new(FragmentId::new(3));
        first.push(FragmentId::new(0));
        let clusters = vec![first, Cluster::new(FragmentId::new(1))];
        let mut users = testing::frag_users(&[(Urllc, 40, 3)]);
        allocate(&mut users, &mut fragments, &clusters);

        assert_eq!(fragments[3].capacity, Bandwidth::ZERO);
        assert_eq!(fragments[0].consumed(), Bandwidth::new(5));
        assert_eq!(fragments[1].consumed(), Bandwidth::ZERO);
    }

    #[test]
    fn compliance_counts_only_urllc() {
        let mut users = testing::frag_users(&[(Urllc, 10, 3), (Urllc, 10, 4), (Embb, 20, 12)]);
        users[0].allocated = Bandwidth::new(10);
        users[1].allocated = Bandwidth::new(9);
        assert_eq!(urllc_compliance(&users), 50.0);

        let embb_only = testing::frag_users(&[(Embb, 20, 12)]);
        assert_eq!(urllc_compliance(&embb_only), 100.0);
    }

    #[test]
    fn capacity_is_restored_every_slot() {
        let mut sim = FragSim::new(&FragOpts::builder().seed(9).build(), DefaultClustering);
        for _ in 0..20 {
            let slot = sim.step();
            assert_eq!(slot.consumed, slot.total_allocated);
            assert!(slot.total_allocated <= Bandwidth::new(155));
            assert_eq!(slot.users.len(), NR_USERS);
            assert!(sim.fragments().iter().all(|f| f.capacity == f.nominal));
        }
    }

    #[test]
    fn generated_users_stay_in_class_ranges() {
        let mut env = Environment::new(Some(4));
        for i in 0..NR_USERS {
            let class = ServiceClass::from_index(i, USERS_PER_CLASS);
            let user = FragUser::generate(UserId::new(i), class, &mut env);
            assert!(demand_range(class).contains(&user.demand.into_u64()));
            assert!(deadline_range(class).contains(&user.deadline));
            assert_eq!(user.allocated, Bandwidth::ZERO);
        }
    }
}
