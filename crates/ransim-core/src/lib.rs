#![warn(unreachable_pub, missing_debug_implementations)]

//! The core ransim library. This crate defines the three timeslot simulators of a cellular
//! radio-access network: [delay-aware packet scheduling](das), [CQI-smoothed opportunistic
//! scheduling](csi), and [fragmentation-aware spectrum allocation](frag). Every run owns its
//! own [random environment](env::Environment) and reports aggregate QoS metrics through the
//! [metrics aggregator](metrics).

#[macro_use]
mod ident;

pub mod cluster;
pub mod csi;
pub mod das;
pub mod env;
pub mod frag;
pub mod metrics;
pub mod types;
pub mod units;

pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use cluster::{Cluster, ClusteringAlgo, DefaultClustering};
pub use csi::{CsiOpts, CsiOutput};
pub use das::{DasOpts, DasOutput};
pub use env::Environment;
pub use frag::{FragOpts, FragOutput, Fragment};
pub use types::{FragmentId, Mobility, ServiceClass, UserId};
