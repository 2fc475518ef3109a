//! This crate contains implementations of the
//! [`ClusteringAlgo`](ransim_core::cluster::ClusteringAlgo) trait for grouping spectrum
//! fragments.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

pub mod feature;
pub mod greedy;

pub use crate::greedy::{proximity, GreedyClustering};
