//! This module defines types and traits for grouping spectrum fragments into clusters that the
//! fragmentation-aware allocator searches together.

use crate::frag::Fragment;
use crate::types::FragmentId;

/// An ordered group of fragments with a representative member. Members are kept in the order
/// they joined, which is the order the allocator visits them in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Cluster {
    representative: FragmentId,
    members: Vec<FragmentId>,
}

impl Cluster {
    /// Starts a cluster containing only `representative`.
    pub fn new(representative: FragmentId) -> Self {
        Self {
            representative,
            members: vec![representative],
        }
    }

    /// Get the cluster's representative.
    pub fn representative(&self) -> FragmentId {
        self.representative
    }

    /// Adds a fragment after the existing members.
    pub fn push(&mut self, member: FragmentId) {
        self.members.push(member);
    }

    delegate::delegate! {
        to self.members {
            /// Returns true if the cluster contains the fragment `id`.
            pub fn contains(&self, id: &FragmentId) -> bool;

            /// Returns an iterator over the cluster's members, in joining order.
            #[call(iter)]
            pub fn members(&self) -> impl Iterator<Item = &FragmentId>;

            /// Number of members.
            pub fn len(&self) -> usize;

            /// Always false for a cluster built with [`Cluster::new`].
            pub fn is_empty(&self) -> bool;
        }
    }
}

/// The trait that must be implemented by all fragment clustering algorithms.
pub trait ClusteringAlgo {
    /// Given the fragment set, return the clusters in the order the allocator should visit
    /// them. Every fragment should appear in exactly one cluster.
    fn cluster(&self, fragments: &[Fragment]) -> Vec<Cluster>;
}

impl<C: ClusteringAlgo> ClusteringAlgo for &C {
    fn cluster(&self, fragments: &[Fragment]) -> Vec<Cluster> {
        (*self).cluster(fragments)
    }
}

/// No clustering: every fragment is its own cluster, in fragment-list order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClustering;

impl ClusteringAlgo for DefaultClustering {
    fn cluster(&self, fragments: &[Fragment]) -> Vec<Cluster> {
        fragments.iter().map(|f| Cluster::new(f.id)).collect()
    }
}
