//! Clustering algorithms for fragmented spectrum.

pub use clustering_impls::*;
