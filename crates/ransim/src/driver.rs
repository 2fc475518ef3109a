//! Scenario files, baseline comparisons and batch runs.

pub use ransim_driver::*;
