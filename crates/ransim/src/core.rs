//! Core ransim simulators, types, and metrics. The entry points are [das::simulate()],
//! [csi::simulate()], and [frag::simulate()].

pub use ransim_core::*;
