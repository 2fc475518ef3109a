//! `ransim` simulates three scheduling problems of a cellular radio-access network, one timeslot
//! at a time: delay-aware packet scheduling across URLLC, eMBB and mMTC users, opportunistic
//! scheduling over noisy and smoothed channel-quality reports, and spectrum allocation over a
//! fragmented band plan. Each run yields aggregate QoS metrics and a short trailing history.

#![warn(unreachable_pub, missing_docs)]

pub mod core;
pub mod driver;
pub mod impls;
