//! Spectrum units. Bandwidth is counted in whole allocation units; center frequencies are in
//! MHz and only ever compared with each other.

macro_rules! unit {
    ($name: ident) => {
        #[derive(
            Debug,
            Default,
            Copy,
            Clone,
            PartialOrd,
            Ord,
            PartialEq,
            Eq,
            Hash,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
            derive_more::Sum,
            derive_more::FromStr,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub const ZERO: $name = Self::new(0);

            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn into_u64(self) -> u64 {
                self.0
            }

            pub fn into_f64(self) -> f64 {
                self.0 as f64
            }

            pub const fn saturating_sub(self, rhs: $name) -> $name {
                Self(self.0.saturating_sub(rhs.0))
            }
        }
    };
}

unit!(Bandwidth);

impl std::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}u", self.0)
    }
}

unit!(Frequency);

impl Frequency {
    /// Absolute distance between two center frequencies.
    pub const fn distance(self, other: Frequency) -> Frequency {
        Self(self.0.abs_diff(other.0))
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}MHz", self.0)
    }
}
