macro_rules! identifier {
    ($name: ident) => {
        #[allow(missing_docs)]
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
            derive_more::Display,
            derive_more::FromStr,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(usize);

        impl $name {
            /// Creates a new ID.
            pub const fn new(val: usize) -> Self {
                Self(val)
            }

            /// Returns the position this ID was created for.
            pub const fn index(self) -> usize {
                self.0
            }
        }
    };
}
