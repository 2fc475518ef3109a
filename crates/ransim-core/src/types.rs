//! Entity classes shared by the simulators.

identifier!(UserId);
identifier!(FragmentId);

/// Traffic service classes, ordered from most to least delay-critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ServiceClass {
    #[serde(rename = "URLLC")]
    Urllc,
    #[serde(rename = "eMBB")]
    Embb,
    #[serde(rename = "mMTC")]
    Mmtc,
}

impl ServiceClass {
    /// Block assignment of classes to user indices: the first `per_class` users are URLLC, the
    /// next `per_class` are eMBB, and everyone else is mMTC.
    pub fn from_index(index: usize, per_class: usize) -> Self {
        if index < per_class {
            ServiceClass::Urllc
        } else if index < 2 * per_class {
            ServiceClass::Embb
        } else {
            ServiceClass::Mmtc
        }
    }

    /// Packet delay budget in slots.
    pub fn packet_delay_budget(self) -> i64 {
        match self {
            ServiceClass::Urllc => 5,
            ServiceClass::Embb => 20,
            ServiceClass::Mmtc => 50,
        }
    }

    /// Allocation weight used by the fragmentation-aware scorer.
    pub fn weight(self) -> f64 {
        match self {
            ServiceClass::Urllc => 10.0,
            ServiceClass::Embb => 5.0,
            ServiceClass::Mmtc => 1.0,
        }
    }

    pub fn is_urllc(self) -> bool {
        self == ServiceClass::Urllc
    }
}

impl std::fmt::Display for ServiceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceClass::Urllc => "URLLC",
            ServiceClass::Embb => "eMBB",
            ServiceClass::Mmtc => "mMTC",
        };
        f.write_str(name)
    }
}

/// User mobility, which sets how fast the channel moves and how noisy its reports are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mobility {
    High,
    Low,
}

impl Mobility {
    pub fn channel_std_dev(self) -> f64 {
        match self {
            Mobility::High => 2.0,
            Mobility::Low => 0.5,
        }
    }

    pub fn report_noise_std_dev(self) -> f64 {
        match self {
            Mobility::High => 1.5,
            Mobility::Low => 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_users_split_evenly() {
        let classes = (0..15)
            .map(|i| ServiceClass::from_index(i, 5))
            .collect::<Vec<_>>();
        for class in [ServiceClass::Urllc, ServiceClass::Embb, ServiceClass::Mmtc] {
            assert_eq!(classes.iter().filter(|&&c| c == class).count(), 5);
        }
        assert_eq!(classes[4], ServiceClass::Urllc);
        assert_eq!(classes[5], ServiceClass::Embb);
        assert_eq!(classes[10], ServiceClass::Mmtc);
    }

    #[test]
    fn class_names_serialize_like_the_dashboard() {
        let json = serde_json::to_string(&[ServiceClass::Urllc, ServiceClass::Embb]).unwrap();
        assert_eq!(json, r#"["URLLC","eMBB"]"#);
    }
}
