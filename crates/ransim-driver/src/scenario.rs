//! Scenario requests: the scalar parameters a caller passes to one simulation, with the
//! defaults the dashboard uses when a field is left out.

use ransim_core::{csi::CsiOpts, das::DasOpts};

/// One simulation request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum Scenario {
    /// Delay-aware packet scheduling.
    Das(DasRequest),
    /// The proportional-fair baseline, i.e. DAS with `beta = 0`.
    Pf(PfRequest),
    /// Opportunistic scheduling over smoothed CQI reports.
    Csi(CsiRequest),
    /// Fragmentation-aware spectrum allocation.
    Fragmentation(FragRequest),
}

impl Scenario {
    /// Validate a request.
    ///
    /// The simulators assume well-formed input; this is where malformed input is turned away:
    ///
    /// - `beta` must lie in `[0, 1]`
    /// - `alpha` must lie in `(0, 1]`
    /// - DAS, PF and CSI need at least one user
    pub fn validate(&self) -> Result<(), ScenarioError> {
        match self {
            Scenario::Das(req) => {
                if !(0.0..=1.0).contains(&req.beta) {
                    return Err(ScenarioError::InvalidBeta(req.beta));
                }
                nonzero_users("das", req.num_users)
            }
            Scenario::Pf(req) => nonzero_users("pf", req.num_users),
            Scenario::Csi(req) => {
                if !(req.alpha > 0.0 && req.alpha <= 1.0) {
                    return Err(ScenarioError::InvalidAlpha(req.alpha));
                }
                nonzero_users("csi", req.num_users)
            }
            Scenario::Fragmentation(_) => Ok(()),
        }
    }

    /// The scenario's name as it appears in the `scenario` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Das(_) => "das",
            Scenario::Pf(_) => "pf",
            Scenario::Csi(_) => "csi",
            Scenario::Fragmentation(_) => "fragmentation",
        }
    }
}

fn nonzero_users(scenario: &'static str, users: usize) -> Result<(), ScenarioError> {
    if users == 0 {
        return Err(ScenarioError::NoUsers { scenario });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DasRequest {
    pub beta: f64,
    pub num_slots: usize,
    pub num_users: usize,
    pub seed: Option<u64>,
}

impl Default for DasRequest {
    fn default() -> Self {
        Self {
            beta: 0.7,
            num_slots: 100,
            num_users: 15,
            seed: None,
        }
    }
}

impl From<&DasRequest> for DasOpts {
    fn from(req: &DasRequest) -> Self {
        DasOpts {
            beta: req.beta,
            slots: req.num_slots,
            users: req.num_users,
            seed: req.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PfRequest {
    pub num_slots: usize,
    pub num_users: usize,
    pub seed: Option<u64>,
}

impl Default for PfRequest {
    fn default() -> Self {
        Self {
            num_slots: 100,
            num_users: 15,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CsiRequest {
    pub alpha: f64,
    pub num_slots: usize,
    pub num_users: usize,
    pub seed: Option<u64>,
}

impl Default for CsiRequest {
    fn default() -> Self {
        Self {
            alpha: 0.2,
            num_slots: 100,
            num_users: 15,
            seed: None,
        }
    }
}

impl From<&CsiRequest> for CsiOpts {
    fn from(req: &CsiRequest) -> Self {
        CsiOpts {
            alpha: req.alpha,
            slots: req.num_slots,
            users: req.num_users,
            seed: req.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FragRequest {
    pub clustering: bool,
    pub num_slots: usize,
    pub seed: Option<u64>,
}

impl Default for FragRequest {
    fn default() -> Self {
        Self {
            clustering: true,
            num_slots: 100,
            seed: None,
        }
    }
}

/// Malformed scenario request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScenarioError {
    /// `beta` is outside `[0, 1]`.
    #[error("beta must be within [0, 1], got {0}")]
    InvalidBeta(f64),

    /// `alpha` is outside `(0, 1]`.
    #[error("alpha must be within (0, 1], got {0}")]
    InvalidAlpha(f64),

    /// A user-based scenario has no users.
    #[error("{scenario} needs at least one user")]
    NoUsers {
        /// The scenario name.
        scenario: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let scenario: Scenario = serde_json::from_str(r#"{"scenario": "das"}"#).unwrap();
        assert_eq!(scenario, Scenario::Das(DasRequest::default()));

        let scenario: Scenario =
            serde_json::from_str(r#"{"scenario": "csi", "alpha": 0.5}"#).unwrap();
        let Scenario::Csi(req) = scenario else {
            panic!("expected a CSI request");
        };
        assert_eq!(req.alpha, 0.5);
        assert_eq!(req.num_slots, 100);
        assert_eq!(req.num_users, 15);

        let scenario: Scenario =
            serde_json::from_str(r#"{"scenario": "fragmentation"}"#).unwrap();
        assert_eq!(scenario, Scenario::Fragmentation(FragRequest::default()));
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let das = Scenario::Das(DasRequest {
            beta: 1.5,
            ..Default::default()
        });
        assert_eq!(das.validate(), Err(ScenarioError::InvalidBeta(1.5)));

        let csi = Scenario::Csi(CsiRequest {
            alpha: 0.0,
            ..Default::default()
        });
        assert_eq!(csi.validate(), Err(ScenarioError::InvalidAlpha(0.0)));

        let pf = Scenario::Pf(PfRequest {
            num_users: 0,
            ..Default::default()
        });
        assert_eq!(
            pf.validate(),
            Err(ScenarioError::NoUsers { scenario: "pf" })
        );
    }

    #[test]
    fn boundary_parameters_are_accepted() {
        for beta in [0.0, 1.0] {
            let das = Scenario::Das(DasRequest {
                beta,
                ..Default::default()
            });
            assert_eq!(das.validate(), Ok(()));
        }
        let csi = Scenario::Csi(CsiRequest {
            alpha: 1.0,
            ..Default::default()
        });
        assert_eq!(csi.validate(), Ok(()));
    }

    #[test]
    fn requests_map_onto_simulator_options() {
        let req = DasRequest {
            beta: 0.3,
            num_slots: 40,
            num_users: 9,
            seed: Some(8),
        };
        let opts = DasOpts::from(&req);
        assert_eq!(
            opts,
            DasOpts::builder().beta(0.3).slots(40).users(9).seed(8).build()
        );
    }
}
