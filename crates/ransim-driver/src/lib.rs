//! Runs ransim scenarios described by scalar requests or scenario files, and compares them
//! against their baselines.

#![warn(unreachable_pub, missing_debug_implementations)]

use std::path::{Path, PathBuf};

use log::info;
use ransim_core::{
    csi::{self, CsiOutput},
    das::{self, DasOutput},
    frag::{self, FragOpts, FragOutput},
    DefaultClustering,
};

pub mod batch;
pub mod compare;
pub mod scenario;

pub use batch::{clustering_batch, ClusteringBatch};
pub use compare::{compare_das, compare_frag, DasComparison, FragComparison, SmoothingRegime};
pub use scenario::{CsiRequest, DasRequest, FragRequest, PfRequest, Scenario, ScenarioError};

/// Reads a [`Scenario`] from a JSON or Dhall file and runs it.
pub fn run_from_file(path: impl AsRef<Path>) -> Result<Report, Error> {
    let scenario = read_scenario(path)?;
    run(&scenario)
}

/// Reads a [`Scenario`] from a file in JSON or Dhall format.
pub fn read_scenario(path: impl AsRef<Path>) -> Result<Scenario, Error> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let scenario: Scenario = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)?,
        Some("dhall") => serde_dhall::from_str(&contents).parse().map_err(Box::new)?,
        _ => return Err(Error::UnknownFileType(path.into())),
    };
    Ok(scenario)
}

/// Validates and runs one scenario.
pub fn run(scenario: &Scenario) -> Result<Report, Error> {
    scenario.validate()?;
    info!("Running {} scenario", scenario.name());
    let report = match scenario {
        Scenario::Das(req) => Report::Das(das::simulate(&req.into())),
        Scenario::Pf(req) => {
            Report::Das(das::simulate_pf(req.num_slots, req.num_users, req.seed))
        }
        Scenario::Csi(req) => Report::Csi(csi::simulate(&req.into())),
        Scenario::Fragmentation(req) => {
            Report::Fragmentation(simulate_frag(req.clustering, req.num_slots, req.seed))
        }
    };
    Ok(report)
}

/// Runs the fragmentation-aware allocator over the reference band plan, with proximity
/// clustering or with plain per-fragment allocation.
pub fn simulate_frag(clustering_enabled: bool, slots: usize, seed: Option<u64>) -> FragOutput {
    let opts = FragOpts {
        slots,
        seed,
        fragments: frag::default_fragments(),
    };
    if clustering_enabled {
        frag::simulate(&opts, clustering_impls::proximity())
    } else {
        frag::simulate(&opts, DefaultClustering)
    }
}

/// The flat set of aggregates a scenario produces.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Report {
    /// DAS and PF results.
    Das(DasOutput),
    /// CSI results.
    Csi(CsiOutput),
    /// FRAG results.
    Fragmentation(FragOutput),
}

/// Error kinds for scenario files and requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown file type.
    #[error("unknown file type: {0}")]
    UnknownFileType(PathBuf),

    /// Error deserializing Dhall.
    #[error("Dhall error")]
    Dhall(#[from] Box<serde_dhall::Error>),

    /// Error deserializing JSON.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// The request is malformed.
    #[error("invalid scenario")]
    InvalidScenario(#[from] ScenarioError),
}
