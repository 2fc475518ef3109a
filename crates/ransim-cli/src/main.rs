use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ransim_driver::{
    compare::SmoothingRegime, CsiRequest, DasRequest, FragRequest, PfRequest, Scenario,
};

/// Timeslot simulators for RAN scheduling and spectrum allocation.
#[derive(Parser, Debug)]
#[command(name = "ransim")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Delay-aware packet scheduling
    Das(DasArgs),
    /// Proportional-fair baseline (DAS with beta = 0)
    Pf(PfArgs),
    /// Opportunistic scheduling over smoothed CQI reports
    Csi(CsiArgs),
    /// Fragmentation-aware spectrum allocation
    Frag(FragArgs),
    /// Run a scenario file (.json or .dhall)
    Run {
        /// Path to the scenario file
        file: PathBuf,
    },
    /// Compare a DAS run against the PF baseline with the same seed
    CompareDas(DasArgs),
    /// Compare clustered and flat allocation with the same seed
    CompareFrag(FragArgs),
    /// Paired clustered/flat allocation runs in parallel
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct DasArgs {
    /// Weight of delay urgency against fairness, in [0, 1]
    #[arg(long, default_value_t = 0.7)]
    beta: f64,
    #[arg(long, default_value_t = 100)]
    slots: usize,
    #[arg(long, default_value_t = 15)]
    users: usize,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

impl From<DasArgs> for DasRequest {
    fn from(args: DasArgs) -> Self {
        DasRequest {
            beta: args.beta,
            num_slots: args.slots,
            num_users: args.users,
            seed: args.seed,
        }
    }
}

#[derive(Args, Debug)]
struct PfArgs {
    #[arg(long, default_value_t = 100)]
    slots: usize,
    #[arg(long, default_value_t = 15)]
    users: usize,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct CsiArgs {
    /// CQI smoothing factor, in (0, 1]
    #[arg(long, default_value_t = 0.2)]
    alpha: f64,
    #[arg(long, default_value_t = 100)]
    slots: usize,
    #[arg(long, default_value_t = 15)]
    users: usize,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct FragArgs {
    /// Allocate per fragment instead of per proximity cluster
    #[arg(long)]
    no_clustering: bool,
    #[arg(long, default_value_t = 100)]
    slots: usize,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    #[arg(long, default_value_t = 100)]
    runs: usize,
    #[arg(long, default_value_t = 100)]
    slots: usize,
    /// Run `i` is seeded with `base_seed + i`
    #[arg(long, default_value_t = 0)]
    base_seed: u64,
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Das(args) => {
            let report = ransim_driver::run(&Scenario::Das(args.into()))?;
            print_json(&report)?;
        }
        Command::Pf(args) => {
            let report = ransim_driver::run(&Scenario::Pf(PfRequest {
                num_slots: args.slots,
                num_users: args.users,
                seed: args.seed,
            }))?;
            print_json(&report)?;
        }
        Command::Csi(args) => {
            log::info!("{}", SmoothingRegime::from_alpha(args.alpha));
            let report = ransim_driver::run(&Scenario::Csi(CsiRequest {
                alpha: args.alpha,
                num_slots: args.slots,
                num_users: args.users,
                seed: args.seed,
            }))?;
            print_json(&report)?;
        }
        Command::Frag(args) => {
            let report = ransim_driver::run(&Scenario::Fragmentation(FragRequest {
                clustering: !args.no_clustering,
                num_slots: args.slots,
                seed: args.seed,
            }))?;
            print_json(&report)?;
        }
        Command::Run { file } => {
            let report = ransim_driver::run_from_file(&file)?;
            print_json(&report)?;
        }
        Command::CompareDas(args) => {
            let cmp = ransim_driver::compare_das(&args.into())?;
            print_json(&cmp)?;
        }
        Command::CompareFrag(args) => {
            let cmp = ransim_driver::compare_frag(args.slots, args.seed);
            print_json(&cmp)?;
        }
        Command::Batch(args) => {
            anyhow::ensure!(args.runs > 0, "a batch needs at least one run");
            let batch = ransim_driver::clustering_batch(args.runs, args.slots, args.base_seed);
            print_json(&batch)?;
        }
    }
    Ok(())
}
