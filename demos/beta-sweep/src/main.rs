use clap::Parser;
use ransim::driver::{compare_das, DasRequest};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of intervals between beta = 0 and beta = 1
    #[arg(long, default_value_t = 10)]
    steps: usize,

    /// Slots per run
    #[arg(long, default_value_t = 100)]
    slots: usize,

    /// Users per run
    #[arg(long, default_value_t = 15)]
    users: usize,

    /// Random seed, shared by every run and its baseline
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    anyhow::ensure!(args.steps > 0, "steps must be positive");
    anyhow::ensure!(args.users > 0, "users must be positive");

    println!("beta\ttimeout%\tdelay\tthroughput\ttimeout reduction%");
    for i in 0..=args.steps {
        let beta = i as f64 / args.steps as f64;
        let cmp = compare_das(&DasRequest {
            beta,
            num_slots: args.slots,
            num_users: args.users,
            seed: Some(args.seed),
        })?;
        let out = &cmp.candidate;
        println!(
            "{beta:.2}\t{:.2}\t{:.3}\t{:.3}\t{:.1}",
            out.urllc_timeout_rate, out.avg_urllc_delay, out.avg_throughput, cmp.timeout_reduction
        );
    }
    Ok(())
}
