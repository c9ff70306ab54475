use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dcr_seed_recoverer::combinatorics::count_iterations;
use dcr_seed_recoverer::mnemonic::encode_mnemonic;
use dcr_seed_recoverer::progress::SuspendingWriter;
use dcr_seed_recoverer::{recover, recover_parallel, Args, DecredKeys, DecredVerifier, OwnershipVerifier};

/// Depth above which the search space is usually too large to finish.
const RECOMMENDED_MAX_DEPTH: usize = 2;

fn main() -> Result<()> {
    let bar = progress_bar()?;
    let log_bar = bar.clone();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(move || SuspendingWriter::new(log_bar.clone(), std::io::stderr()))
        .init();

    let args = Args::parse();

    // Rejected arguments are reported, not treated as a failed run.
    let prepared = match args.validate() {
        Ok(prepared) => prepared,
        Err(err) => {
            println!("{err}");
            return Ok(());
        }
    };
    let config = prepared.config;
    let mut candidate = prepared.candidate;

    if args.threads > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("failed to build search thread pool")?;
    }

    let depth = config.max_depth;
    let verifier: DecredVerifier = OwnershipVerifier::new(DecredKeys::new(args.network), config);

    println!("Decred Seed Recoverer");
    println!("=====================");
    println!("Backup seed: {} words", candidate.len());
    println!("Network: {:?}", verifier.provider().network());
    println!("Candidates to check: {}", count_iterations(candidate.len(), depth));

    if depth > RECOMMENDED_MAX_DEPTH {
        warn!(depth, "depth above {RECOMMENDED_MAX_DEPTH} multiplies the search space by 256 per extra word");
    }

    info!(depth, threads = args.threads, "starting search");
    let start_time = Instant::now();

    let seed = if args.threads == 1 {
        recover(&mut candidate, depth, &verifier, &bar)
    } else {
        recover_parallel(&candidate, depth, &verifier, &bar)
    };

    let elapsed = start_time.elapsed();

    match seed {
        Some(seed) => {
            println!("Found wallet mnemonic:");
            println!("{}", encode_mnemonic(seed.as_bytes()));
        }
        None => println!("Wallet mnemonic not found"),
    }
    println!("Time taken: {:.2?}", elapsed);

    Ok(())
}

fn progress_bar() -> Result<ProgressBar> {
    let style = ProgressStyle::with_template("{pos} / {len} [{wide_bar}] {percent:>3}% ETA {eta}")
        .context("invalid progress bar template")?;
    Ok(ProgressBar::new(0).with_style(style))
}
