//! Xhash Miner CLI
//!
//! A command-line tool for mining with the Xhash proof-of-work.
//!
//! # Commands
//!
//! - `mine` - Search a work file's nonce space (multi-threaded)
//! - `hash` - Compute the digest of a single header
//! - `benchmark` - Run performance benchmark
//! - `init-config` - Write the default configuration file

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use xhash::algorithm::{
    HeaderWords, TargetWords, DIGEST_BYTES, HEADER_BYTES, NONCE_INDEX, STAGES, matches,
    xhash_stages,
};
use xhash::config::{default_config_path, ConfigOverrides, DEFAULT_LOG_LEVEL};
use xhash::{Miner, MinerConfig, MinerError, WorkTemplate, xhash};

#[derive(Parser)]
#[command(name = "xhash")]
#[command(author = "Xcoin Developers")]
#[command(version = "0.1.0")]
#[command(about = "Xhash proof-of-work CPU miner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (overrides the config file; RUST_LOG overrides both)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the nonce space of a work file
    Mine {
        /// Work file (JSON: header, target or difficulty, timestamp)
        #[arg(short, long)]
        work: PathBuf,

        /// Number of threads to use (default: from config, 0 = all CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Nonces per scan call
        #[arg(long)]
        nonce_span: Option<u32>,

        /// Seconds between hashrate reports
        #[arg(long)]
        report_interval: Option<u64>,
    },

    /// Compute the digest of one header
    Hash {
        /// Header hex (80 or 128 bytes)
        #[arg(long)]
        header: String,

        /// Block time salting the first stage
        #[arg(long)]
        timestamp: u64,

        /// Nonce to place in word 19 (default: keep the header's)
        #[arg(long)]
        nonce: Option<u32>,

        /// Target hex (32 bytes) to check the digest against
        #[arg(long)]
        target: Option<String>,

        /// Print every intermediate stage
        #[arg(long)]
        stages: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of hashes to compute
        #[arg(short, long, default_value = "1000")]
        count: u32,
    },

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Mine {
            work,
            threads,
            nonce_span,
            report_interval,
        } => {
            let config = load_config(&config_path)?.apply(ConfigOverrides {
                threads,
                nonce_span,
                report_interval_secs: report_interval,
                log_level: cli.log_level,
            })?;
            init_logging(&config.log_level);
            cmd_mine(config, &work)
        }
        Commands::Hash {
            header,
            timestamp,
            nonce,
            target,
            stages,
        } => {
            let config = load_config(&config_path)?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));
            cmd_hash(&header, timestamp, nonce, target.as_deref(), stages)
        }
        Commands::Benchmark { count } => {
            let config = load_config(&config_path)?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));
            cmd_benchmark(count)
        }
        Commands::InitConfig { force } => {
            init_logging(cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));
            cmd_init_config(&config_path, force)
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<MinerConfig> {
    MinerConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Install the log subscriber; `RUST_LOG` wins over `level`
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn cmd_mine(config: MinerConfig, work_path: &Path) -> anyhow::Result<()> {
    let template = WorkTemplate::load(work_path)
        .with_context(|| format!("Failed to read work from {}", work_path.display()))?;
    let work = template.to_work_item()?;
    let miner = Miner::new(&config);

    println!("\n=== Xhash Miner ===");
    println!("Work:      {}", work_path.display());
    println!("Timestamp: {}", template.timestamp);
    println!("Target:    {}", hex::encode(work.target.to_bytes()));
    println!("Threads:   {}", miner.threads());
    println!("Span:      {} nonces per scan", config.nonce_span);
    println!("===================\n");

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let restart = miner.restart_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!(target: "xhash::miner", "Interrupt signal received, stopping workers");
                restart.request_all();
            }
        });
        miner.mine(work, template.timestamp).await
    });

    match result {
        Ok(outcome) => {
            let header = work.header.with_nonce(outcome.nonce);

            println!("\nFound valid nonce!");
            println!("  Nonce:     {}", outcome.nonce);
            println!("  Digest:    {}", outcome.digest);
            println!("  Header:    {}", hex::encode(header.serialize()));
            println!("  Timestamp: {}", template.timestamp);
            println!(
                "  Hashes:    {} ({:.0} H/s)",
                outcome.hashes,
                outcome.hashrate()
            );
            Ok(())
        }
        Err(MinerError::Cancelled) => {
            println!("\nMining stopped without a solution ({} hashes)", miner.hash_count());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_hash(
    header_hex: &str,
    timestamp: u64,
    nonce: Option<u32>,
    target_hex: Option<&str>,
    show_stages: bool,
) -> anyhow::Result<()> {
    let mut header = HeaderWords::from_bytes(&hex::decode(header_hex.trim())?)?;
    if let Some(nonce) = nonce {
        header.set_nonce(nonce);
    }

    let digest = xhash(&header, timestamp);

    println!("Nonce:  {}", header.nonce());
    println!("Digest: {}", digest);

    if show_stages {
        let stages = xhash_stages(&header, timestamp);
        for i in 0..STAGES {
            println!("  h{}: {}", i, hex::encode(stages.stage(i)));
        }
    }

    if let Some(target_hex) = target_hex {
        let target = TargetWords::from_bytes(&hex::decode(target_hex.trim())?)?;
        let verdict = if matches(&digest, &target) {
            "meets target"
        } else {
            "above target"
        };
        println!("Target: {} ({})", hex::encode(target.to_bytes()), verdict);
    }

    Ok(())
}

fn cmd_benchmark(count: u32) -> anyhow::Result<()> {
    println!("Running benchmark with {} hashes...", count);

    let mut bytes = [0u8; HEADER_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| anyhow::anyhow!("Failed to generate random header: {}", e))?;
    let mut header = HeaderWords::from_bytes(&bytes)?;
    let timestamp = 1_700_000_000;

    let start = Instant::now();

    for i in 0..count {
        header.set_nonce(i);
        let _ = xhash(&header, timestamp);
    }

    let elapsed = start.elapsed();
    let hashrate = count as f64 / elapsed.as_secs_f64();

    println!("\nResults:");
    println!("  Total hashes: {}", count);
    println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("  Hashrate: {:.2} H/s", hashrate);

    println!("\nAlgorithm parameters:");
    println!("  Stages: {}", STAGES);
    println!("  Header: {} bytes (nonce in word {})", HEADER_BYTES, NONCE_INDEX);
    println!("  Digest: {} bytes", DIGEST_BYTES);

    Ok(())
}

fn cmd_init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite it.",
            path.display()
        );
    }

    MinerConfig::default().save(path)?;
    println!("Default config written to {}", path.display());

    Ok(())
}
