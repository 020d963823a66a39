//! # CLI Interface
//!
//! Defines the command-line argument structure for `yac-node` using
//! `clap` derive. Supports two subcommands: `run` and `version`.

use clap::{Parser, Subcommand};

/// Drives an in-process YAC consensus cluster.
///
/// Spins up a handful of [`yac_core::Yac`] instances wired together with
/// the in-process transport, a synthetic block-creator event source, and
/// logs the gate outcome each round settles on. There is no RPC surface
/// and nothing is persisted across runs.
#[derive(Parser, Debug)]
#[command(
    name = "yac-node",
    about = "Drives an in-process YAC consensus cluster",
    version,
    propagate_version = true
)]
pub struct YacNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `yac-node` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the demo cluster.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Number of peers in the simulated cluster.
    #[arg(long, short = 'p', env = "YAC_PEERS", default_value_t = 4)]
    pub peers: u64,

    /// Number of rounds to drive before exiting.
    #[arg(long, short = 'r', env = "YAC_ROUNDS", default_value_t = 5)]
    pub rounds: u64,

    /// Consistency model to enforce: "cft" or "bft".
    #[arg(long, env = "YAC_CONSISTENCY", default_value = "cft")]
    pub consistency: String,

    /// Leader-rotation delay, in milliseconds.
    #[arg(long, env = "YAC_VOTE_DELAY_MS", default_value_t = 250)]
    pub vote_delay_ms: u64,

    /// Log level passed to `tracing`'s env filter.
    #[arg(long, env = "YAC_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "YAC_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}
