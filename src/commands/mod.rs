//! The CLI surface (component I): `slice`, `stats`, `completions`,
//! `version`, modeled on the teacher's `src/bcachefs.rs` +
//! `src/commands/mod.rs` pattern — one `clap::Parser` struct per
//! subcommand, dispatched from a top-level derived `Cli`.

pub mod completions;
pub mod slice;
pub mod stats;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "modslice", version, about = "Extract a minimal self-contained C slice from a kernel module")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Subcommands,

    /// Raise the log level to debug (RUST_LOG overrides this)
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Subcommands {
    Slice(slice::Cli),
    Stats(stats::Cli),
    Completions(completions::CompletionsCli),
    /// Print the crate version
    Version,
}
