mod cache;
mod collaborators;
mod commands;
mod emitter;
mod entity;
mod error;
mod graph;
mod graphbuilder;
mod logging;
mod metagraph;
mod parsers;
mod pipeline;
mod slicer;
mod text_adapter;
mod util;

use std::process::ExitCode;

use clap::Parser;

use commands::{Cli, Subcommands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Subcommands::Slice(args) => match commands::slice::run(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                error::exit_code_for(&e)
            }
        },
        Subcommands::Stats(args) => match commands::stats::run(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                error::exit_code_for(&e)
            }
        },
        Subcommands::Completions(args) => {
            commands::completions::run(args);
            ExitCode::SUCCESS
        }
        Subcommands::Version => {
            println!("modslice {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
    }
}
