//! `modslice completions <shell>` — shell completion script generation,
//! matching the teacher's `commands::completions` (`clap_complete`
//! against the full derived command tree).

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};

use crate::commands::Cli;

#[derive(Parser, Debug)]
#[command(about = "Generate shell completion scripts")]
pub struct CompletionsCli {
    shell: Shell,
}

pub fn run(cli: CompletionsCli) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(cli.shell, &mut cmd, name, &mut std::io::stdout());
}
