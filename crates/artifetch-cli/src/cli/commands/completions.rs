//! Shell completion scripts.

use crate::cli::Cli;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io;

pub fn run_completions(shell: Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "artifetch", &mut io::stdout());
}
