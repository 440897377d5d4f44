//! Completions command

use clap::CommandFactory;

use crate::Cli;

/// Generate shell completions on stdout.
pub fn completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "alembic", &mut std::io::stdout());
}
