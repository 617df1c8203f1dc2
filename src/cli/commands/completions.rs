//! `qsync completions <shell>`

use clap::CommandFactory;
use clap_complete::{generate, shells};
use std::io::{self, Write};

use crate::cli::{Cli, Shell};
use crate::error::Result;

const BIN_NAME: &str = "qsync";

/// Print the completion script for `shell` to stdout.
///
/// # Errors
///
/// Never fails today; kept fallible like the other commands.
pub fn execute(shell: &Shell) -> Result<()> {
    write_completions(shell, &mut io::stdout());
    Ok(())
}

fn write_completions(shell: &Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, BIN_NAME, out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, BIN_NAME, out),
        Shell::Fish => generate(shells::Fish, &mut cmd, BIN_NAME, out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, BIN_NAME, out),
        Shell::Elvish => generate(shells::Elvish, &mut cmd, BIN_NAME, out),
    }
}
