//! Shell completions generation.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use super::{Cli, ShellType};

const BIN_NAME: &str = "sharepad";

impl From<ShellType> for Shell {
    fn from(shell: ShellType) -> Self {
        match shell {
            ShellType::Bash => Self::Bash,
            ShellType::Zsh => Self::Zsh,
            ShellType::Fish => Self::Fish,
            ShellType::PowerShell => Self::PowerShell,
            ShellType::Elvish => Self::Elvish,
        }
    }
}

/// Generate completions and print to stdout.
pub fn generate_to_stdout(shell: ShellType) {
    write_completions(shell, &mut io::stdout());
}

fn write_completions(shell: ShellType, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(Shell::from(shell), &mut cmd, BIN_NAME, out);
}
