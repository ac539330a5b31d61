//! Completions command implementation
//!
//! Handles the `pixel-parity completions` command which generates
//! shell completion scripts for bash, zsh, fish, etc.

use clap::{Arg, ArgAction, Command};
use clap_complete::{generate, Shell};
use std::io::Write;

/// Command tree used for completion scripts
///
/// Mirrors the derive-based CLI in `main.rs`, which the library cannot see.
fn completion_command() -> Command {
    let json = || {
        Arg::new("json")
            .long("json")
            .help("Output as JSON")
            .action(ArgAction::SetTrue)
    };

    Command::new("pixel-parity")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Visual-regression verification for rendered web pages")
        .arg(
            Arg::new("no-emoji")
                .long("no-emoji")
                .help("Disable emoji output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Capture and compare every page at every viewport")
                .arg(Arg::new("config").short('c').long("config"))
                .arg(Arg::new("preset").long("preset"))
                .arg(Arg::new("tolerance").long("tolerance"))
                .arg(Arg::new("max-diff").long("max-diff"))
                .arg(Arg::new("max-height-delta").long("max-height-delta"))
                .arg(Arg::new("concurrency").long("concurrency"))
                .arg(Arg::new("timeout").long("timeout"))
                .arg(Arg::new("output-dir").short('o').long("output-dir"))
                .arg(json()),
        )
        .subcommand(
            Command::new("compare")
                .about("Compare two screenshots")
                .arg(Arg::new("reference").required(true))
                .arg(Arg::new("candidate").required(true))
                .arg(Arg::new("preset").long("preset"))
                .arg(Arg::new("tolerance").long("tolerance"))
                .arg(Arg::new("max-diff").long("max-diff"))
                .arg(Arg::new("max-height-delta").long("max-height-delta"))
                .arg(Arg::new("style").long("style").value_parser(["mask", "faded"]))
                .arg(Arg::new("diff-out").long("diff-out"))
                .arg(json()),
        )
        .subcommand(
            Command::new("init")
                .about("Initialize pixel-parity configuration")
                .arg(
                    Arg::new("preset")
                        .short('p')
                        .long("preset")
                        .value_parser(["lenient", "standard", "pixel-perfect"]),
                )
                .arg(Arg::new("force").long("force").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("regressions")
                .about("Compare two report.json files")
                .arg(Arg::new("previous").required(true))
                .arg(Arg::new("current").required(true))
                .arg(json()),
        )
        .subcommand(Command::new("completions").about("Generate shell completions"))
}

/// Write a completion script for `shell`
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = completion_command();
    generate(shell, &mut cmd, "pixel-parity", out);
}

/// Generate shell completion scripts
///
/// Outputs completion script for the specified shell to stdout.
/// Users can redirect this to their shell's completion directory.
///
/// # Examples
///
/// ```bash
/// # Bash
/// pixel-parity completions bash > /etc/bash_completion.d/pixel-parity
///
/// # Zsh
/// pixel-parity completions zsh > ~/.zfunc/_pixel-parity
///
/// # Fish
/// pixel-parity completions fish > ~/.config/fish/completions/pixel-parity.fish
/// ```
pub fn cmd_completions(shell: Shell) {
    write_completions(shell, &mut std::io::stdout());
}
