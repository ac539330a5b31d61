use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process;

use pixel_parity::cmd;
use pixel_parity::compare::{DiffStyle, DEFAULT_TOLERANCE};
use pixel_parity::config::ConfigOverrides;

/// Visual-regression verification for rendered web pages
///
/// pixel-parity compares a reference and a candidate rendering of every
/// page at every viewport and turns the per-pixel differences into one
/// pass/fail verdict.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable emoji output (useful for CI or accessibility)
    #[arg(long, global = true)]
    no_emoji: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Mask,
    Faded,
}

impl From<StyleArg> for DiffStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Mask => DiffStyle::Mask,
            StyleArg::Faded => DiffStyle::Faded,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Capture and compare every page at every viewport
    Run {
        /// Configuration file (default: .pixel-parity.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Policy preset: lenient, standard, pixel-perfect
        #[arg(long)]
        preset: Option<String>,

        /// Per-pixel color-distance tolerance, 0 to 1
        #[arg(long)]
        tolerance: Option<f64>,

        /// Maximum percentage of differing pixels
        #[arg(long)]
        max_diff: Option<f64>,

        /// Maximum height difference, percent
        #[arg(long)]
        max_height_delta: Option<f64>,

        /// Cases in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Run deadline in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Directory for report.json and diff images
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output as JSON (for CI integration)
        #[arg(long)]
        json: bool,
    },

    /// Compare two screenshots
    Compare {
        /// Reference image
        reference: String,

        /// Candidate image
        candidate: String,

        /// Policy preset: lenient, standard, pixel-perfect
        #[arg(long, default_value = "standard")]
        preset: String,

        /// Per-pixel color-distance tolerance, 0 to 1
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,

        /// Maximum percentage of differing pixels
        #[arg(long)]
        max_diff: Option<f64>,

        /// Maximum height difference, percent
        #[arg(long)]
        max_height_delta: Option<f64>,

        /// How unchanged pixels are drawn in the diff image
        #[arg(long, value_enum, default_value = "mask")]
        style: StyleArg,

        /// Write the diff image to this path
        #[arg(long)]
        diff_out: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize pixel-parity configuration
    Init {
        /// Preset to use: lenient, standard, pixel-perfect
        #[arg(short, long, default_value = "standard")]
        preset: String,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Compare two report.json files and list regressions
    Regressions {
        /// Report of the earlier run
        previous: String,

        /// Report of the later run
        current: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Initialize logger (use RUST_LOG env var to control verbosity)
    env_logger::init();

    let cli = Cli::parse();
    let emoji = !cli.no_emoji;

    let result = match cli.command {
        Some(Commands::Run {
            config,
            preset,
            tolerance,
            max_diff,
            max_height_delta,
            concurrency,
            timeout,
            output_dir,
            json,
        }) => cmd::cmd_run(cmd::RunOptions {
            config,
            overrides: ConfigOverrides {
                preset,
                tolerance,
                max_diff_percent: max_diff,
                max_height_delta_percent: max_height_delta,
                concurrency,
                timeout_secs: timeout,
                output_dir,
            },
            json,
            emoji,
        }),
        Some(Commands::Compare {
            reference,
            candidate,
            preset,
            tolerance,
            max_diff,
            max_height_delta,
            style,
            diff_out,
            json,
        }) => cmd::cmd_compare(
            &reference,
            &candidate,
            &cmd::CompareOptions {
                preset,
                tolerance,
                max_diff_percent: max_diff,
                max_height_delta_percent: max_height_delta,
                style: style.into(),
                diff_out,
                json,
                emoji,
            },
        ),
        Some(Commands::Init { preset, force }) => {
            cmd::cmd_init(&preset, force, emoji).map(|()| 0)
        }
        Some(Commands::Regressions {
            previous,
            current,
            json,
        }) => cmd::cmd_regressions(&previous, &current, json, emoji),
        Some(Commands::Completions { shell }) => {
            cmd::cmd_completions(shell);
            Ok(0)
        }
        None => {
            // No subcommand provided, show help
            println!("pixel-parity v{}", env!("CARGO_PKG_VERSION"));
            println!("Visual-regression verification for rendered web pages\n");
            println!("Usage: pixel-parity <COMMAND>\n");
            println!("Commands:");
            println!("  run          Capture and compare every page at every viewport");
            println!("  compare      Compare two screenshots");
            println!("  init         Initialize pixel-parity configuration");
            println!("  regressions  Compare two report.json files");
            println!("\nRun 'pixel-parity <COMMAND> --help' for more information on a command.");
            Ok(0)
        }
    };

    match result {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            use pixel_parity::error::ErrorFormatter;
            eprintln!("{}", ErrorFormatter::format(&e));
            process::exit(ErrorFormatter::exit_code(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }
}
