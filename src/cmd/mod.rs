//! Command handlers for pixel-parity CLI
//!
//! This module contains all command implementations, organized by functionality.
//! Each submodule handles a specific CLI command.

pub mod compare;
pub mod completions;
pub mod init;
pub mod regressions;
pub mod run;
pub mod workflow;

// Re-export command functions for convenient access
pub use compare::{cmd_compare, CompareOptions};
pub use completions::cmd_completions;
pub use init::cmd_init;
pub use regressions::cmd_regressions;
pub use run::{cmd_run, RunOptions};
pub use workflow::RunWorkflow;
