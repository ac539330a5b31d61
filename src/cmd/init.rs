//! Init command implementation
//!
//! Handles the `pixel-parity init` command which writes a starter
//! `.pixel-parity.toml` using one of the policy presets.

use anyhow::Result;
use console::style;
use std::env;
use std::path::Path;

use crate::config::{self, ConfigFile, ConfigLoader, PolicyPreset};
use crate::error::ParityError;
use crate::fmt::{icon, CHECKMARK, INFO, ROCKET, SPARKLES};

/// Initialize pixel-parity configuration in the current directory
///
/// # Examples
///
/// ```no_run
/// use pixel_parity::cmd::init::cmd_init;
///
/// cmd_init("standard", false, true)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_init(preset: &str, force: bool, emoji: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    init_in(&project_root, preset, force, emoji)
}

fn init_in(project_root: &Path, preset: &str, force: bool, emoji: bool) -> Result<()> {
    println!(
        "{} {} Initializing pixel-parity",
        icon(ROCKET, emoji),
        style("pixel-parity init").bold()
    );
    println!();

    let selected: PolicyPreset = preset.parse().map_err(|_| ParityError::InvalidPreset {
        name: preset.to_string(),
        available: PolicyPreset::ALL.iter().map(|p| p.name().to_string()).collect(),
    })?;

    if ConfigLoader::exists(project_root) && !force {
        return Err(ParityError::ConfigExists {
            path: project_root.join(config::CONFIG_FILE_NAME),
        }
        .into());
    }

    println!(
        "{} Selected preset: {}",
        icon(SPARKLES, emoji),
        style(selected.name()).bold().cyan()
    );
    println!("   {}", style(selected.description()).dim());
    println!();

    let starter = ConfigFile::starter(selected.name());
    ConfigLoader::save(&starter, project_root)?;

    println!(
        "{} Created {}",
        icon(CHECKMARK, emoji),
        style(config::CONFIG_FILE_NAME).cyan().bold()
    );
    println!();
    println!("{}  Next Steps:", icon(INFO, emoji));
    println!(
        "   1. List your pages and viewports in {}",
        config::CONFIG_FILE_NAME
    );
    println!(
        "   2. Put screenshots under {} or configure a capture program",
        style("shots/").cyan()
    );
    println!("   3. Run {}", style("pixel-parity run").cyan());
    println!();

    println!("{}  Available Presets:", icon(INFO, emoji));
    for p in PolicyPreset::ALL {
        let indicator = if p == selected { ">" } else { " " };
        println!(
            "   {} {} - {}",
            style(indicator).cyan().bold(),
            style(p.name()).bold(),
            style(p.description()).dim()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_starter_config() {
        let temp = TempDir::new().unwrap();
        init_in(temp.path(), "lenient", false, false).unwrap();

        let config = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(config, ConfigFile::starter("lenient"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        init_in(temp.path(), "standard", false, false).unwrap();

        let err = init_in(temp.path(), "lenient", false, false).unwrap_err();
        let parity = err.downcast_ref::<ParityError>().unwrap();
        assert!(matches!(parity, ParityError::ConfigExists { .. }));

        init_in(temp.path(), "lenient", true, false).unwrap();
        assert_eq!(ConfigLoader::load(temp.path()).unwrap().preset, "lenient");
    }

    #[test]
    fn test_init_rejects_unknown_preset() {
        let temp = TempDir::new().unwrap();
        let err = init_in(temp.path(), "exact", false, false).unwrap_err();

        assert!(err.to_string().contains("exact"));
        assert!(!ConfigLoader::exists(temp.path()));
    }
}
