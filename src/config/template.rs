//! Named pass-policy presets
//!
//! - `lenient`: 10% pixels, 15% height, for pages with dynamic content
//! - `standard`: 5% pixels, 10% height (default)
//! - `pixel-perfect`: 1% pixels, equal heights
//!
//! # Examples
//!
//! ```
//! use pixel_parity::config::PolicyPreset;
//!
//! let preset: PolicyPreset = "pixel-perfect".parse().unwrap();
//! assert_eq!(preset.policy().max_height_delta_percent, 0.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::compare::PassPolicy;

/// Preset identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyPreset {
    /// Tolerates noticeable drift
    Lenient,
    /// Recommended default
    #[default]
    Standard,
    /// Near-identical renderings only
    PixelPerfect,
}

impl FromStr for PolicyPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "standard" => Ok(Self::Standard),
            "pixel-perfect" | "pixel_perfect" => Ok(Self::PixelPerfect),
            _ => Err(format!("Unknown preset: {}", s)),
        }
    }
}

impl PolicyPreset {
    /// All presets, loosest first
    pub const ALL: [PolicyPreset; 3] = [Self::Lenient, Self::Standard, Self::PixelPerfect];

    /// Get preset name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Standard => "standard",
            Self::PixelPerfect => "pixel-perfect",
        }
    }

    /// Get preset description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Lenient => "10% pixels, 15% height; pages with live content",
            Self::Standard => "5% pixels, 10% height; recommended",
            Self::PixelPerfect => "1% pixels, identical height; static pages",
        }
    }

    /// Thresholds for this preset
    pub fn policy(&self) -> PassPolicy {
        match self {
            Self::Lenient => PassPolicy::lenient(),
            Self::Standard => PassPolicy::standard(),
            Self::PixelPerfect => PassPolicy::pixel_perfect(),
        }
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
