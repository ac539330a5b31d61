//! Test fixture helpers
//!
//! Frame builders with a known share of differing pixels, PNG writers,
//! and throwaway project directories with a `.pixel-parity.toml`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use pixel_parity::config::{ConfigFile, ConfigLoader};
use pixel_parity::frame::{encode_png, ImageFrame};
use pixel_parity::model::{PageSpec, Viewport};

/// Re-export anyhow for convenience
pub use anyhow;

/// Opaque white
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Opaque black
pub const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Light gray used as page background
pub const GRAY: [u8; 4] = [200, 200, 200, 255];

/// A frame whose first `changed_rows` rows are black, the rest `base`
///
/// Against `ImageFrame::filled(width, height, base)` exactly
/// `changed_rows / height` of the pixels differ.
pub fn with_changed_rows(width: u32, height: u32, changed_rows: u32, base: [u8; 4]) -> ImageFrame {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let rgba = if y < changed_rows { BLACK } else { base };
        for _ in 0..width {
            pixels.extend_from_slice(&rgba);
        }
    }
    ImageFrame::new(width, height, pixels).expect("buffer length matches dimensions")
}

/// Write a frame as PNG, creating parent directories
pub fn write_png(path: &Path, frame: &ImageFrame) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, encode_png(frame)?)?;
    Ok(())
}

/// A project directory with screenshots under `shots/`
pub struct Project {
    /// Keeps the directory alive
    pub dir: TempDir,
}

impl Project {
    /// Create an empty project
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Project root
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a screenshot at `shots/{page}-{viewport}-{role}.png`
    pub fn shot(&self, page: &str, viewport: &str, role: &str, frame: &ImageFrame) -> anyhow::Result<PathBuf> {
        let path = self
            .root()
            .join("shots")
            .join(format!("{page}-{viewport}-{role}.png"));
        write_png(&path, frame)?;
        Ok(path)
    }

    /// Write `.pixel-parity.toml` reading from `shots/`
    pub fn configure(&self, pages: &[&str], viewports: &[Viewport]) -> anyhow::Result<ConfigFile> {
        let config = ConfigFile {
            viewports: viewports.to_vec(),
            pages: pages
                .iter()
                .map(|name| {
                    PageSpec::new(
                        *name,
                        "shots/{page}-{viewport}-reference.png",
                        "shots/{page}-{viewport}-candidate.png",
                    )
                })
                .collect(),
            ..ConfigFile::default()
        };
        ConfigLoader::save(&config, self.root())?;
        Ok(config)
    }

    /// Path of the published report
    pub fn report_path(&self) -> PathBuf {
        self.root().join("parity-results").join("report.json")
    }
}

/// Desktop and mobile viewports sized for fast tests
pub fn small_viewports() -> Vec<Viewport> {
    vec![Viewport::new("desktop", 40, 20), Viewport::new("mobile", 20, 20)]
}
