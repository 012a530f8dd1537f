//! Master asset directory layout.
//!
//! ```text
//! <root>/
//!   Watermarks/
//!     Vertical_HD/<name>_watermark.png   (tall)
//!     Square/<name>_watermark.png
//!     Landscape/<name>_watermark.png     (wide)
//!   Logos/Circle/<name>_logo.png
//! ```
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_ASSETS_ROOT, DEFAULT_LOGOS_DIR, DEFAULT_SQUARE_DIR, DEFAULT_TALL_DIR,
    DEFAULT_WATERMARKS_DIR, DEFAULT_WIDE_DIR,
};
use crate::overlay::Orientation;

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_ASSETS_ROOT)
}

fn default_watermarks_dir() -> PathBuf {
    PathBuf::from(DEFAULT_WATERMARKS_DIR)
}

fn default_logos_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOGOS_DIR)
}

fn default_tall_dir() -> String {
    DEFAULT_TALL_DIR.to_string()
}

fn default_square_dir() -> String {
    DEFAULT_SQUARE_DIR.to_string()
}

fn default_wide_dir() -> String {
    DEFAULT_WIDE_DIR.to_string()
}

/// Directory name used for each orientation class under the watermark dir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationDirs {
    #[serde(default = "default_tall_dir")]
    pub tall: String,
    #[serde(default = "default_square_dir")]
    pub square: String,
    #[serde(default = "default_wide_dir")]
    pub wide: String,
}

impl Default for OrientationDirs {
    fn default() -> Self {
        Self {
            tall: default_tall_dir(),
            square: default_square_dir(),
            wide: default_wide_dir(),
        }
    }
}

impl OrientationDirs {
    pub fn get(&self, orientation: Orientation) -> &str {
        match orientation {
            Orientation::Tall => &self.tall,
            Orientation::Square => &self.square,
            Orientation::Wide => &self.wide,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Master asset directory
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Watermark directory, relative to `root`
    #[serde(default = "default_watermarks_dir")]
    pub watermarks_dir: PathBuf,

    /// Logo directory, relative to `root`
    #[serde(default = "default_logos_dir")]
    pub logos_dir: PathBuf,

    #[serde(default)]
    pub orientation_dirs: OrientationDirs,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            watermarks_dir: default_watermarks_dir(),
            logos_dir: default_logos_dir(),
            orientation_dirs: OrientationDirs::default(),
        }
    }
}

impl AssetsConfig {
    /// Layout rooted at `root` with the default sub-directories.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn watermark_dir(&self, orientation: Orientation) -> PathBuf {
        self.root
            .join(&self.watermarks_dir)
            .join(self.orientation_dirs.get(orientation))
    }

    pub fn logo_dir(&self) -> PathBuf {
        self.root.join(&self.logos_dir)
    }

    /// Stored references may be absolute or relative to the asset root.
    pub fn locate(&self, reference: &Path) -> PathBuf {
        if reference.is_absolute() {
            reference.to_path_buf()
        } else {
            self.root.join(reference)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for orientation in Orientation::ALL {
            let dir = self.orientation_dirs.get(orientation);
            if dir.trim().is_empty() {
                return Err(format!(
                    "assets.orientation_dirs.{} cannot be empty",
                    orientation
                ));
            }
        }

        if self.root.as_os_str().is_empty() {
            return Err("assets.root cannot be empty".to_string());
        }

        Ok(())
    }
}
