//! Optional RON configuration.
//!
//! Looked up at `<config dir>/relief-dashboard/config.ron` unless a path is
//! given. Every field has a default, so a missing file is not an error.
//!
//! ```ron
//! (
//!     boxes: Some("/data/country-boundingboxes.csv"),
//!     relief: Erddap(
//!         base_url: "https://coastwatch.pfeg.noaa.gov/erddap",
//!         dataset_180: "etopo180",
//!         dataset_360: "etopo360",
//!         variable: "altitude",
//!     ),
//!     geoid: Directory(path: "/data/grids"),
//! )
//! ```

use crate::error::StartupError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "relief-dashboard";
const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceConfig {
    Erddap {
        base_url: String,
        dataset_180: String,
        dataset_360: String,
        variable: String,
    },
    Directory {
        path: PathBuf,
    },
}

impl SourceConfig {
    pub fn noaa_etopo() -> Self {
        SourceConfig::Erddap {
            base_url: "https://coastwatch.pfeg.noaa.gov/erddap".to_string(),
            dataset_180: "etopo180".to_string(),
            dataset_360: "etopo360".to_string(),
            variable: "altitude".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bounding-box CSV replacing the embedded table.
    pub boxes: Option<PathBuf>,
    pub relief: SourceConfig,
    pub geoid: SourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            boxes: None,
            relief: SourceConfig::noaa_etopo(),
            geoid: SourceConfig::Directory {
                path: default_data_dir(),
            },
        }
    }
}

impl Config {
    /// Reads `path`, or the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file yields the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, StartupError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    log::debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        log::info!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|source| StartupError::Io {
            path: path.clone(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| StartupError::Config { path, source })
    }

    /// Serves both datasets from ESRI ASCII files in `dir`.
    pub fn with_data_dir(self, dir: &Path) -> Self {
        Self {
            relief: SourceConfig::Directory {
                path: dir.to_path_buf(),
            },
            geoid: SourceConfig::Directory {
                path: dir.to_path_buf(),
            },
            ..self
        }
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Where `fetch_grids` stores grids and the directory source looks for them.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("grids")
}
