//! Concrete [`GridSource`]s and the per-dataset router the dashboards use.

pub mod directory;
pub mod erddap;

pub use directory::DirectorySource;
pub use erddap::ErddapSource;

use crate::config::{Config, SourceConfig};
use crate::error::{DataUnavailable, StartupError};
use crate::grid::{Dataset, Grid, GridRequest, GridSource};

/// Routes relief and geoid requests to their own sources.
pub struct DatasetSources {
    relief: Box<dyn GridSource>,
    geoid: Box<dyn GridSource>,
}

impl DatasetSources {
    pub fn new(relief: Box<dyn GridSource>, geoid: Box<dyn GridSource>) -> Self {
        Self { relief, geoid }
    }

    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        Ok(Self::new(build(&config.relief)?, build(&config.geoid)?))
    }
}

impl GridSource for DatasetSources {
    fn load(&self, request: &GridRequest) -> Result<Grid, DataUnavailable> {
        match request.dataset {
            Dataset::Relief => self.relief.load(request),
            Dataset::Geoid => self.geoid.load(request),
        }
    }
}

fn build(config: &SourceConfig) -> Result<Box<dyn GridSource>, StartupError> {
    Ok(match config {
        SourceConfig::Erddap {
            base_url,
            dataset_180,
            dataset_360,
            variable,
        } => {
            log::info!("Using ERDDAP server {base_url} ({dataset_180}, {dataset_360})");
            Box::new(ErddapSource::new(base_url, dataset_180, dataset_360, variable)?)
        }
        SourceConfig::Directory { path } => {
            log::info!("Using grid directory {}", path.display());
            Box::new(DirectorySource::new(path))
        }
    })
}
