//! Error taxonomy shared by the library and the binaries.

use crate::grid::{Dataset, Resolution};
use crate::params::ParamName;
use crate::region::Region;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while the process is starting up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("bounding box table not found: {0}")]
    BoxesNotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("bounding box table is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("bounding box table line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
    #[error("bounding box table has no rows")]
    EmptyTable,
    #[error("region '{0}' is required by this dashboard but not in the bounding box table")]
    MissingRegion(String),
    #[error("embedded asset not found: {0}")]
    AssetNotFound(String),
    #[error("palette {name}: {reason}")]
    Palette { name: String, reason: String },
    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        source: ron::de::SpannedError,
    },
    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),
}

/// A parameter change rejected by the store. The store is left unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfBounds {
        field: ParamName,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("'{value}' is not an option for {field}")]
    UnknownChoice { field: ParamName, value: String },
    #[error("{0} is not offered by this dashboard")]
    NotOffered(ParamName),
}

/// The grid source could not supply the requested region/resolution.
#[derive(Error, Debug)]
pub enum DataUnavailable {
    #[error("region {region} cannot be fetched: {reason}")]
    InvalidRegion { region: Region, reason: &'static str },
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("no {dataset} grid at {resolution} in {path} (fetch_grids downloads it)")]
    MissingFile {
        dataset: Dataset,
        resolution: Resolution,
        path: PathBuf,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed grid data: {0}")]
    Malformed(String),
    #[error("grid for {region} contains no samples")]
    Empty { region: Region },
}

/// Failure of a single render call. The previously displayed figure stays.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailable),
    #[error("region '{0}' is not in the bounding box table")]
    UnknownRegion(String),
}
