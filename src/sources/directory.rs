//! Grids read from ESRI ASCII files in a local directory.
//!
//! One global file per dataset and resolution, named like
//! `earth_relief_01d.asc`. Files are parsed once and kept in memory; each
//! request is cut out of the cached grid.

use crate::error::DataUnavailable;
use crate::grid::{Dataset, Grid, GridRequest, GridSource, Resolution};
use crate::region::Region;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

pub fn grid_file_name(dataset: Dataset, resolution: Resolution) -> String {
    format!("{dataset}_{resolution}.asc")
}

pub struct DirectorySource {
    root: PathBuf,
    cache: Mutex<HashMap<(Dataset, Resolution), Arc<Grid>>>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn global(&self, dataset: Dataset, resolution: Resolution) -> Result<Arc<Grid>, DataUnavailable> {
        let key = (dataset, resolution);
        if let Some(grid) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(grid.clone());
        }

        let path = self.root.join(grid_file_name(dataset, resolution));
        if !path.is_file() {
            return Err(DataUnavailable::MissingFile {
                dataset,
                resolution,
                path,
            });
        }
        log::info!("Reading {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|source| DataUnavailable::Io {
            path: path.clone(),
            source,
        })?;
        let grid = Arc::new(parse_esri_ascii(&text)?);

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, grid.clone());
        Ok(grid)
    }
}

impl GridSource for DirectorySource {
    fn load(&self, request: &GridRequest) -> Result<Grid, DataUnavailable> {
        request.validate()?;
        let global = self.global(request.dataset, request.resolution)?;
        let step = global.region().width() / (global.width().max(2) - 1) as f64;
        cut(&global, request.region, step)
    }
}

/// Parses an ESRI ASCII raster (`ncols`, `nrows`, `xllcenter`/`xllcorner`,
/// `yllcenter`/`yllcorner`, `cellsize`, optional `nodata_value`, then rows
/// from north to south).
pub fn parse_esri_ascii(text: &str) -> Result<Grid, DataUnavailable> {
    let malformed = |msg: String| DataUnavailable::Malformed(format!("ESRI ASCII grid: {msg}"));

    let mut header: HashMap<String, f64> = HashMap::new();
    let mut tokens = text.split_whitespace().peekable();
    while let Some(&token) = tokens.peek() {
        if !token.starts_with(|c: char| c.is_ascii_alphabetic()) {
            break;
        }
        tokens.next();
        let value = tokens
            .next()
            .ok_or_else(|| malformed(format!("'{token}' has no value")))?;
        let value: f64 = value
            .parse()
            .map_err(|_| malformed(format!("'{token}' value '{value}' is not a number")))?;
        header.insert(token.to_ascii_lowercase(), value);
    }

    let field = |name: &str| {
        header
            .get(name)
            .copied()
            .ok_or_else(|| malformed(format!("missing '{name}'")))
    };
    let ncols = field("ncols")? as usize;
    let nrows = field("nrows")? as usize;
    let cellsize = field("cellsize")?;
    let nodata = header.get("nodata_value").copied();
    let (x0, y0) = match (header.get("xllcenter"), header.get("yllcenter")) {
        (Some(&x), Some(&y)) => (x, y),
        _ => (
            field("xllcorner")? + cellsize / 2.0,
            field("yllcorner")? + cellsize / 2.0,
        ),
    };

    let values = tokens
        .map(|token| {
            let value: f64 = token
                .parse()
                .map_err(|_| malformed(format!("'{token}' is not a number")))?;
            Ok(if nodata == Some(value) {
                f32::NAN
            } else {
                value as f32
            })
        })
        .collect::<Result<Vec<f32>, DataUnavailable>>()?;

    let region = Region::new(
        x0,
        x0 + (ncols.saturating_sub(1)) as f64 * cellsize,
        y0,
        y0 + (nrows.saturating_sub(1)) as f64 * cellsize,
    );
    Grid::new(region, ncols, nrows, values)
}

/// Samples `source` on nodes `step` degrees apart covering `region`.
fn cut(source: &Grid, region: Region, step: f64) -> Result<Grid, DataUnavailable> {
    let width = (region.width() / step).round() as usize + 1;
    let height = (region.length() / step).round() as usize + 1;
    let mut values = Vec::with_capacity(width * height);
    for row in 0..height {
        let lat = region.north - row as f64 * region.length() / (height - 1).max(1) as f64;
        for col in 0..width {
            let lon = region.west + col as f64 * region.width() / (width - 1).max(1) as f64;
            values.push(source.sample(lon, lat).unwrap_or(f32::NAN));
        }
    }
    if values.iter().all(|v| v.is_nan()) {
        return Err(DataUnavailable::Empty { region });
    }
    Grid::new(region, width, height, values)
}
