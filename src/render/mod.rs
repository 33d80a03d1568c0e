//! Render dispatcher: fetches a grid and turns it into a [`Figure`].
//!
//! Every renderer validates its request before touching the source, then
//! thins the grid so that figure size does not grow with resolution.

mod globe;
mod isolines;
mod raster;
mod relief;

pub use globe::render_globe;
pub use isolines::render_isolines;
pub use relief::render_relief;

use crate::colormap::{ColorMap, Palettes};
use crate::error::RenderError;
use crate::figure::Figure;
use crate::grid::{Dataset, Grid, GridRequest, GridSource, Resolution};
use crate::region::Region;

/// Isolines at multiples of this level carry a text annotation.
pub const ANNOTATION_INTERVAL: f32 = 1000.0;

/// Colour bar tick spacing for elevation, in metres.
pub const ELEVATION_TICK_INTERVAL: f32 = 2500.0;

/// A named point written onto a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceLabel {
    pub text: String,
    pub lon: f64,
    pub lat: f64,
}

/// Everything a renderer needs, resolved from the parameter store.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderSpec {
    Relief {
        region: Region,
        resolution: Resolution,
        color_map: ColorMap,
    },
    Isolines {
        region: Region,
        resolution: Resolution,
        color_map: ColorMap,
        interval: u32,
        colorbar: bool,
    },
    Globe {
        center_lon: f64,
        center_lat: f64,
        color_map: ColorMap,
        interval: u32,
        labels: Vec<PlaceLabel>,
    },
}

impl RenderSpec {
    /// Dataset the renderer will request.
    pub fn dataset(&self) -> Dataset {
        match self {
            RenderSpec::Globe {
                color_map: ColorMap::Ocean,
                ..
            } => Dataset::Geoid,
            _ => Dataset::Relief,
        }
    }
}

/// Runs the renderer described by `spec`.
pub fn execute(
    spec: &RenderSpec,
    source: &dyn GridSource,
    palettes: &Palettes,
) -> Result<Figure, RenderError> {
    match spec {
        RenderSpec::Relief {
            region,
            resolution,
            color_map,
        } => render_relief(source, palettes, *region, *resolution, *color_map),
        RenderSpec::Isolines {
            region,
            resolution,
            color_map,
            interval,
            colorbar,
        } => render_isolines(
            source,
            palettes,
            *region,
            *resolution,
            *color_map,
            *interval,
            *colorbar,
        ),
        RenderSpec::Globe {
            center_lon,
            center_lat,
            color_map,
            interval,
            labels,
        } => render_globe(
            source,
            palettes,
            (*center_lon, *center_lat),
            *color_map,
            *interval,
            labels,
        ),
    }
}

fn fetch(
    source: &dyn GridSource,
    dataset: Dataset,
    resolution: Resolution,
    region: Region,
) -> Result<Grid, RenderError> {
    let request = GridRequest {
        dataset,
        resolution,
        region,
    };
    request.validate()?;
    log::debug!("Loading {dataset} at {resolution} for {region}");
    Ok(source.load(&request)?)
}
