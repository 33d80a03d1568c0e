//! The render artifact: a raster layer plus vector overlays.
//!
//! Overlay coordinates are in raster pixel space (`0..width`, `0..height`,
//! y down) so a viewer can scale everything with one transform.

use crate::region::Region;
use image::RgbaImage;

/// A contour polyline in raster pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub level: f32,
    pub points: Vec<[f32; 2]>,
    pub closed: bool,
}

/// Text placed along a contour line.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub position: [f32; 2],
    /// Radians, clockwise in screen space, kept within ±90° so text reads upright.
    pub angle: f32,
    pub text: String,
}

/// A free-standing text label, e.g. a region name.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub position: [f32; 2],
    pub text: String,
}

/// Colour scale legend.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBar {
    pub label: String,
    pub unit: String,
    pub min: f32,
    pub max: f32,
    pub tick_interval: f32,
    /// Evenly spaced colours from `min` to `max`.
    pub colors: Vec<[u8; 3]>,
}

impl ColorBar {
    /// Multiples of the tick interval within `min..=max`.
    pub fn ticks(&self) -> Vec<f32> {
        multiples_within(
            f64::from(self.min),
            f64::from(self.max),
            f64::from(self.tick_interval),
        )
        .into_iter()
        .map(|v| v as f32)
        .collect()
    }
}

/// Longitude/latitude frame around a plate carrée raster whose pixels are
/// grid nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub region: Region,
    pub nodes: [usize; 2],
    pub tick_interval: f64,
}

impl Axes {
    pub fn new(region: Region, nodes: [usize; 2]) -> Self {
        let span = region.width().max(region.length());
        Self {
            region,
            nodes,
            tick_interval: auto_tick_interval(span),
        }
    }

    pub fn x_of(&self, lon: f64) -> f32 {
        let steps = self.nodes[0].saturating_sub(1) as f64;
        (0.5 + (lon - self.region.west) / self.region.width() * steps) as f32
    }

    pub fn y_of(&self, lat: f64) -> f32 {
        let steps = self.nodes[1].saturating_sub(1) as f64;
        (0.5 + (self.region.north - lat) / self.region.length() * steps) as f32
    }

    pub fn lon_ticks(&self) -> Vec<f64> {
        multiples_within(self.region.west, self.region.east, self.tick_interval)
    }

    pub fn lat_ticks(&self) -> Vec<f64> {
        multiples_within(self.region.south, self.region.north, self.tick_interval)
    }
}

/// A rendered figure. Immutable once produced.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub raster: RgbaImage,
    pub contours: Vec<Polyline>,
    pub annotations: Vec<Annotation>,
    pub labels: Vec<TextLabel>,
    pub colorbar: Option<ColorBar>,
    pub axes: Option<Axes>,
}

impl Figure {
    pub fn new(title: impl Into<String>, raster: RgbaImage) -> Self {
        Self {
            title: title.into(),
            raster,
            contours: Vec::new(),
            annotations: Vec::new(),
            labels: Vec::new(),
            colorbar: None,
            axes: None,
        }
    }

    /// A 1x1 transparent figure.
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, RgbaImage::new(1, 1))
    }

    pub fn size(&self) -> [u32; 2] {
        [self.raster.width(), self.raster.height()]
    }
}

/// Picks a 1-2-5-ish degree spacing giving at most six ticks.
pub fn auto_tick_interval(span: f64) -> f64 {
    const STEPS: [f64; 12] = [
        0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 30.0, 45.0, 60.0,
    ];
    STEPS
        .into_iter()
        .find(|step| span / step <= 6.0)
        .unwrap_or(90.0)
}

fn multiples_within(min: f64, max: f64, interval: f64) -> Vec<f64> {
    if interval.is_nan() || interval <= 0.0 || min.is_nan() || max.is_nan() || max < min {
        return Vec::new();
    }
    let first = (min / interval).ceil() as i64;
    let last = (max / interval).floor() as i64;
    (first..=last).map(|k| k as f64 * interval).collect()
}
