//! Geographic extents and the pan/zoom region calculation.

use crate::bbox::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic rectangle in degrees.
///
/// Unlike [`BoundingBox`], a region carries no invariant: pan and zoom may
/// push it past the poles or collapse it to a point. Sources validate it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Region {
    /// The whole globe in -180..180 longitudes.
    pub const GLOBE: Region = Region {
        west: -180.0,
        east: 180.0,
        south: -90.0,
        north: 90.0,
    };

    pub const fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn length(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    pub fn translated(&self, d_lon: f64, d_lat: f64) -> Self {
        Self::new(
            self.west + d_lon,
            self.east + d_lon,
            self.south + d_lat,
            self.north + d_lat,
        )
    }

    /// True when the region has no area on at least one axis.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.length() > 0.0)
    }

    /// `[west, east, south, north]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.east, self.south, self.north]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.west, self.east, self.south, self.north
        )
    }
}

/// Applies pan and zoom to a base bounding box.
///
/// The box is first shifted by the pan values, then shrunk (or grown) evenly
/// from both edges so that its centre stays on the shifted centre and its
/// width/length become the given percentage of the base width/length.
/// Nothing is clamped: the result may leave the globe or have zero area.
pub fn compute_region(
    base: &BoundingBox,
    zoom_width_pct: f64,
    zoom_length_pct: f64,
    pan_longitude: f64,
    pan_latitude: f64,
) -> Region {
    let shifted = base.region().translated(pan_longitude, pan_latitude);

    let base_width = shifted.width();
    let base_length = shifted.length();
    let new_width = base_width * zoom_width_pct / 100.0;
    let new_length = base_length * zoom_length_pct / 100.0;

    let half_dw = (base_width - new_width) / 2.0;
    let half_dl = (base_length - new_length) / 2.0;

    Region::new(
        shifted.west + half_dw,
        shifted.east - half_dw,
        shifted.south + half_dl,
        shifted.north - half_dl,
    )
}
