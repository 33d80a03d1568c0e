//! Elevation/geoid grids and the trait through which they are fetched.

use crate::error::DataUnavailable;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which global dataset a grid comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Dataset {
    /// Land elevation and ocean bathymetry, metres.
    Relief,
    /// Geoid height above the reference ellipsoid, metres.
    Geoid,
}

impl Dataset {
    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::Relief => "earth_relief",
            Dataset::Geoid => "earth_geoid",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Angular spacing between grid nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "01d")]
    OneDegree,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "20m")]
    TwentyMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "05m")]
    FiveMinutes,
    #[serde(rename = "02m")]
    TwoMinutes,
}

impl Resolution {
    /// Coarsest first.
    pub const ALL: [Resolution; 7] = [
        Resolution::OneDegree,
        Resolution::ThirtyMinutes,
        Resolution::TwentyMinutes,
        Resolution::FifteenMinutes,
        Resolution::TenMinutes,
        Resolution::FiveMinutes,
        Resolution::TwoMinutes,
    ];

    pub fn arc_minutes(self) -> u32 {
        match self {
            Resolution::OneDegree => 60,
            Resolution::ThirtyMinutes => 30,
            Resolution::TwentyMinutes => 20,
            Resolution::FifteenMinutes => 15,
            Resolution::TenMinutes => 10,
            Resolution::FiveMinutes => 5,
            Resolution::TwoMinutes => 2,
        }
    }

    pub fn degrees(self) -> f64 {
        f64::from(self.arc_minutes()) / 60.0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::OneDegree => "01d",
            Resolution::ThirtyMinutes => "30m",
            Resolution::TwentyMinutes => "20m",
            Resolution::FifteenMinutes => "15m",
            Resolution::TenMinutes => "10m",
            Resolution::FiveMinutes => "05m",
            Resolution::TwoMinutes => "02m",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resolution::ALL
            .into_iter()
            .find(|res| res.as_str() == s)
            .ok_or_else(|| format!("unknown resolution '{s}'"))
    }
}

/// What a renderer asks a [`GridSource`] for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRequest {
    pub dataset: Dataset,
    pub resolution: Resolution,
    pub region: Region,
}

impl GridRequest {
    /// Rejects regions no global dataset can serve.
    ///
    /// Longitudes may run past either antimeridian (Oceania at 105..220, a
    /// world panned west at -200..160) as long as the span fits in one turn
    /// of the globe.
    pub fn validate(&self) -> Result<(), DataUnavailable> {
        let region = self.region;
        let invalid = |reason| DataUnavailable::InvalidRegion { region, reason };

        if region.to_array().iter().any(|v| !v.is_finite()) {
            return Err(invalid("bounds are not finite"));
        }
        if region.is_degenerate() {
            return Err(invalid("region has no area"));
        }
        if region.south < -90.0 || region.north > 90.0 {
            return Err(invalid("latitude outside [-90, 90]"));
        }
        if region.west < -360.0 || region.east > 360.0 {
            return Err(invalid("longitude outside [-360, 360]"));
        }
        if region.width() > 360.0 {
            return Err(invalid("longitude span exceeds 360 degrees"));
        }
        Ok(())
    }
}

/// A regular lon/lat grid of samples, stored row-major from north to south.
///
/// `region` spans the outermost nodes: column 0 sits on `west`, the last
/// column on `east`, row 0 on `north`, the last row on `south`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    region: Region,
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl Grid {
    pub fn new(
        region: Region,
        width: usize,
        height: usize,
        values: Vec<f32>,
    ) -> Result<Self, DataUnavailable> {
        if width == 0 || height == 0 {
            return Err(DataUnavailable::Empty { region });
        }
        if values.len() != width * height {
            return Err(DataUnavailable::Malformed(format!(
                "expected {width}x{height} = {} values, got {}",
                width * height,
                values.len()
            )));
        }
        Ok(Self {
            region,
            width,
            height,
            values,
        })
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn value(&self, col: usize, row: usize) -> f32 {
        self.values[row * self.width + col]
    }

    /// Longitude at a (possibly fractional) column.
    pub fn lon_at(&self, col: f64) -> f64 {
        if self.width < 2 {
            return self.region.west;
        }
        self.region.west + col * self.region.width() / (self.width - 1) as f64
    }

    /// Latitude at a (possibly fractional) row.
    pub fn lat_at(&self, row: f64) -> f64 {
        if self.height < 2 {
            return self.region.north;
        }
        self.region.north - row * self.region.length() / (self.height - 1) as f64
    }

    /// Minimum and maximum over non-NaN samples.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Bilinear sample at a geographic position.
    ///
    /// Longitudes are wrapped by 360 degrees into the grid's span, so a
    /// global grid answers for any longitude.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<f32> {
        if self.width < 2 || self.height < 2 {
            return None;
        }
        let mut lon = lon;
        while lon < self.region.west {
            lon += 360.0;
        }
        while lon > self.region.east && lon - 360.0 >= self.region.west {
            lon -= 360.0;
        }
        if lon > self.region.east || lat < self.region.south || lat > self.region.north {
            return None;
        }

        let fx = (lon - self.region.west) / self.region.width() * (self.width - 1) as f64;
        let fy = (self.region.north - lat) / self.region.length() * (self.height - 1) as f64;
        let x0 = (fx.floor() as usize).min(self.width - 2);
        let y0 = (fy.floor() as usize).min(self.height - 2);
        let tx = (fx - x0 as f64) as f32;
        let ty = (fy - y0 as f64) as f32;

        let top = self.value(x0, y0) * (1.0 - tx) + self.value(x0 + 1, y0) * tx;
        let bottom = self.value(x0, y0 + 1) * (1.0 - tx) + self.value(x0 + 1, y0 + 1) * tx;
        let v = top * (1.0 - ty) + bottom * ty;
        (!v.is_nan()).then_some(v)
    }

    /// The same samples placed `d_lon` degrees east.
    pub fn shifted(self, d_lon: f64) -> Grid {
        Grid {
            region: self.region.translated(d_lon, 0.0),
            ..self
        }
    }

    /// Keeps every n-th node so the grid fits within `max_width` x `max_height`.
    ///
    /// The last column and row are always kept so the extent is preserved.
    pub fn thinned(&self, max_width: usize, max_height: usize) -> Grid {
        let step_x = self.width.div_ceil(max_width.max(2)).max(1);
        let step_y = self.height.div_ceil(max_height.max(2)).max(1);
        if step_x == 1 && step_y == 1 {
            return self.clone();
        }

        let cols = keep_indices(self.width, step_x);
        let rows = keep_indices(self.height, step_y);
        let mut values = Vec::with_capacity(cols.len() * rows.len());
        for &row in &rows {
            values.extend(cols.iter().map(|&col| self.value(col, row)));
        }

        Grid {
            region: self.region,
            width: cols.len(),
            height: rows.len(),
            values,
        }
    }
}

fn keep_indices(len: usize, step: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).step_by(step).collect();
    if indices.last() != Some(&(len - 1)) {
        indices.push(len - 1);
    }
    indices
}

/// External supplier of elevation and geoid grids.
///
/// Calls may block on network or disk I/O. Implementations never retry;
/// a failure is reported once as [`DataUnavailable`].
pub trait GridSource: Send + Sync {
    fn load(&self, request: &GridRequest) -> Result<Grid, DataUnavailable>;

    fn load_relief(&self, resolution: Resolution, region: Region) -> Result<Grid, DataUnavailable> {
        self.load(&GridRequest {
            dataset: Dataset::Relief,
            resolution,
            region,
        })
    }

    fn load_geoid(&self, resolution: Resolution, region: Region) -> Result<Grid, DataUnavailable> {
        self.load(&GridRequest {
            dataset: Dataset::Geoid,
            resolution,
            region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Grid {
        let values = (0..width * height).map(|i| i as f32).collect();
        Grid::new(Region::new(0.0, 10.0, 0.0, 5.0), width, height, values).unwrap()
    }

    #[test]
    fn new_checks_sample_count() {
        assert!(matches!(
            Grid::new(Region::GLOBE, 2, 2, vec![0.0; 3]),
            Err(DataUnavailable::Malformed(_))
        ));
        assert!(matches!(
            Grid::new(Region::GLOBE, 0, 2, vec![]),
            Err(DataUnavailable::Empty { .. })
        ));
    }

    #[test]
    fn node_coordinates_span_region() {
        let grid = ramp(11, 6);
        assert_eq!(grid.lon_at(0.0), 0.0);
        assert_eq!(grid.lon_at(10.0), 10.0);
        assert_eq!(grid.lat_at(0.0), 5.0);
        assert_eq!(grid.lat_at(5.0), 0.0);
    }

    #[test]
    fn sample_interpolates_and_wraps() {
        let values = vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0];
        let grid = Grid::new(Region::new(-180.0, 180.0, -90.0, 90.0), 3, 2, values).unwrap();
        // Row 0 is north.
        assert_eq!(grid.sample(-180.0, 90.0), Some(0.0));
        assert_eq!(grid.sample(-90.0, 90.0), Some(5.0));
        assert_eq!(grid.sample(0.0, 0.0), Some(25.0));
        assert_eq!(grid.sample(270.0, 90.0), Some(5.0));
        assert_eq!(grid.sample(0.0, 95.0), None);
    }

    #[test]
    fn shifted_moves_only_the_extent() {
        let grid = ramp(3, 2).shifted(-360.0);
        assert_eq!(grid.region(), Region::new(-360.0, -350.0, 0.0, 5.0));
        assert_eq!(grid.value(2, 1), ramp(3, 2).value(2, 1));
    }

    #[test]
    fn thinned_keeps_edges() {
        let grid = ramp(11, 6).thinned(4, 3);
        assert!(grid.width() <= 5);
        assert_eq!(grid.region(), Region::new(0.0, 10.0, 0.0, 5.0));
        assert_eq!(grid.value(0, 0), 0.0);
        assert_eq!(grid.value(grid.width() - 1, grid.height() - 1), 65.0);
    }

    #[test]
    fn min_max_ignores_nan() {
        let grid = Grid::new(Region::GLOBE, 2, 2, vec![f32::NAN, -3.0, 7.0, 1.0]).unwrap();
        assert_eq!(grid.min_max(), Some((-3.0, 7.0)));
    }

    #[test]
    fn validate_rejects_out_of_range_regions() {
        let request = |region| GridRequest {
            dataset: Dataset::Relief,
            resolution: Resolution::OneDegree,
            region,
        };
        assert!(request(Region::new(-28.0, 53.0, 34.0, 71.0)).validate().is_ok());
        assert!(request(Region::new(105.0, 220.0, -55.0, 20.0)).validate().is_ok());
        assert!(request(Region::new(-225.0, 135.0, -80.0, 85.0)).validate().is_ok());
        for bad in [
            Region::new(-370.0, -300.0, -80.0, 85.0),
            Region::new(-180.0, 180.0, -35.0, 130.0),
            Region::new(10.0, 10.0, 0.0, 5.0),
            Region::new(-180.0, 200.0, 0.0, 5.0),
        ] {
            assert!(matches!(
                request(bad).validate(),
                Err(DataUnavailable::InvalidRegion { .. })
            ));
        }
    }

    #[test]
    fn resolution_round_trips_through_strings() {
        for res in Resolution::ALL {
            assert_eq!(res.as_str().parse::<Resolution>(), Ok(res));
        }
        assert!("03m".parse::<Resolution>().is_err());
    }
}
