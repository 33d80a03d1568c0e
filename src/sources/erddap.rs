//! Grids fetched from an ERDDAP `griddap` server as JSON tables.
//!
//! The served datasets are global 1 arc-minute grids, one in -180..180 and
//! one in 0..360 longitudes. A resolution is obtained by striding over the
//! source nodes; a region crossing both 0° and 180°, or running west of
//! -180°, is fetched in two parts and joined.

use crate::error::{DataUnavailable, StartupError};
use crate::grid::{Grid, GridRequest, GridSource};
use crate::region::Region;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = "relief-dashboard";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Deserialize)]
struct TableResponse {
    table: Table,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Table {
    column_names: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

pub struct ErddapSource {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    base_url: String,
    dataset_180: String,
    dataset_360: String,
    variable: String,
}

impl ErddapSource {
    pub fn new(
        base_url: &str,
        dataset_180: &str,
        dataset_360: &str,
        variable: &str,
    ) -> Result<Self, StartupError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StartupError::Runtime)?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(StartupError::HttpClient)?;

        Ok(Self {
            client,
            runtime,
            base_url: base_url.trim_end_matches('/').to_string(),
            dataset_180: dataset_180.to_string(),
            dataset_360: dataset_360.to_string(),
            variable: variable.to_string(),
        })
    }

    fn query_url(&self, dataset: &str, region: Region, stride: u32) -> String {
        format!(
            "{}/griddap/{dataset}.json?{}%5B({}):{stride}:({})%5D%5B({}):{stride}:({})%5D",
            self.base_url, self.variable, region.south, region.north, region.west, region.east
        )
    }

    /// Which dataset serves which part of `region`, with the longitude
    /// shift that moves each fetched part back into the requested frame.
    fn parts(&self, region: Region) -> Vec<(&str, Region, f64)> {
        if region.west < -180.0 {
            let wrapped = region.translated(360.0, 0.0);
            if region.east <= -180.0 {
                return vec![(self.dataset_180.as_str(), wrapped, -360.0)];
            }
            return vec![
                (
                    self.dataset_180.as_str(),
                    Region {
                        east: 180.0,
                        ..wrapped
                    },
                    -360.0,
                ),
                (
                    self.dataset_180.as_str(),
                    Region {
                        west: -180.0,
                        ..region
                    },
                    0.0,
                ),
            ];
        }

        if region.east <= 180.0 {
            vec![(self.dataset_180.as_str(), region, 0.0)]
        } else if region.west >= 0.0 {
            vec![(self.dataset_360.as_str(), region, 0.0)]
        } else {
            vec![
                (
                    self.dataset_180.as_str(),
                    Region {
                        east: 180.0,
                        ..region
                    },
                    0.0,
                ),
                (
                    self.dataset_360.as_str(),
                    Region {
                        west: 180.0,
                        ..region
                    },
                    0.0,
                ),
            ]
        }
    }

    async fn fetch(&self, url: &str) -> Result<Grid, DataUnavailable> {
        log::info!("Fetching {url}");
        let request_error = |source| DataUnavailable::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;
        if !response.status().is_success() {
            return Err(DataUnavailable::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let body = response.text().await.map_err(request_error)?;
        parse_table(&body, &self.variable)
    }
}

impl GridSource for ErddapSource {
    fn load(&self, request: &GridRequest) -> Result<Grid, DataUnavailable> {
        request.validate()?;
        let stride = request.resolution.arc_minutes();

        let mut grids = Vec::new();
        for (dataset, part, shift) in self.parts(request.region) {
            let url = self.query_url(dataset, part, stride);
            grids.push(self.runtime.block_on(self.fetch(&url))?.shifted(shift));
        }

        let mut grids = grids.into_iter();
        let first = grids.next().ok_or(DataUnavailable::Empty {
            region: request.region,
        })?;
        grids.try_fold(first, |west, east| join_columns(&west, &east))
    }
}

/// Decodes an ERDDAP JSON table of `latitude, longitude, <variable>` rows,
/// longitude varying fastest.
pub fn parse_table(body: &str, variable: &str) -> Result<Grid, DataUnavailable> {
    let response: TableResponse = serde_json::from_str(body)
        .map_err(|err| DataUnavailable::Malformed(format!("ERDDAP table: {err}")))?;
    let table = response.table;

    let column = |name: &str| {
        table
            .column_names
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataUnavailable::Malformed(format!("ERDDAP table has no '{name}' column")))
    };
    let (lat_col, lon_col, value_col) = (column("latitude")?, column("longitude")?, column(variable)?);

    let cell = |row: &[Option<f64>], col: usize| row.get(col).copied().flatten();
    let coord = |row: &[Option<f64>], col: usize| {
        cell(row, col).ok_or_else(|| DataUnavailable::Malformed("missing coordinate".to_string()))
    };

    let first = table
        .rows
        .first()
        .ok_or_else(|| DataUnavailable::Malformed("ERDDAP table has no rows".to_string()))?;
    let first_lat = coord(first, lat_col)?;
    let width = table
        .rows
        .iter()
        .position(|row| cell(row, lat_col) != Some(first_lat))
        .unwrap_or(table.rows.len());
    if table.rows.len() % width != 0 {
        return Err(DataUnavailable::Malformed(format!(
            "{} rows do not form a grid {width} nodes wide",
            table.rows.len()
        )));
    }
    let height = table.rows.len() / width;

    let west = coord(first, lon_col)?;
    let east = coord(&table.rows[width - 1], lon_col)?;
    let last_lat = coord(&table.rows[table.rows.len() - 1], lat_col)?;
    let south_first = last_lat >= first_lat;

    let mut values = Vec::with_capacity(table.rows.len());
    for r in 0..height {
        let row = if south_first { height - 1 - r } else { r };
        values.extend(
            table.rows[row * width..(row + 1) * width]
                .iter()
                .map(|cells| cell(cells, value_col).map_or(f32::NAN, |v| v as f32)),
        );
    }

    let region = Region::new(
        west,
        east,
        first_lat.min(last_lat),
        first_lat.max(last_lat),
    );
    Grid::new(region, width, height, values)
}

/// Places `east` to the right of `west`, dropping a shared seam column.
fn join_columns(west: &Grid, east: &Grid) -> Result<Grid, DataUnavailable> {
    if west.height() != east.height() {
        return Err(DataUnavailable::Malformed(format!(
            "cannot join grids of {} and {} rows",
            west.height(),
            east.height()
        )));
    }
    let seam = usize::from((east.region().west - west.region().east).abs() < 1e-6);
    let width = west.width() + east.width() - seam;

    let mut values = Vec::with_capacity(width * west.height());
    for row in 0..west.height() {
        values.extend((0..west.width()).map(|col| west.value(col, row)));
        values.extend((seam..east.width()).map(|col| east.value(col, row)));
    }
    let region = Region {
        east: east.region().east,
        ..west.region()
    };
    Grid::new(region, width, west.height(), values)
}
