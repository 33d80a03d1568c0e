//! The bounding-box reference table, keyed by country/continent name.
//!
//! The table is a Latin-1 encoded CSV file with a header row. Columns are
//! located by name so their order does not matter:
//!
//! ```text
//! country,longmin,longmax,latmin,latmax
//! Europe,-28,53,34,71
//! ```

use crate::assets;
use crate::error::StartupError;
use crate::region::Region;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const COLUMNS: [&str; 5] = ["country", "longmin", "longmax", "latmin", "latmax"];

/// One table row, matched to the lowercased header.
#[derive(Debug, Deserialize)]
struct Row {
    country: String,
    longmin: f64,
    longmax: f64,
    latmin: f64,
    latmax: f64,
}

/// A validated extent: `west < east` and `south < north`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox(Region);

impl BoundingBox {
    /// Returns `None` unless the box has positive width and length.
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Option<Self> {
        let valid = [west, east, south, north].iter().all(|v| v.is_finite())
            && west < east
            && south < north;
        valid.then_some(Self(Region::new(west, east, south, north)))
    }

    pub fn region(&self) -> Region {
        self.0
    }

    /// Centre of the box, used to place region name labels.
    pub fn centroid(&self) -> (f64, f64) {
        self.0.center()
    }
}

/// Immutable table of named bounding boxes in file order.
#[derive(Debug, Clone)]
pub struct BoundingBoxTable {
    entries: Vec<(String, BoundingBox)>,
}

impl BoundingBoxTable {
    /// Loads the table embedded in the binary.
    pub fn embedded() -> Result<Self, StartupError> {
        let bytes = assets::load_bytes(assets::BOXES_CSV)?;
        Self::from_latin1(&bytes)
    }

    /// Loads the table from a file on disk.
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StartupError::BoxesNotFound(path.to_path_buf())
            } else {
                StartupError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let table = Self::from_latin1(&bytes)?;
        log::info!(
            "Loaded {} bounding boxes from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parses Latin-1 encoded CSV bytes.
    pub fn from_latin1(bytes: &[u8]) -> Result<Self, StartupError> {
        // Latin-1 maps every byte to the code point of the same value.
        let text: String = bytes.iter().map(|&b| char::from(b)).collect();
        Self::parse(&text)
    }

    fn parse(text: &str) -> Result<Self, StartupError> {
        if text.trim().is_empty() {
            return Err(StartupError::EmptyTable);
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: csv::StringRecord = reader
            .headers()
            .map_err(|err| malformed(&err, 1))?
            .iter()
            .map(str::to_ascii_lowercase)
            .collect();
        for name in COLUMNS {
            if !headers.iter().any(|col| col == name) {
                return Err(StartupError::MissingColumn(name));
            }
        }

        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for record in reader.records() {
            let record = record.map_err(|err| malformed(&err, 0))?;
            let line = record
                .position()
                .map_or(0, |pos| usize::try_from(pos.line()).unwrap_or(usize::MAX));
            let row: Row = record
                .deserialize(Some(&headers))
                .map_err(|err| StartupError::MalformedRow {
                    line,
                    reason: err.to_string(),
                })?;

            if row.country.is_empty() {
                return Err(StartupError::MalformedRow {
                    line,
                    reason: "empty region name".to_string(),
                });
            }
            let Row {
                country: name,
                longmin: west,
                longmax: east,
                latmin: south,
                latmax: north,
            } = row;

            let bbox = BoundingBox::new(west, east, south, north).ok_or_else(|| {
                StartupError::MalformedRow {
                    line,
                    reason: format!(
                        "'{name}' needs west < east and south < north, got {west}/{east}/{south}/{north}"
                    ),
                }
            })?;

            if !seen.insert(name.clone()) {
                return Err(StartupError::MalformedRow {
                    line,
                    reason: format!("duplicate region '{name}'"),
                });
            }
            entries.push((name, bbox));
        }

        if entries.is_empty() {
            return Err(StartupError::EmptyTable);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&BoundingBox> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, bbox)| bbox)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Region names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Line of a reader error, or `fallback` when the reader has none.
fn malformed(err: &csv::Error, fallback: usize) -> StartupError {
    let line = err
        .position()
        .map_or(fallback, |pos| usize::try_from(pos.line()).unwrap_or(usize::MAX));
    StartupError::MalformedRow {
        line,
        reason: err.to_string(),
    }
}
