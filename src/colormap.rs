//! Colour maps and `.pal` palette loading.
//!
//! Palettes are stored as normalized colour stops and stretched over the
//! value range of each grid when sampled:
//!
//! - plain palettes have stops in `0..=1`, mapped linearly onto `min..=max`
//! - hinged palettes (land/sea) have stops in `-1..=1`; negative values scale
//!   by the deepest sample and positive values by the highest, so the
//!   coastline colour always sits at zero

use crate::assets;
use crate::error::StartupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colour map choices offered by the dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMap {
    Geo,
    Relief,
    Viridis,
    Ocean,
    Topo,
    Turbo,
    Jet,
}

impl ColorMap {
    pub const ALL: [ColorMap; 7] = [
        ColorMap::Geo,
        ColorMap::Relief,
        ColorMap::Viridis,
        ColorMap::Ocean,
        ColorMap::Topo,
        ColorMap::Turbo,
        ColorMap::Jet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorMap::Geo => "geo",
            ColorMap::Relief => "relief",
            ColorMap::Viridis => "viridis",
            ColorMap::Ocean => "ocean",
            ColorMap::Topo => "topo",
            ColorMap::Turbo => "turbo",
            ColorMap::Jet => "jet",
        }
    }

    fn asset_path(self) -> String {
        format!("palettes/{}.pal", self.as_str())
    }
}

impl fmt::Display for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorMap::ALL
            .into_iter()
            .find(|map| map.as_str() == s)
            .ok_or_else(|| format!("unknown colour map '{s}'"))
    }
}

/// A single color stop along the normalized domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub v: f32,
    pub rgb: [u8; 3],
}

/// Continuous palette with strictly increasing stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    stops: Vec<ColorStop>,
}

impl Palette {
    /// Hinged palettes carry stops below zero.
    pub fn is_hinged(&self) -> bool {
        self.stops[0].v < 0.0
    }

    /// Colour for `value` on a grid whose samples span `min..=max`.
    ///
    /// NaN samples come back as `None`.
    pub fn color(&self, value: f32, min: f32, max: f32) -> Option<[u8; 3]> {
        if value.is_nan() {
            return None;
        }
        let t = if self.is_hinged() {
            if value < 0.0 {
                if min < 0.0 { -(value / min) } else { 0.0 }
            } else if max > 0.0 {
                value / max
            } else {
                0.0
            }
        } else if max > min {
            (value - min) / (max - min)
        } else {
            0.5
        };
        Some(self.sample(t))
    }

    /// Linear interpolation between stops, clamped to the end stops.
    pub fn sample(&self, t: f32) -> [u8; 3] {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t <= first.v {
            return first.rgb;
        }
        if t >= last.v {
            return last.rgb;
        }
        let upper = self.stops.partition_point(|stop| stop.v <= t);
        let (a, b) = (self.stops[upper - 1], self.stops[upper]);
        let f = (t - a.v) / (b.v - a.v);
        let lerp = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * f).round() as u8;
        [
            lerp(a.rgb[0], b.rgb[0]),
            lerp(a.rgb[1], b.rgb[1]),
            lerp(a.rgb[2], b.rgb[2]),
        ]
    }
}

/// Parse a `.pal` continuous palette.
///
/// Format: lines of `value  #RRGGBB`, blank lines and `#` comments are ignored.
pub fn parse_pal(src: &str) -> Result<Palette, String> {
    let mut stops: Vec<ColorStop> = Vec::new();
    for (lineno, raw) in src.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut toks = line.split_whitespace();
        let v_str = toks
            .next()
            .ok_or_else(|| format!("line {} missing value", lineno + 1))?;
        let v: f32 = v_str
            .parse()
            .map_err(|_| format!("line {} bad value '{}'", lineno + 1, v_str))?;
        let col_tok = toks
            .next()
            .ok_or_else(|| format!("line {} missing color", lineno + 1))?;
        let rgb = parse_hex_rgb(col_tok).map_err(|e| format!("line {} {}", lineno + 1, e))?;
        stops.push(ColorStop { v, rgb });
    }
    if stops.len() < 2 {
        return Err("need at least two stops".to_string());
    }
    if let Some(i) = (1..stops.len()).find(|&i| stops[i].v <= stops[i - 1].v) {
        return Err(format!("values must be strictly increasing at index {i}"));
    }
    let (lo, hi) = (stops[0].v, stops[stops.len() - 1].v);
    if !(lo == 0.0 || lo == -1.0) || hi != 1.0 {
        return Err(format!("stops must span 0..1 or -1..1, got {lo}..{hi}"));
    }
    Ok(Palette { stops })
}

fn parse_hex_rgb(tok: &str) -> Result<[u8; 3], String> {
    let hex = tok
        .strip_prefix('#')
        .ok_or_else(|| "expected #RRGGBB".to_string())?;
    if hex.len() != 6 {
        return Err("expected 6 hex digits".to_string());
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| format!("bad hex colour '{tok}'"))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// All colour maps, parsed once at startup.
#[derive(Debug, Clone)]
pub struct Palettes {
    palettes: Vec<(ColorMap, Palette)>,
}

impl Palettes {
    pub fn embedded() -> Result<Self, StartupError> {
        let palettes = ColorMap::ALL
            .into_iter()
            .map(|map| {
                let bytes = assets::load_bytes(&map.asset_path())?;
                let palette_error = |reason: String| StartupError::Palette {
                    name: map.to_string(),
                    reason,
                };
                let src = std::str::from_utf8(&bytes).map_err(|e| palette_error(e.to_string()))?;
                let palette = parse_pal(src).map_err(palette_error)?;
                Ok((map, palette))
            })
            .collect::<Result<_, StartupError>>()?;
        Ok(Self { palettes })
    }

    pub fn get(&self, map: ColorMap) -> &Palette {
        self.palettes
            .iter()
            .find(|(candidate, _)| *candidate == map)
            .map(|(_, palette)| palette)
            .unwrap_or(&self.palettes[0].1)
    }
}
