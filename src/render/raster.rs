use crate::colormap::Palette;
use crate::contour::{self, Contour};
use crate::error::{DataUnavailable, RenderError};
use crate::figure::{Annotation, ColorBar, Polyline};
use crate::grid::{Dataset, Grid};
use image::{Rgba, RgbaImage};

const COLORBAR_STEPS: usize = 64;

/// Contours shorter than this many grid cells are left unannotated.
pub const MIN_LABEL_LENGTH: f32 = 12.0;

pub fn value_range(grid: &Grid) -> Result<(f32, f32), RenderError> {
    grid.min_max().ok_or_else(|| {
        DataUnavailable::Empty {
            region: grid.region(),
        }
        .into()
    })
}

/// One pixel per grid node. NaN nodes stay transparent.
pub fn colorize(grid: &Grid, palette: &Palette, min: f32, max: f32) -> RgbaImage {
    let mut image = RgbaImage::new(grid.width() as u32, grid.height() as u32);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if let Some([r, g, b]) = palette.color(grid.value(x as usize, y as usize), min, max) {
            *pixel = Rgba([r, g, b, 255]);
        }
    }
    image
}

pub fn colorbar(palette: &Palette, dataset: Dataset, min: f32, max: f32) -> ColorBar {
    let (label, tick_interval) = match dataset {
        Dataset::Relief => ("Elevation", super::ELEVATION_TICK_INTERVAL),
        Dataset::Geoid => ("Geoid height", 25.0),
    };
    let colors = (0..COLORBAR_STEPS)
        .filter_map(|i| {
            let t = i as f32 / (COLORBAR_STEPS - 1) as f32;
            palette.color(min + t * (max - min), min, max)
        })
        .collect();
    ColorBar {
        label: label.to_string(),
        unit: "m".to_string(),
        min,
        max,
        tick_interval,
        colors,
    }
}

/// Contours and their annotations with node coordinates moved to pixel
/// centres, for figures whose raster has one pixel per node.
pub fn plate_overlays(contours: &[Contour]) -> (Vec<Polyline>, Vec<Annotation>) {
    let polylines = contours
        .iter()
        .map(|contour| Polyline {
            level: contour.level,
            points: contour.points.iter().map(|p| [p.x + 0.5, p.y + 0.5]).collect(),
            closed: contour.closed,
        })
        .collect();
    let annotations = contour::label_spots(contours, super::ANNOTATION_INTERVAL, MIN_LABEL_LENGTH)
        .into_iter()
        .map(|spot| Annotation {
            position: [spot.point.x + 0.5, spot.point.y + 0.5],
            angle: spot.angle,
            text: contour::format_level(contours[spot.contour].level),
        })
        .collect();
    (polylines, annotations)
}

/// Scales an RGB colour by a light factor.
pub fn shade([r, g, b]: [u8; 3], light: f32) -> [u8; 3] {
    let scale = |c: u8| (f32::from(c) * light).round().clamp(0.0, 255.0) as u8;
    [scale(r), scale(g), scale(b)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::parse_pal;
    use crate::region::Region;

    fn grey() -> Palette {
        parse_pal("0 #000000\n1 #ffffff").unwrap()
    }

    #[test]
    fn colorize_leaves_nan_transparent() {
        let grid = Grid::new(
            Region::new(0.0, 1.0, 0.0, 1.0),
            2,
            2,
            vec![0.0, 10.0, f32::NAN, 5.0],
        )
        .unwrap();
        let image = colorize(&grid, &grey(), 0.0, 10.0);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, 1).0[3], 0);
    }

    #[test]
    fn colorbar_runs_from_min_to_max() {
        let bar = colorbar(&grey(), Dataset::Relief, -5000.0, 5000.0);
        assert_eq!(bar.colors.len(), COLORBAR_STEPS);
        assert_eq!(bar.colors[0], [0, 0, 0]);
        assert_eq!(bar.colors[COLORBAR_STEPS - 1], [255, 255, 255]);
        assert_eq!(bar.label, "Elevation");
        assert_eq!(bar.tick_interval, 2500.0);
    }

    #[test]
    fn shade_scales_and_clamps() {
        assert_eq!(shade([100, 200, 50], 0.5), [50, 100, 25]);
        assert_eq!(shade([200, 200, 200], 2.0), [255, 255, 255]);
    }
}
