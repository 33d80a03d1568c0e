//! Orthographic globe centred on the pan position.

use super::{PlaceLabel, fetch, raster};
use crate::colormap::{ColorMap, Palettes};
use crate::contour::{self, Contour};
use crate::error::RenderError;
use crate::figure::{Annotation, Figure, Polyline, TextLabel};
use crate::grid::{Dataset, Grid, GridSource, Resolution};
use crate::region::Region;
use image::{Rgba, RgbaImage};

const SIZE: u32 = 640;
const RADIUS: f64 = 300.0;

/// Orthographic view of the whole globe seen from above `center`
/// (longitude, latitude).
///
/// The ocean colour map shows the geoid instead of elevation. Isolines are
/// projected and cut where they pass behind the horizon. Each label is
/// written at its position when that position faces the viewer.
pub fn render_globe(
    source: &dyn GridSource,
    palettes: &Palettes,
    center: (f64, f64),
    color_map: ColorMap,
    interval: u32,
    labels: &[PlaceLabel],
) -> Result<Figure, RenderError> {
    let dataset = match color_map {
        ColorMap::Ocean => Dataset::Geoid,
        _ => Dataset::Relief,
    };
    let grid = fetch(source, dataset, Resolution::OneDegree, Region::GLOBE)?;
    let (min, max) = raster::value_range(&grid)?;
    let palette = palettes.get(color_map);
    let view = Orthographic::new(center.0, center.1);

    let mut image = RgbaImage::new(SIZE, SIZE);
    for (px, py, pixel) in image.enumerate_pixels_mut() {
        let Some((lon, lat)) = view.unproject(f64::from(px) + 0.5, f64::from(py) + 0.5) else {
            continue;
        };
        let color = grid
            .sample(lon, lat)
            .and_then(|value| palette.color(value, min, max));
        if let Some([r, g, b]) = color {
            *pixel = Rgba([r, g, b, 255]);
        }
    }

    let contours = contour::trace(
        grid.values(),
        grid.width(),
        grid.height(),
        interval as f32,
        super::ANNOTATION_INTERVAL,
    );

    let mut figure = Figure::new(
        format!(
            "{} seen from {:.0}°, {:.0}°",
            dataset_title(dataset),
            center.0,
            center.1
        ),
        image,
    );
    figure.contours = contours
        .iter()
        .flat_map(|contour| view.project_contour(&grid, contour))
        .collect();
    figure.annotations = annotations(&view, &grid, &contours);
    figure.labels = labels
        .iter()
        .filter_map(|label| {
            Some(TextLabel {
                position: view.project(label.lon, label.lat)?,
                text: label.text.clone(),
            })
        })
        .collect();
    figure.colorbar = Some(raster::colorbar(palette, dataset, min, max));
    Ok(figure)
}

fn dataset_title(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::Relief => "Earth relief",
        Dataset::Geoid => "Earth geoid",
    }
}

fn annotations(view: &Orthographic, grid: &Grid, contours: &[Contour]) -> Vec<Annotation> {
    contour::label_spots(contours, super::ANNOTATION_INTERVAL, raster::MIN_LABEL_LENGTH)
        .into_iter()
        .filter_map(|spot| {
            let at = |x: f32, y: f32| {
                view.project(grid.lon_at(f64::from(x)), grid.lat_at(f64::from(y)))
            };
            let position = at(spot.point.x, spot.point.y)?;
            let (dy, dx) = spot.angle.sin_cos();
            let ahead = at(spot.point.x + dx * 0.5, spot.point.y + dy * 0.5)?;
            let angle = (ahead[1] - position[1]).atan2(ahead[0] - position[0]);
            Some(Annotation {
                position,
                angle: contour::upright(angle),
                text: contour::format_level(contours[spot.contour].level),
            })
        })
        .collect()
}

/// Orthographic projection onto a `SIZE` x `SIZE` image.
struct Orthographic {
    lon0: f64,
    sin_lat0: f64,
    cos_lat0: f64,
}

impl Orthographic {
    fn new(lon0: f64, lat0: f64) -> Self {
        let (sin_lat0, cos_lat0) = lat0.to_radians().sin_cos();
        Self {
            lon0,
            sin_lat0,
            cos_lat0,
        }
    }

    /// Pixel position of a point, or `None` behind the horizon.
    fn project(&self, lon: f64, lat: f64) -> Option<[f32; 2]> {
        let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
        let (sin_dlon, cos_dlon) = (lon - self.lon0).to_radians().sin_cos();
        let cos_c = self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * cos_dlon;
        if cos_c < 0.0 {
            return None;
        }
        let x = cos_lat * sin_dlon;
        let y = self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * cos_dlon;
        let centre = f64::from(SIZE) / 2.0;
        Some([(centre + x * RADIUS) as f32, (centre - y * RADIUS) as f32])
    }

    /// Geographic position under a pixel, or `None` off the disc.
    fn unproject(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        let centre = f64::from(SIZE) / 2.0;
        let x = (px - centre) / RADIUS;
        let y = (centre - py) / RADIUS;
        let rho = x.hypot(y);
        if rho > 1.0 {
            return None;
        }
        let lat0 = self.sin_lat0.atan2(self.cos_lat0);
        if rho < 1e-12 {
            return Some((wrap_lon(self.lon0), lat0.to_degrees()));
        }
        let (sin_c, cos_c) = rho.asin().sin_cos();
        let lat = (cos_c * self.sin_lat0 + y * sin_c * self.cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let dlon = (x * sin_c).atan2(rho * cos_c * self.cos_lat0 - y * sin_c * self.sin_lat0);
        Some((wrap_lon(self.lon0 + dlon.to_degrees()), lat.to_degrees()))
    }

    /// Projects a contour traced on `grid`, split into the runs that face
    /// the viewer.
    fn project_contour(&self, grid: &Grid, contour: &Contour) -> Vec<Polyline> {
        let mut runs = Vec::new();
        let mut current: Vec<[f32; 2]> = Vec::new();
        for point in &contour.points {
            let lon = grid.lon_at(f64::from(point.x));
            let lat = grid.lat_at(f64::from(point.y));
            match self.project(lon, lat) {
                Some(p) => current.push(p),
                None if current.len() > 1 => runs.push(std::mem::take(&mut current)),
                None => current.clear(),
            }
        }
        let whole = runs.is_empty() && current.len() == contour.points.len();
        if current.len() > 1 {
            runs.push(current);
        }
        runs.into_iter()
            .map(|points| Polyline {
                level: contour.level,
                points,
                closed: whole && contour.closed,
            })
            .collect()
    }
}

fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataUnavailable;
    use crate::grid::GridRequest;
    use std::sync::Mutex;

    /// Global grid whose value is the latitude times 50, recording requests.
    #[derive(Default)]
    struct Latitudes {
        requests: Mutex<Vec<GridRequest>>,
    }

    impl GridSource for Latitudes {
        fn load(&self, request: &GridRequest) -> Result<Grid, DataUnavailable> {
            self.requests.lock().unwrap().push(*request);
            let (w, h) = (73, 37);
            let values = (0..w * h)
                .map(|i| (90.0 - (i / w) as f32 * 5.0) * 50.0)
                .collect();
            Grid::new(request.region, w, h, values)
        }
    }

    fn label(text: &str, lon: f64, lat: f64) -> PlaceLabel {
        PlaceLabel {
            text: text.to_string(),
            lon,
            lat,
        }
    }

    #[test]
    fn projection_round_trips_on_the_visible_side() {
        let view = Orthographic::new(30.0, 45.0);
        let [px, py] = view.project(40.0, 50.0).unwrap();
        let (lon, lat) = view.unproject(f64::from(px), f64::from(py)).unwrap();
        assert!((lon - 40.0).abs() < 1e-3);
        assert!((lat - 50.0).abs() < 1e-3);
        assert!(view.project(-150.0, -45.0).is_none());
        assert!(view.unproject(0.0, 0.0).is_none());
    }

    #[test]
    fn centre_of_view_projects_to_image_centre() {
        let view = Orthographic::new(-90.0, 0.0);
        let centre = (SIZE / 2) as f32;
        assert_eq!(view.project(-90.0, 0.0), Some([centre, centre]));
    }

    #[test]
    fn ocean_map_switches_to_the_geoid() {
        let source = Latitudes::default();
        let palettes = Palettes::embedded().unwrap();
        render_globe(&source, &palettes, (0.0, 0.0), ColorMap::Ocean, 2000, &[]).unwrap();
        render_globe(&source, &palettes, (0.0, 0.0), ColorMap::Geo, 2000, &[]).unwrap();

        let requests = source.requests.lock().unwrap();
        assert_eq!(requests[0].dataset, Dataset::Geoid);
        assert_eq!(requests[1].dataset, Dataset::Relief);
        assert!(requests.iter().all(|r| r.region == Region::GLOBE));
        assert!(requests.iter().all(|r| r.resolution == Resolution::OneDegree));
    }

    #[test]
    fn only_labels_facing_the_viewer_are_drawn() {
        let source = Latitudes::default();
        let palettes = Palettes::embedded().unwrap();
        let labels = [label("Europe", 12.5, 52.5), label("Oceania", 162.5, -17.5)];
        let figure =
            render_globe(&source, &palettes, (0.0, 45.0), ColorMap::Geo, 1000, &labels).unwrap();

        assert_eq!(figure.labels.len(), 1);
        assert_eq!(figure.labels[0].text, "Europe");
        assert!(figure.colorbar.is_some());
        assert!(!figure.contours.is_empty());
        assert!(figure.raster.pixels().any(|p| p.0[3] == 255));
        assert_eq!(figure.raster.get_pixel(0, 0).0[3], 0);
    }
}
