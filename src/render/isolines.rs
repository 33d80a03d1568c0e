use super::{fetch, raster};
use crate::colormap::{ColorMap, Palettes};
use crate::contour;
use crate::error::RenderError;
use crate::figure::{Axes, Figure};
use crate::grid::{Dataset, GridSource, Resolution};
use crate::region::Region;

const MAX_NODES: usize = 1200;

/// Flat map of `region`: a coloured raster with isolines every `interval`
/// metres, annotated isolines every 1000 m, and a lon/lat frame.
pub fn render_isolines(
    source: &dyn GridSource,
    palettes: &Palettes,
    region: Region,
    resolution: Resolution,
    color_map: ColorMap,
    interval: u32,
    with_colorbar: bool,
) -> Result<Figure, RenderError> {
    let grid = fetch(source, Dataset::Relief, resolution, region)?.thinned(MAX_NODES, MAX_NODES);
    let (min, max) = raster::value_range(&grid)?;
    let palette = palettes.get(color_map);

    let contours = contour::trace(
        grid.values(),
        grid.width(),
        grid.height(),
        interval as f32,
        super::ANNOTATION_INTERVAL,
    );
    log::debug!(
        "Traced {} isolines every {interval} m over {}x{} nodes",
        contours.len(),
        grid.width(),
        grid.height()
    );

    let mut figure = Figure::new(
        format!("Isolines every {interval} m"),
        raster::colorize(&grid, palette, min, max),
    );
    (figure.contours, figure.annotations) = raster::plate_overlays(&contours);
    figure.axes = Some(Axes::new(grid.region(), [grid.width(), grid.height()]));
    if with_colorbar {
        figure.colorbar = Some(raster::colorbar(palette, Dataset::Relief, min, max));
    }
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataUnavailable;
    use crate::grid::{Grid, GridRequest};

    /// Serves a dome peaking at 2450 m in the middle of any region.
    struct Dome;

    impl GridSource for Dome {
        fn load(&self, request: &GridRequest) -> Result<Grid, DataUnavailable> {
            let size = 41;
            let values = (0..size * size)
                .map(|i| {
                    let (x, y) = ((i % size) as f32 - 20.0, (i / size) as f32 - 20.0);
                    2450.0 - 10.0 * (x * x + y * y)
                })
                .collect();
            Grid::new(request.region, size, size, values)
        }
    }

    #[test]
    fn draws_isolines_and_annotates_thousands() {
        let palettes = Palettes::embedded().unwrap();
        let figure = render_isolines(
            &Dome,
            &palettes,
            Region::new(-28.0, 53.0, 34.0, 71.0),
            Resolution::OneDegree,
            ColorMap::Geo,
            500,
            true,
        )
        .unwrap();

        assert_eq!(figure.size(), [41, 41]);
        let mut levels: Vec<f32> = figure.contours.iter().map(|c| c.level).collect();
        levels.dedup();
        assert_eq!(levels.first(), Some(&-5500.0));
        assert_eq!(levels.last(), Some(&2000.0));
        assert!(levels.iter().all(|level| level % 500.0 == 0.0));
        assert!(!figure.annotations.is_empty());
        assert!(
            figure
                .annotations
                .iter()
                .all(|a| a.text.parse::<f32>().unwrap() % 1000.0 == 0.0)
        );
        assert!(figure.colorbar.is_some());
        assert!(figure.axes.is_some());
    }

    #[test]
    fn public_view_has_no_colorbar() {
        let palettes = Palettes::embedded().unwrap();
        let figure = render_isolines(
            &Dome,
            &palettes,
            Region::new(-28.0, 53.0, 34.0, 71.0),
            Resolution::OneDegree,
            ColorMap::Viridis,
            2400,
            false,
        )
        .unwrap();
        assert!(figure.colorbar.is_none());
        assert!(
            figure
                .contours
                .iter()
                .all(|c| c.level % 2400.0 == 0.0 || c.level % 1000.0 == 0.0)
        );

        // 2400 m spacing still carries the 1000 m annotated isolines.
        let labelled: Vec<f32> = figure
            .annotations
            .iter()
            .map(|a| a.text.parse().unwrap())
            .collect();
        assert!(labelled.contains(&1000.0));
        assert!(labelled.contains(&2000.0));
        assert!(labelled.contains(&-1000.0));
        assert!(figure.contours.iter().any(|c| c.level == 2400.0));
    }

    #[test]
    fn invalid_region_never_reaches_the_source() {
        struct Unreachable;
        impl GridSource for Unreachable {
            fn load(&self, _: &GridRequest) -> Result<Grid, DataUnavailable> {
                panic!("source called for an invalid region");
            }
        }

        let palettes = Palettes::embedded().unwrap();
        let result = render_isolines(
            &Unreachable,
            &palettes,
            Region::new(-10.0, 10.0, 60.0, 120.0),
            Resolution::OneDegree,
            ColorMap::Geo,
            1000,
            true,
        );
        assert!(matches!(
            result,
            Err(RenderError::DataUnavailable(DataUnavailable::InvalidRegion { .. }))
        ));
    }
}
