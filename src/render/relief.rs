//! Shaded 3-D perspective of a region.
//!
//! The grid becomes a triangle mesh on a Mercator base whose width is one
//! unit. Heights are exaggerated so the full relief stands a tenth of that
//! width. The mesh is viewed from azimuth -130° (south-west) at 30° above
//! the horizon with a parallel projection and painted through a depth
//! buffer.

use super::{fetch, raster};
use crate::colormap::{ColorMap, Palette, Palettes};
use crate::error::RenderError;
use crate::figure::Figure;
use crate::grid::{Dataset, Grid, GridSource, Resolution};
use crate::region::Region;
use image::{Rgba, RgbaImage};

const VIEW_AZIMUTH_DEG: f64 = -130.0;
const VIEW_ELEVATION_DEG: f64 = 30.0;
const Z_SIZE: f64 = 0.1;
const MESH_NODES: usize = 240;
const IMAGE_WIDTH: u32 = 900;
const IMAGE_HEIGHT: u32 = 640;
const MARGIN: f64 = 20.0;
const BASE_GREY: [u8; 3] = [160, 160, 160];
/// Light from the north-west, 45° up.
const LIGHT: [f64; 3] = [-0.5, 0.5, std::f64::consts::FRAC_1_SQRT_2];

/// Shaded perspective view of `region`, coloured by `color_map`, with an
/// elevation colour bar.
pub fn render_relief(
    source: &dyn GridSource,
    palettes: &Palettes,
    region: Region,
    resolution: Resolution,
    color_map: ColorMap,
) -> Result<Figure, RenderError> {
    let grid = fetch(source, Dataset::Relief, resolution, region)?.thinned(MESH_NODES, MESH_NODES);
    let (min, max) = raster::value_range(&grid)?;
    let palette = palettes.get(color_map);

    let mesh = Mesh::build(&grid, min, max);
    let mut canvas = Canvas::new(IMAGE_WIDTH, IMAGE_HEIGHT);
    let camera = Camera::fit(&mesh.bounds(), IMAGE_WIDTH, IMAGE_HEIGHT);
    mesh.paint_surface(&grid, palette, min, max, &camera, &mut canvas);
    mesh.paint_skirts(&camera, &mut canvas);
    log::debug!(
        "Relief mesh {}x{} drawn into {IMAGE_WIDTH}x{IMAGE_HEIGHT}",
        grid.width(),
        grid.height()
    );

    let mut figure = Figure::new(format!("Relief {region}"), canvas.image);
    figure.colorbar = Some(raster::colorbar(palette, Dataset::Relief, min, max));
    Ok(figure)
}

type Vec3 = [f64; 3];

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: Vec3) -> Vec3 {
    let len = dot(v, v).sqrt();
    if len > 0.0 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

fn mercator_y(lat: f64) -> f64 {
    let lat = lat.clamp(-85.0, 85.0).to_radians();
    (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln()
}

/// Lambertian light factor for a surface normal, never fully black.
fn light(normal: Vec3) -> f32 {
    let lambert = dot(normalize(normal), normalize(LIGHT)).max(0.0);
    (0.45 + 0.65 * lambert) as f32
}

/// Grid nodes placed in model space: x east, y north, z up.
struct Mesh {
    width: usize,
    height: usize,
    nodes: Vec<Option<Vec3>>,
    base_z: f64,
}

impl Mesh {
    fn build(grid: &Grid, min: f32, max: f32) -> Self {
        let region = grid.region();
        let scale = 1.0 / region.width().to_radians();
        let y0 = mercator_y(region.south);
        let relief = f64::from(max - min);
        let z_scale = if relief > 0.0 { Z_SIZE / relief } else { 0.0 };

        let mut nodes = Vec::with_capacity(grid.width() * grid.height());
        for row in 0..grid.height() {
            let y = (mercator_y(grid.lat_at(row as f64)) - y0) * scale;
            for col in 0..grid.width() {
                let x = (grid.lon_at(col as f64) - region.west).to_radians() * scale;
                let value = grid.value(col, row);
                nodes.push(
                    (!value.is_nan()).then(|| [x, y, f64::from(value - min) * z_scale]),
                );
            }
        }

        Self {
            width: grid.width(),
            height: grid.height(),
            nodes,
            base_z: -0.15 * Z_SIZE,
        }
    }

    fn node(&self, col: usize, row: usize) -> Option<Vec3> {
        self.nodes[row * self.width + col]
    }

    fn bounds(&self) -> Vec<Vec3> {
        let mut points: Vec<Vec3> = self.nodes.iter().flatten().copied().collect();
        points.extend(
            self.nodes
                .iter()
                .flatten()
                .map(|&[x, y, _]| [x, y, self.base_z]),
        );
        points
    }

    fn paint_surface(
        &self,
        grid: &Grid,
        palette: &Palette,
        min: f32,
        max: f32,
        camera: &Camera,
        canvas: &mut Canvas,
    ) {
        for row in 0..self.height.saturating_sub(1) {
            for col in 0..self.width.saturating_sub(1) {
                let corners = [(col, row), (col + 1, row), (col + 1, row + 1), (col, row + 1)];
                for tri in [[0, 1, 2], [0, 2, 3]] {
                    let picked = tri.map(|i| corners[i]);
                    let (Some(a), Some(b), Some(c)) = (
                        self.node(picked[0].0, picked[0].1),
                        self.node(picked[1].0, picked[1].1),
                        self.node(picked[2].0, picked[2].1),
                    ) else {
                        continue;
                    };
                    let mean = picked
                        .iter()
                        .map(|&(x, y)| grid.value(x, y))
                        .sum::<f32>()
                        / 3.0;
                    let Some(color) = palette.color(mean, min, max) else {
                        continue;
                    };
                    // Rows run north to south, so the winding is clockwise
                    // seen from above; flip to get an upward normal.
                    let normal = cross(sub(c, a), sub(b, a));
                    canvas.fill(camera, [a, b, c], raster::shade(color, light(normal)));
                }
            }
        }
    }

    /// Grey walls from the boundary nodes down to the base plane.
    fn paint_skirts(&self, camera: &Camera, canvas: &mut Canvas) {
        let w = self.width;
        let h = self.height;
        let mut edges: Vec<[(usize, usize); 2]> = Vec::new();
        for col in 0..w.saturating_sub(1) {
            edges.push([(col, 0), (col + 1, 0)]);
            edges.push([(col, h - 1), (col + 1, h - 1)]);
        }
        for row in 0..h.saturating_sub(1) {
            edges.push([(0, row), (0, row + 1)]);
            edges.push([(w - 1, row), (w - 1, row + 1)]);
        }

        for [(c0, r0), (c1, r1)] in edges {
            let (Some(top0), Some(top1)) = (self.node(c0, r0), self.node(c1, r1)) else {
                continue;
            };
            let bottom0 = [top0[0], top0[1], self.base_z];
            let bottom1 = [top1[0], top1[1], self.base_z];
            let color = raster::shade(BASE_GREY, if r0 == r1 { 0.85 } else { 0.7 });
            canvas.fill(camera, [top0, top1, bottom1], color);
            canvas.fill(camera, [top0, bottom1, bottom0], color);
        }
    }
}

/// Parallel projection from model space to pixels.
struct Camera {
    right: Vec3,
    up: Vec3,
    toward: Vec3,
    scale: f64,
    offset: [f64; 2],
}

impl Camera {
    fn fit(points: &[Vec3], width: u32, height: u32) -> Self {
        let azimuth = VIEW_AZIMUTH_DEG.to_radians();
        let elevation = VIEW_ELEVATION_DEG.to_radians();
        let (sin_az, cos_az) = azimuth.sin_cos();
        let (sin_el, cos_el) = elevation.sin_cos();

        let mut camera = Self {
            right: [-cos_az, sin_az, 0.0],
            up: [-sin_el * sin_az, -sin_el * cos_az, cos_el],
            toward: [cos_el * sin_az, cos_el * cos_az, sin_el],
            scale: 1.0,
            offset: [0.0, 0.0],
        };

        let (mut lo, mut hi) = ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]);
        for &p in points {
            let s = [dot(p, camera.right), dot(p, camera.up)];
            for axis in 0..2 {
                lo[axis] = lo[axis].min(s[axis]);
                hi[axis] = hi[axis].max(s[axis]);
            }
        }
        let span = [(hi[0] - lo[0]).max(1e-9), (hi[1] - lo[1]).max(1e-9)];
        let avail = [
            f64::from(width) - 2.0 * MARGIN,
            f64::from(height) - 2.0 * MARGIN,
        ];
        camera.scale = (avail[0] / span[0]).min(avail[1] / span[1]);
        camera.offset = [
            (f64::from(width) - span[0] * camera.scale) / 2.0 - lo[0] * camera.scale,
            (f64::from(height) + span[1] * camera.scale) / 2.0 + lo[1] * camera.scale,
        ];
        camera
    }

    /// Pixel position and depth (larger is nearer).
    fn project(&self, p: Vec3) -> [f64; 3] {
        [
            self.offset[0] + dot(p, self.right) * self.scale,
            self.offset[1] - dot(p, self.up) * self.scale,
            dot(p, self.toward),
        ]
    }
}

struct Canvas {
    image: RgbaImage,
    depth: Vec<f64>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            depth: vec![f64::NEG_INFINITY; (width * height) as usize],
        }
    }

    fn fill(&mut self, camera: &Camera, triangle: [Vec3; 3], [r, g, b]: [u8; 3]) {
        let [a, b_, c] = triangle.map(|p| camera.project(p));
        let area = edge(a, b_, c);
        if area.abs() < 1e-12 {
            return;
        }

        let (width, height) = self.image.dimensions();
        let x0 = a[0].min(b_[0]).min(c[0]).floor().max(0.0) as u32;
        let y0 = a[1].min(b_[1]).min(c[1]).floor().max(0.0) as u32;
        let x1 = (a[0].max(b_[0]).max(c[0]).ceil() as u32).min(width);
        let y1 = (a[1].max(b_[1]).max(c[1]).ceil() as u32).min(height);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = [f64::from(x) + 0.5, f64::from(y) + 0.5, 0.0];
                let w0 = edge(b_, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b_, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let z = w0 * a[2] + w1 * b_[2] + w2 * c[2];
                let idx = (y * width + x) as usize;
                if z > self.depth[idx] {
                    self.depth[idx] = z;
                    self.image.put_pixel(x, y, Rgba([r, g, b, 255]));
                }
            }
        }
    }
}

fn edge(a: [f64; 3], b: [f64; 3], p: [f64; 3]) -> f64 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}
