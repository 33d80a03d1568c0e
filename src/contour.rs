//! Isoline extraction using the marching squares algorithm.
//!
//! Coordinates are grid-node coordinates: `x` is the (fractional) column,
//! `y` the (fractional) row, row 0 being the northern edge.

use std::collections::{HashMap, VecDeque};

/// A point in grid-node space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Straight piece of an isoline inside one grid cell.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Isoline at one level, as joined segments.
#[derive(Debug, Clone)]
pub struct Contour {
    pub level: f32,
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Contour {
    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y))
            .sum()
    }
}

/// Where to write a level annotation along a contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSpot {
    pub contour: usize,
    pub point: Point,
    /// Radians in screen orientation, within (-90°, 90°].
    pub angle: f32,
}

/// Multiples of `interval` within `min..=max`.
pub fn generate_levels(min_value: f32, max_value: f32, interval: f32) -> Vec<f32> {
    if interval <= 0.0 || max_value <= min_value {
        return vec![];
    }
    let first = (min_value / interval).ceil() as i64;
    let last = (max_value / interval).floor() as i64;
    (first..=last).map(|k| k as f32 * interval).collect()
}

/// Runs marching squares over a row-major grid for one level.
pub fn march_squares(data: &[f32], width: usize, height: usize, level: f32) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();
    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0u8;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            push_cell_segments(
                &mut segments,
                cell_index,
                x as f32,
                y as f32,
                [tl, tr, br, bl],
                level,
            );
        }
    }
    segments
}

fn push_cell_segments(
    out: &mut Vec<Segment>,
    cell_index: u8,
    x: f32,
    y: f32,
    [tl, tr, br, bl]: [f32; 4],
    level: f32,
) {
    let top = || interpolate_edge(x, y, x + 1.0, y, tl, tr, level);
    let right = || interpolate_edge(x + 1.0, y, x + 1.0, y + 1.0, tr, br, level);
    let bottom = || interpolate_edge(x, y + 1.0, x + 1.0, y + 1.0, bl, br, level);
    let left = || interpolate_edge(x, y, x, y + 1.0, tl, bl, level);
    let mut push = |start: Point, end: Point| out.push(Segment { start, end });

    match cell_index {
        0 | 15 => {}
        1 | 14 => push(left(), top()),
        2 | 13 => push(top(), right()),
        3 | 12 => push(left(), right()),
        4 | 11 => push(right(), bottom()),
        5 => {
            push(left(), top());
            push(right(), bottom());
        }
        6 | 9 => push(top(), bottom()),
        7 | 8 => push(left(), bottom()),
        10 => {
            push(top(), right());
            push(left(), bottom());
        }
        _ => {}
    }
}

/// Where `level` crosses the cell edge from `(x1, y1)` to `(x2, y2)`.
fn interpolate_edge(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    val1: f32,
    val2: f32,
    level: f32,
) -> Point {
    if (val2 - val1).abs() < 1e-6 {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }
    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);
    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

type Key = (i64, i64);

fn key(p: Point) -> Key {
    ((p.x * 1000.0).round() as i64, (p.y * 1000.0).round() as i64)
}

/// Joins unordered segments into polylines by matching shared endpoints.
pub fn connect_segments(segments: &[Segment], level: f32) -> Vec<Contour> {
    let mut by_endpoint: HashMap<Key, Vec<usize>> = HashMap::new();
    for (idx, seg) in segments.iter().enumerate() {
        by_endpoint.entry(key(seg.start)).or_default().push(idx);
        by_endpoint.entry(key(seg.end)).or_default().push(idx);
    }

    let mut used = vec![false; segments.len()];
    let next_from = |p: Point, used: &mut Vec<bool>| -> Option<Point> {
        let k = key(p);
        let idx = by_endpoint
            .get(&k)?
            .iter()
            .copied()
            .find(|&idx| !used[idx])?;
        used[idx] = true;
        let seg = segments[idx];
        Some(if key(seg.start) == k { seg.end } else { seg.start })
    };

    let mut contours = Vec::new();
    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let mut points = VecDeque::from([segments[start].start, segments[start].end]);
        while let Some(&tail) = points.back()
            && let Some(p) = next_from(tail, &mut used)
        {
            points.push_back(p);
        }
        while let Some(&head) = points.front()
            && let Some(p) = next_from(head, &mut used)
        {
            points.push_front(p);
        }

        let points: Vec<Point> = points.into();
        let closed = points.len() > 2 && key(points[0]) == key(points[points.len() - 1]);
        contours.push(Contour {
            level,
            points,
            closed,
        });
    }
    contours
}

/// Multiples of `interval` and of `annotation_interval` within `min..=max`,
/// ascending without duplicates.
pub fn contour_levels(
    min_value: f32,
    max_value: f32,
    interval: f32,
    annotation_interval: f32,
) -> Vec<f32> {
    let mut levels = generate_levels(min_value, max_value, interval);
    levels.extend(generate_levels(min_value, max_value, annotation_interval));
    levels.sort_by(f32::total_cmp);
    levels.dedup_by(|a, b| (*a - *b).abs() < 1e-3);
    levels
}

/// Extracts every isoline at multiples of `interval`, plus the annotated
/// ones at multiples of `annotation_interval`.
pub fn trace(
    data: &[f32],
    width: usize,
    height: usize,
    interval: f32,
    annotation_interval: f32,
) -> Vec<Contour> {
    let (min, max) = data
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    contour_levels(min, max, interval, annotation_interval)
        .into_iter()
        .flat_map(|level| {
            let segments = march_squares(data, width, height, level);
            connect_segments(&segments, level)
        })
        .collect()
}

/// True when `level` is a multiple of `annotation_interval`.
pub fn is_annotated(level: f32, annotation_interval: f32) -> bool {
    if annotation_interval <= 0.0 {
        return false;
    }
    let ratio = level / annotation_interval;
    (ratio - ratio.round()).abs() < 1e-4
}

/// One label at the midpoint of every annotated contour that is at least
/// `min_length` grid cells long.
pub fn label_spots(contours: &[Contour], annotation_interval: f32, min_length: f32) -> Vec<LabelSpot> {
    contours
        .iter()
        .enumerate()
        .filter(|(_, contour)| is_annotated(contour.level, annotation_interval))
        .filter_map(|(idx, contour)| {
            let total = contour.length();
            if total < min_length {
                return None;
            }
            let mut walked = 0.0;
            for pair in contour.points.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let step = (b.x - a.x).hypot(b.y - a.y);
                if step > 0.0 && walked + step >= total / 2.0 {
                    let t = (total / 2.0 - walked) / step;
                    let point = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
                    return Some(LabelSpot {
                        contour: idx,
                        point,
                        angle: upright((b.y - a.y).atan2(b.x - a.x)),
                    });
                }
                walked += step;
            }
            None
        })
        .collect()
}

/// Folds an angle into (-90°, 90°] so text never reads upside down.
pub fn upright(angle: f32) -> f32 {
    use std::f32::consts::PI;
    if angle > PI / 2.0 {
        angle - PI
    } else if angle <= -PI / 2.0 {
        angle + PI
    } else {
        angle
    }
}

/// Label text for a level: whole metres when integral.
pub fn format_level(level: f32) -> String {
    if level.fract().abs() < 0.01 {
        format!("{level:.0}")
    } else {
        format!("{level:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A cone peaking at the centre of a `size` x `size` grid.
    fn cone(size: usize, peak: f32) -> Vec<f32> {
        let c = (size - 1) as f32 / 2.0;
        (0..size * size)
            .map(|i| {
                let (x, y) = ((i % size) as f32, (i / size) as f32);
                peak - (x - c).hypot(y - c) * 100.0
            })
            .collect()
    }

    #[test]
    fn levels_are_multiples_within_range() {
        assert_eq!(generate_levels(-150.0, 420.0, 200.0), [0.0, 200.0, 400.0]);
        assert!(generate_levels(0.0, 100.0, 0.0).is_empty());
        assert!(generate_levels(5.0, 5.0, 1.0).is_empty());
    }

    #[test]
    fn contour_levels_merge_the_annotation_interval() {
        assert_eq!(
            contour_levels(-2500.0, 5000.0, 2400.0, 1000.0),
            [
                -2400.0, -2000.0, -1000.0, 0.0, 1000.0, 2000.0, 2400.0, 3000.0, 4000.0, 4800.0,
                5000.0
            ]
        );
        assert_eq!(contour_levels(0.0, 1000.0, 500.0, 1000.0), [0.0, 500.0, 1000.0]);
    }

    #[test]
    fn flat_grid_has_no_segments() {
        assert!(march_squares(&[1.0; 16], 4, 4, 1.5).is_empty());
        assert!(march_squares(&[1.0; 3], 4, 4, 0.5).is_empty());
    }

    #[test]
    fn single_cell_crossing() {
        // tl above, others below: one segment from left edge to top edge.
        let segments = march_squares(&[10.0, 0.0, 0.0, 0.0], 2, 2, 5.0);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, Point::new(0.0, 0.5));
        assert_eq!(segments[0].end, Point::new(0.5, 0.0));
    }

    #[test]
    fn ring_around_peak_is_one_closed_contour() {
        let data = cone(11, 1000.0);
        let segments = march_squares(&data, 11, 11, 650.0);
        let contours = connect_segments(&segments, 650.0);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].closed);
        assert_eq!(contours[0].level, 650.0);
        assert_eq!(contours[0].points.len(), segments.len() + 1);
    }

    #[test]
    fn trace_covers_every_level() {
        let data = cone(21, 1000.0);
        let contours = trace(&data, 21, 21, 250.0, 0.0);
        let mut levels: Vec<f32> = contours.iter().map(|c| c.level).collect();
        levels.dedup();
        assert!(levels.contains(&250.0));
        assert!(levels.contains(&500.0));
        assert!(levels.contains(&750.0));
        assert!(levels.iter().all(|level| level % 250.0 == 0.0));
    }

    #[test]
    fn annotations_only_on_multiples() {
        assert!(is_annotated(2000.0, 1000.0));
        assert!(is_annotated(-3000.0, 1000.0));
        assert!(!is_annotated(2400.0, 1000.0));

        let data = cone(21, 1000.0);
        let contours = trace(&data, 21, 21, 250.0, 500.0);
        let spots = label_spots(&contours, 500.0, 4.0);
        assert!(!spots.is_empty());
        for spot in &spots {
            let level = contours[spot.contour].level;
            assert!(level == 500.0 || level == 1000.0 || level == 0.0);
            assert!(spot.angle > -std::f32::consts::FRAC_PI_2 - 1e-6);
            assert!(spot.angle <= std::f32::consts::FRAC_PI_2 + 1e-6);
        }
    }

    #[test]
    fn level_text() {
        assert_eq!(format_level(2000.0), "2000");
        assert_eq!(format_level(-12.5), "-12.5");
    }
}
