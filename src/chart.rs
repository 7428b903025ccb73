//! Projection chart renderer
//!
//! Rasterises the projection as a line chart with markers (PNG).
//! Revenue, Variable Cost, Fixed Cost and EBITDA each get a series;
//! the legend is a row of colour swatches in `PROJECTION_COLUMNS` order.

use crate::models::{FinancialProjection, PROJECTION_COLUMNS};
use crate::Result;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;
use tracing::debug;

pub const WIDTH: u32 = 900;
pub const HEIGHT: u32 = 500;

const MARGIN_LEFT: i64 = 70;
const MARGIN_RIGHT: i64 = 30;
const MARGIN_TOP: i64 = 50;
const MARGIN_BOTTOM: i64 = 50;
const GRID_LINES: i64 = 5;
const MARKER_RADIUS: i64 = 4;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);

/// Revenue, Variable Cost, Fixed Cost, EBITDA
pub const SERIES_COLORS: [Rgb<u8>; 4] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
];

/// One plotted line
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: &'static str,
    pub color: Rgb<u8>,
    pub values: Vec<f64>,
}

/// Series read straight off the projection rows
pub fn chart_series(projection: &FinancialProjection) -> Vec<ChartSeries> {
    PROJECTION_COLUMNS
        .iter()
        .enumerate()
        .map(|(col, label)| ChartSeries {
            label: *label,
            color: SERIES_COLORS[col],
            values: projection.rows().iter().map(|r| r.values()[col]).collect(),
        })
        .collect()
}

/// Value → pixel mapping for one chart
pub(crate) struct PlotArea {
    points: usize,
    min: f64,
    max: f64,
}

impl PlotArea {
    fn new(series: &[ChartSeries]) -> Self {
        let points = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
        let values = series.iter().flat_map(|s| s.values.iter().copied());

        let (mut min, mut max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if (max - min).abs() < f64::EPSILON {
            max = min + 1.0;
        }
        let pad = (max - min) * 0.05;
        if min < 0.0 {
            min -= pad;
        }
        max += pad;

        Self { points, min, max }
    }

    fn left(&self) -> i64 {
        MARGIN_LEFT
    }

    fn right(&self) -> i64 {
        WIDTH as i64 - MARGIN_RIGHT
    }

    fn top(&self) -> i64 {
        MARGIN_TOP
    }

    fn bottom(&self) -> i64 {
        HEIGHT as i64 - MARGIN_BOTTOM
    }

    pub(crate) fn to_pixel(&self, index: usize, value: f64) -> (i64, i64) {
        let span_x = (self.right() - self.left()) as f64;
        let x = if self.points > 1 {
            self.left() as f64 + span_x * index as f64 / (self.points - 1) as f64
        } else {
            self.left() as f64 + span_x / 2.0
        };

        let span_y = (self.bottom() - self.top()) as f64;
        let y = self.bottom() as f64 - span_y * (value - self.min) / (self.max - self.min);

        (x.round() as i64, y.round() as i64)
    }
}

/// Render the chart and overwrite `destination`
pub fn render(projection: &FinancialProjection, destination: &Path) -> Result<()> {
    let image = draw(projection);
    image.save_with_format(destination, ImageFormat::Png)?;

    debug!(path = %destination.display(), "Chart written");
    Ok(())
}

pub(crate) fn draw(projection: &FinancialProjection) -> RgbImage {
    let series = chart_series(projection);
    let area = PlotArea::new(&series);
    let mut image = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    for step in 0..=GRID_LINES {
        let y = area.top() + (area.bottom() - area.top()) * step / GRID_LINES;
        draw_line(&mut image, (area.left(), y), (area.right(), y), GRID, 1);
    }
    for index in 0..area.points {
        let (x, _) = area.to_pixel(index, area.min);
        draw_line(&mut image, (x, area.top()), (x, area.bottom()), GRID, 1);
    }

    draw_line(&mut image, (area.left(), area.top()), (area.left(), area.bottom()), AXIS, 2);
    draw_line(&mut image, (area.left(), area.bottom()), (area.right(), area.bottom()), AXIS, 2);
    if area.min < 0.0 {
        let (_, zero) = area.to_pixel(0, 0.0);
        draw_line(&mut image, (area.left(), zero), (area.right(), zero), AXIS, 1);
    }

    for s in &series {
        let pixels: Vec<_> = s
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| area.to_pixel(i, *v))
            .collect();

        for pair in pixels.windows(2) {
            draw_line(&mut image, pair[0], pair[1], s.color, 2);
        }
        for p in &pixels {
            draw_marker(&mut image, *p, s.color);
        }
    }

    for (i, s) in series.iter().enumerate() {
        let x = area.left() + 10 + i as i64 * 30;
        fill_rect(&mut image, (x, 18), (x + 18, 32), s.color);
    }

    image
}

fn put(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < image.width() as i64 && y < image.height() as i64 {
        image.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham with a square pen
fn draw_line(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>, thickness: i64) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let half = thickness / 2;

    loop {
        for ox in -half..thickness - half {
            for oy in -half..thickness - half {
                put(image, x + ox, y + oy, color);
            }
        }

        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_marker(image: &mut RgbImage, center: (i64, i64), color: Rgb<u8>) {
    let r = MARKER_RADIUS;
    for ox in -r..=r {
        for oy in -r..=r {
            if ox * ox + oy * oy <= r * r {
                put(image, center.0 + ox, center.1 + oy, color);
            }
        }
    }
}

fn fill_rect(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    for x in from.0..to.0 {
        for y in from.1..to.1 {
            put(image, x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::project;
    use crate::models::ProjectBrief;

    fn rice_mill_projection() -> FinancialProjection {
        let mut brief = ProjectBrief::new("Rice Mill", "rice processing unit");
        brief.capacity = Some(2000.0);
        project(&brief).0
    }

    #[test]
    fn test_series_match_projection() {
        let projection = rice_mill_projection();
        let series = chart_series(&projection);

        assert_eq!(series.len(), 4);
        assert_eq!(series[0].label, "Revenue");
        assert_eq!(series[3].label, "EBITDA");
        for (i, row) in projection.rows().iter().enumerate() {
            assert_eq!(series[0].values[i], row.revenue);
            assert_eq!(series[3].values[i], row.ebitda);
        }
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let projection = rice_mill_projection();
        let before = projection.clone();

        render(&projection, &path).unwrap();
        // overwrite is allowed
        render(&projection, &path).unwrap();

        assert_eq!(projection, before);
        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (WIDTH, HEIGHT));
    }

    #[test]
    fn test_markers_drawn_at_values() {
        let projection = rice_mill_projection();
        let image = draw(&projection);
        let series = chart_series(&projection);
        let area = PlotArea::new(&series);

        // EBITDA is drawn last, so its markers are on top
        let ebitda = &series[3];
        for (i, v) in ebitda.values.iter().enumerate() {
            let (x, y) = area.to_pixel(i, *v);
            assert_eq!(*image.get_pixel(x as u32, y as u32), ebitda.color);
        }
    }

    #[test]
    fn test_negative_values_stay_inside_plot() {
        let projection = rice_mill_projection();
        let series = chart_series(&projection);
        let area = PlotArea::new(&series);

        for s in &series {
            for (i, v) in s.values.iter().enumerate() {
                let (x, y) = area.to_pixel(i, *v);
                assert!(x >= area.left() && x <= area.right());
                assert!(y >= area.top() && y <= area.bottom());
            }
        }
    }
}
