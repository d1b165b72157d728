// Sparkline renderer - full redraw of a normalized area chart
use crate::application::render_surface::{Canvas, Point, Rgba, VerticalGradient};

const LINE_WIDTH: f64 = 2.0;
const FILL_ALPHA: u8 = 0x80;

/// Map `series` (oldest first) onto canvas coordinates. Higher values sit
/// nearer the top; a flat series lies along the bottom edge.
pub fn project(series: &[f64], width: f64, height: f64) -> Vec<Point> {
    if series.len() < 2 {
        return Vec::new();
    }

    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(mn, mx), v| (mn.min(*v), mx.max(*v)));
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let last = (series.len() - 1) as f64;

    series
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f64 / last * width;
            let y = height - ((v - min) / range) * height;
            (x, y)
        })
        .collect()
}

/// Clear `canvas` and draw `series`. Fewer than two points leaves it blank.
pub fn render(series: &[f64], color: Rgba, canvas: &mut dyn Canvas) {
    canvas.clear();

    let line = project(series, canvas.width(), canvas.height());
    if line.is_empty() {
        return;
    }
    canvas.stroke_polyline(&line, color, LINE_WIDTH);

    let (w, h) = (canvas.width(), canvas.height());
    let mut area = line;
    area.push((w, h));
    area.push((0.0, h));
    canvas.fill_polygon(
        &area,
        VerticalGradient {
            top: color.with_alpha(FILL_ALPHA),
            bottom: Rgba::TRANSPARENT,
        },
    );
}
