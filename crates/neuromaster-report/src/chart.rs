//! SVG progress chart.
//!
//! Draws the stored history of one mode as a polyline with a filled area
//! underneath, scaled to a fixed 500×200 viewport.

use neuromaster_core::model::GameMode;

pub const WIDTH: f64 = 500.0;
pub const HEIGHT: f64 = 200.0;
pub const PADDING: f64 = 20.0;

/// Shown instead of a chart until there are two results to connect.
pub const PLACEHOLDER: &str = "Play more sessions to draw the chart";

/// Stroke color for a mode's chart.
pub fn stroke_color(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Ordering => "#d946ef",
        GameMode::Clinical => "#a855f7",
        GameMode::Visual => "#ec4899",
    }
}

/// Vertical bounds of the chart: `(min, max)`.
///
/// The top leaves 10% headroom over the largest value (10 when everything is
/// zero). Lower-is-better modes zoom in on their best region; higher-is-better
/// modes start at zero.
pub fn value_bounds(mode: GameMode, history: &[f64]) -> (f64, f64) {
    let data: &[f64] = if history.is_empty() { &[0.0] } else { history };
    let largest = data.iter().copied().fold(f64::MIN, f64::max);
    let smallest = data.iter().copied().fold(f64::MAX, f64::min);

    let max = match largest * 1.1 {
        m if m == 0.0 || !m.is_finite() => 10.0,
        m => m,
    };
    let min = if mode.lower_is_better() {
        (smallest * 0.9).max(0.0)
    } else {
        0.0
    };
    (min, max)
}

/// Viewport coordinates of each history point.
pub fn points(mode: GameMode, history: &[f64]) -> Vec<(f64, f64)> {
    let (min, max) = value_bounds(mode, history);
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let steps = history.len().saturating_sub(1).max(1) as f64;

    history
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = (i as f64 / steps) * (WIDTH - 2.0 * PADDING) + PADDING;
            let normalized = (value - min) / range;
            let y = HEIGHT - (normalized * (HEIGHT - 2.0 * PADDING) + PADDING);
            (x, y)
        })
        .collect()
}

/// Render the history chart as an inline SVG element.
pub fn render_chart(mode: GameMode, history: &[f64]) -> String {
    if history.len() < 2 {
        return format!("<p class=\"placeholder\">{PLACEHOLDER}</p>\n");
    }

    let color = stroke_color(mode);
    let pts = points(mode, history);
    let polyline = pts
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ");
    let gradient_id = format!("fill-{mode}");

    let mut svg = format!(
        "<svg viewBox=\"0 0 {WIDTH} {HEIGHT}\" width=\"{WIDTH}\" height=\"{HEIGHT}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );
    svg.push_str(&format!(
        "  <defs><linearGradient id=\"{gradient_id}\" x1=\"0\" x2=\"0\" y1=\"0\" y2=\"1\">\
<stop offset=\"0%\" stop-color=\"{color}\" stop-opacity=\"0.5\"/>\
<stop offset=\"100%\" stop-color=\"{color}\" stop-opacity=\"0\"/></linearGradient></defs>\n"
    ));
    svg.push_str(&format!(
        "  <path d=\"M {PADDING},{HEIGHT} L {polyline} L {},{HEIGHT} Z\" fill=\"url(#{gradient_id})\"/>\n",
        WIDTH - PADDING
    ));
    svg.push_str(&format!(
        "  <polyline fill=\"none\" stroke=\"{color}\" stroke-width=\"3\" stroke-linecap=\"round\" stroke-linejoin=\"round\" points=\"{polyline}\"/>\n"
    ));
    for (x, y) in &pts {
        svg.push_str(&format!(
            "  <circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"4\" fill=\"#1e1b2e\" stroke=\"{color}\" stroke-width=\"2\"/>\n"
        ));
    }
    svg.push_str("</svg>\n");
    svg
}
