//! neuromaster-report: Progress report generation.
//!
//! Renders the stored per-mode history as SVG charts and a self-contained
//! HTML page.

pub mod chart;
pub mod html;

pub use chart::render_chart;
pub use html::write_html_report;
