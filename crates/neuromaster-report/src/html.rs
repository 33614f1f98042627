//! HTML progress report.
//!
//! Produces a self-contained HTML file with all CSS inlined: one section per
//! game mode with the last attempt, the personal best and the history chart.

use anyhow::{Context, Result};
use std::path::Path;

use neuromaster_core::model::GameMode;
use neuromaster_core::stats::StatsStore;

use crate::chart::render_chart;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Section heading for a mode.
pub fn mode_title(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Ordering => "Nerve ordering",
        GameMode::Clinical => "Clinical cases",
        GameMode::Visual => "Visual identification",
    }
}

/// Format a stored value with its unit, or a dash when absent.
pub fn format_value(mode: GameMode, value: Option<f64>) -> String {
    match value {
        Some(v) if mode.lower_is_better() => format!("{v:.1} {}", mode.unit()),
        Some(v) => format!("{v} {}", mode.unit()),
        None => "-".to_string(),
    }
}

/// Generate the report for every mode in `store`.
pub fn generate_html(store: &dyn StatsStore) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>neuromaster progress</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>neuromaster progress</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Generated {} | last {} sessions per mode</p>\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        neuromaster_core::stats::HISTORY_LIMIT
    ));
    html.push_str("</header>\n");

    for mode in GameMode::ALL {
        let record = store.load(mode);
        html.push_str(&format!("<section class=\"mode\" id=\"{mode}\">\n"));
        html.push_str(&format!("<h2>{}</h2>\n", html_escape(mode_title(mode))));
        html.push_str(&format!(
            "<p class=\"meta\">{}</p>\n",
            html_escape(mode.metric_label())
        ));
        html.push_str("<div class=\"figures\">\n");
        html.push_str(&format!(
            "<div><span class=\"label\">Last attempt</span><span class=\"value\">{}</span></div>\n",
            html_escape(&format_value(mode, record.last()))
        ));
        html.push_str(&format!(
            "<div class=\"best\"><span class=\"label\">Personal best</span><span class=\"value\">{}</span></div>\n",
            html_escape(&format_value(mode, record.best))
        ));
        html.push_str("</div>\n");
        html.push_str(&render_chart(mode, &record.history));
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>");
    html
}

/// Write the HTML report to a file.
pub fn write_html_report(store: &dyn StatsStore, path: &Path) -> Result<()> {
    let html = generate_html(store);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --muted: #6b7280; --best: #ca8a04; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #1e1b2e; --fg: #f9fafb; --border: #374151; --muted: #94a3b8; --best: #facc15; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); }
section.mode { border: 1px solid var(--border); border-radius: 12px; padding: 1rem 1.5rem; margin: 1.5rem 0; max-width: 560px; }
.figures { display: flex; justify-content: space-between; }
.figures div { display: flex; flex-direction: column; }
.figures .best { text-align: right; color: var(--best); }
.label { font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em; color: var(--muted); }
.value { font-size: 1.75rem; font-weight: bold; }
.placeholder { color: var(--muted); text-align: center; padding: 3rem 0; }
svg { margin: 1rem 0; max-width: 100%; height: auto; }
"#;
