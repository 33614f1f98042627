//! The `neuromaster stats` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use neuromaster_core::model::GameMode;
use neuromaster_core::stats::StatsStore;
use neuromaster_report::html::{format_value, mode_title};
use neuromaster_report::write_html_report;

use super::open;

pub fn execute(
    mode: Option<GameMode>,
    html: Option<PathBuf>,
    config_path: Option<&Path>,
    stats_dir: Option<PathBuf>,
) -> Result<()> {
    let (_config, stats) = open(config_path, stats_dir)?;
    let modes: Vec<GameMode> = match mode {
        Some(mode) => vec![mode],
        None => GameMode::ALL.to_vec(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Mode", "Best", "Last", "Sessions", "History"]);
    for mode in modes {
        let record = stats.load(mode);
        let history = history_line(mode, &record.history);
        table.add_row(vec![
            Cell::new(mode_title(mode)),
            Cell::new(format_value(mode, record.best)),
            Cell::new(format_value(mode, record.last())),
            Cell::new(record.history.len()),
            Cell::new(history),
        ]);
    }
    println!("{table}");

    if let Some(path) = html {
        write_html_report(&*stats, &path)?;
        println!("HTML report written to {}", path.display());
    }
    Ok(())
}

/// Stored values separated by spaces, without units.
pub fn history_line(mode: GameMode, history: &[f64]) -> String {
    history
        .iter()
        .map(|v| {
            if mode.lower_is_better() {
                format!("{v:.1}")
            } else {
                v.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// In-game stats for one mode.
pub fn print_mode_stats(stats: &dyn StatsStore, mode: GameMode) {
    let record = stats.load(mode);
    println!("  {} ({})", mode_title(mode), mode.metric_label());
    println!("  Personal best: {}", format_value(mode, record.best));
    println!("  Last attempt:  {}", format_value(mode, record.last()));
    if record.history.is_empty() {
        println!("  No sessions recorded yet.");
    } else {
        println!("  History: {}", history_line(mode, &record.history));
    }
}
