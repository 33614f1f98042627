//! Subcommand implementations and the plumbing they share.

pub mod init;
pub mod order;
pub mod quiz;
pub mod reference;
pub mod stats;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use neuromaster_core::model::Cue;
use neuromaster_core::stats::{FileStatsStore, StatsStore};
use neuromaster_providers::config::load_config_from;
use neuromaster_providers::NeuromasterConfig;

/// Load the config and open the stats store it points at.
///
/// `--stats-dir` wins over the config file.
pub fn open(
    config_path: Option<&Path>,
    stats_dir: Option<PathBuf>,
) -> Result<(NeuromasterConfig, Arc<dyn StatsStore>)> {
    let config = load_config_from(config_path)?;
    let store = match stats_dir.or_else(|| config.stats_dir.clone()) {
        Some(dir) => FileStatsStore::new(dir),
        None => FileStatsStore::in_default_location(),
    };
    tracing::debug!(dir = %store.dir().display(), "using stats store");
    let store: Arc<dyn StatsStore> = Arc::new(store);
    Ok((config, store))
}

/// Line-oriented reader over stdin.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `message` and read one trimmed line. `None` on end of input.
    pub async fn ask(&mut self, message: &str) -> Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(message.as_bytes()).await?;
        stdout.flush().await?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

/// Whether an input line asks to leave the session.
pub fn is_quit(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "q" | "quit" | "exit")
}

/// Whether an input line asks for the in-game stats.
pub fn is_stats(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "s" | "stats")
}

/// Terminal rendering of a feedback cue.
pub fn cue_mark(cue: Option<Cue>) -> &'static str {
    match cue {
        Some(Cue::Success) => "✓",
        Some(Cue::Error) => "✗",
        Some(Cue::Win) => "★",
        None => "·",
    }
}
