//! The `neuromaster clinical` and `neuromaster visual` commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use neuromaster_core::catalog;
use neuromaster_core::model::{GameMode, NerveRecord};
use neuromaster_core::session::{ChoiceSession, Round, RoundContent, RoundState, Selection};
use neuromaster_core::stats::StatsStore;
use neuromaster_core::traits::{ContentProvider, Illustration};
use neuromaster_providers::create_provider;
use neuromaster_report::html::format_value;

use super::stats::print_mode_stats;
use super::{cue_mark, is_quit, is_stats, open, Prompt};

pub async fn execute(
    mode: GameMode,
    provider_name: Option<String>,
    config_path: Option<&Path>,
    stats_dir: Option<PathBuf>,
) -> Result<()> {
    let (config, stats) = open(config_path, stats_dir)?;
    let (name, provider_config) = config.provider(provider_name.as_deref())?;
    let provider: Arc<dyn ContentProvider> = Arc::from(create_provider(&name, &provider_config)?);

    let mut session = match mode {
        GameMode::Visual => ChoiceSession::visual(provider, Arc::clone(&stats)),
        _ => ChoiceSession::clinical(provider, Arc::clone(&stats)),
    };
    let mut prompt = Prompt::new();

    println!(
        "{} quiz using '{name}'. s shows stats, q quits and saves your score.",
        mode_title(mode)
    );
    println!("Record: {}\n", format_value(mode, stats.best(mode)));

    let played = play(&mut session, &*stats, &config.image_dir, &mut prompt).await;

    let score = session.score();
    let summary = session.exit();
    match summary.recorded {
        Some(_) => println!("\nSession over. Score {score} saved."),
        None => println!("\nSession over. Nothing to save."),
    }
    played
}

/// Round loop. Returns when the player quits or input ends; the caller
/// always exits the session afterwards.
async fn play(
    session: &mut ChoiceSession,
    stats: &dyn StatsStore,
    image_dir: &Path,
    prompt: &mut Prompt,
) -> Result<()> {
    let mode = session.mode();
    let record = format_value(mode, stats.best(mode));
    let mut shown: Option<u64> = None;

    announce_loading(mode);
    session.load_round().await;

    loop {
        match session.state().clone() {
            RoundState::Ready => {
                let Some(round) = session.round() else {
                    break;
                };
                let number = round.number;
                let options = round.options.clone();
                if shown != Some(number) {
                    if let Err(e) = show_round(round, image_dir) {
                        println!("  Could not show this round: {e:#}");
                        let Some(input) = prompt.ask("Enter to retry, q to quit: ").await? else {
                            break;
                        };
                        if is_quit(&input) {
                            break;
                        }
                        announce_loading(mode);
                        session.load_round().await;
                        continue;
                    }
                    shown = Some(number);
                }

                let Some(input) = prompt
                    .ask(&format!(
                        "[score {} | record {record}] Your answer (1-4 or a name): ",
                        session.score()
                    ))
                    .await?
                else {
                    break;
                };
                if is_quit(&input) {
                    break;
                }
                if is_stats(&input) {
                    print_mode_stats(stats, mode);
                    continue;
                }
                let Some(nerve) = resolve(&options, &input) else {
                    println!("  Pick one of the listed options.");
                    continue;
                };

                let outcome = session.select(nerve.id);
                let mark = cue_mark(outcome.cue());
                match outcome {
                    Selection::Correct { score } => {
                        println!("  {mark} Correct, {} {}. Score: {score}", nerve.roman, nerve.name)
                    }
                    Selection::Wrong { target_id } => {
                        let target = catalog::by_id(target_id)?;
                        println!(
                            "  {mark} Not quite. It was {} {}: {}",
                            target.roman, target.name, target.key_function
                        );
                    }
                    _ => println!("  Pick one of the listed options."),
                }
            }
            RoundState::Answered { .. } => {
                let Some(input) = prompt
                    .ask("Enter for the next round, s for stats, q to quit: ")
                    .await?
                else {
                    break;
                };
                if is_quit(&input) {
                    break;
                }
                if is_stats(&input) {
                    print_mode_stats(stats, mode);
                    continue;
                }
                announce_loading(mode);
                session.advance().await;
            }
            RoundState::Unavailable { reason } => {
                println!("  Content unavailable: {reason}");
                let Some(input) = prompt.ask("Enter to retry, q to quit: ").await? else {
                    break;
                };
                if is_quit(&input) {
                    break;
                }
                announce_loading(mode);
                session.advance().await;
            }
            RoundState::Idle | RoundState::Loading => {
                session.load_round().await;
            }
        }
    }
    Ok(())
}

fn mode_title(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Visual => "Visual",
        _ => "Clinical",
    }
}

fn announce_loading(mode: GameMode) {
    match mode {
        GameMode::Visual => println!("Generating illustration..."),
        _ => println!("Generating clinical case..."),
    }
}

/// An option number, or a name/numeral naming one of the options.
fn resolve(options: &[&'static NerveRecord], input: &str) -> Option<&'static NerveRecord> {
    if let Ok(n) = input.parse::<usize>() {
        return (1..=options.len())
            .contains(&n)
            .then(|| options[n - 1]);
    }
    let nerve = catalog::find(input)?;
    options.iter().copied().find(|o| o.id == nerve.id)
}

fn show_round(round: &Round, image_dir: &Path) -> Result<()> {
    println!("\nRound {}", round.number);
    match &round.content {
        RoundContent::Scenario(scenario) => {
            println!("{}", scenario.text);
        }
        RoundContent::Illustration { image, .. } => {
            let path = save_image(round.number, image, image_dir)?;
            println!("Which nerve does this illustration show? {}", path.display());
        }
    }
    for (i, option) in round.options.iter().enumerate() {
        println!("  {}) {}", i + 1, option.name);
    }
    Ok(())
}

fn save_image(number: u64, image: &Illustration, image_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(image_dir)
        .with_context(|| format!("failed to create {}", image_dir.display()))?;
    let path = image_dir.join(format!("round-{number}.{}", image.extension()));
    let bytes = image
        .decode()
        .context("provider returned an undecodable image")?;
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
