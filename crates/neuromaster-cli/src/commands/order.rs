//! The `neuromaster order` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use neuromaster_core::catalog;
use neuromaster_core::model::{GameMode, NerveRecord};
use neuromaster_core::session::{OrderingSession, Selection};
use neuromaster_core::stats::StatsStore;
use neuromaster_report::html::format_value;

use super::stats::print_mode_stats;
use super::{cue_mark, is_quit, is_stats, open, Prompt};

const SLOT_LABELS: &[u8; 12] = b"ABCDEFGHIJKL";

pub async fn execute(config_path: Option<&Path>, stats_dir: Option<PathBuf>) -> Result<()> {
    let (_config, stats) = open(config_path, stats_dir)?;
    let mut prompt = Prompt::new();

    println!("Pick the cranial nerves in order, I to XII. The clock is running.");
    println!("Answer with a slot letter, a nerve name or a number. s shows stats, q quits.");

    while play_once(&stats, &mut prompt).await? {}
    Ok(())
}

/// One timed run. Returns whether the player asked for another.
async fn play_once(stats: &Arc<dyn StatsStore>, prompt: &mut Prompt) -> Result<bool> {
    let previous_best = stats.best(GameMode::Ordering);
    println!(
        "\nRecord: {}\n",
        format_value(GameMode::Ordering, previous_best)
    );

    let mut session = OrderingSession::start(Arc::clone(stats));
    let played = run(&mut session, &**stats, previous_best, prompt).await;
    let won = session.is_won();
    let summary = session.exit();
    if summary.recorded.is_none() {
        println!("Run abandoned, nothing recorded.");
    }
    played?;
    if !won {
        return Ok(false);
    }

    loop {
        let Some(input) = prompt.ask("r to play again, s for stats, q to quit: ").await? else {
            return Ok(false);
        };
        if is_stats(&input) {
            print_mode_stats(&**stats, GameMode::Ordering);
            continue;
        }
        return Ok(input.eq_ignore_ascii_case("r"));
    }
}

async fn run(
    session: &mut OrderingSession,
    stats: &dyn StatsStore,
    previous_best: Option<f64>,
    prompt: &mut Prompt,
) -> Result<()> {
    let record = format_value(GameMode::Ordering, previous_best);

    while !session.is_won() {
        print_board(session);
        let expected = catalog::by_id(session.expected())?;
        let Some(input) = prompt
            .ask(&format!(
                "[{:.1}s | record {record}] Nerve {}? ",
                session.elapsed_secs(),
                expected.roman
            ))
            .await?
        else {
            break;
        };
        if input.is_empty() {
            continue;
        }
        if is_quit(&input) {
            break;
        }
        if is_stats(&input) {
            print_mode_stats(stats, GameMode::Ordering);
            continue;
        }

        let Some(nerve) = resolve(session, &input) else {
            println!("  No nerve matches '{input}'.");
            continue;
        };

        let outcome = session.select(nerve.id);
        let mark = cue_mark(outcome.cue());
        match outcome {
            Selection::Advanced { .. } => println!("  {mark} {} {}", nerve.roman, nerve.name),
            Selection::Missed { .. } => println!(
                "  {mark} {} is nerve {}, not {}",
                nerve.name, nerve.roman, expected.roman
            ),
            Selection::Won { elapsed_secs } => {
                println!("  {mark} {} {}", nerve.roman, nerve.name);
                println!("\nAll twelve in {elapsed_secs:.1}s!");
                if GameMode::Ordering.is_better(elapsed_secs, previous_best) {
                    println!("New personal best.");
                }
            }
            Selection::Ignored => {
                println!("  {} {} is already placed.", nerve.roman, nerve.name)
            }
            Selection::Correct { .. } | Selection::Wrong { .. } => {}
        }
    }
    Ok(())
}

/// Map input onto a nerve: a single board letter first, then a catalog lookup.
fn resolve(session: &OrderingSession, input: &str) -> Option<&'static NerveRecord> {
    if let [letter] = input.as_bytes() {
        let upper = letter.to_ascii_uppercase();
        if let Some(slot) = SLOT_LABELS.iter().position(|&l| l == upper) {
            return session.board().get(slot).copied();
        }
    }
    catalog::find(input)
}

fn print_board(session: &OrderingSession) {
    let remaining: Vec<u8> = session.remaining().map(|n| n.id).collect();
    let slots: Vec<String> = session
        .board()
        .iter()
        .zip(SLOT_LABELS.iter())
        .filter(|(nerve, _)| remaining.contains(&nerve.id))
        .map(|(nerve, label)| {
            let flag = if session.flagged() == Some(nerve.id) {
                "!"
            } else {
                ""
            };
            format!("{}) {}{flag}", *label as char, nerve.name)
        })
        .collect();
    println!("{}", slots.join("   "));
}
