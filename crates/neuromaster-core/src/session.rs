//! Quiz session state machines.
//!
//! [`OrderingSession`] drives the timed I→XII run. [`ChoiceSession`] drives
//! the two multiple-choice modes: each round loads generated content, offers
//! the target nerve plus three distractors, and accepts a single answer.
//!
//! Sessions own their resources (clock, rng, in-flight round ticket) and
//! write to the stats store only when a result is final: on completing the
//! ordering run, or on exiting a choice session with a non-zero score.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;
use uuid::Uuid;

use crate::catalog::{self, NERVE_COUNT};
use crate::clock::SessionClock;
use crate::model::{Cue, GameMode, NerveRecord};
use crate::stats::StatsStore;
use crate::traits::{ClinicalScenario, ContentProvider, Illustration};

/// How long a wrong pick stays flagged in the ordering board.
pub const ERROR_FLASH: Duration = Duration::from_millis(500);

/// Options offered per choice round (one correct, the rest distractors).
pub const OPTION_COUNT: usize = 4;

/// Result of a `select` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// Ordering: the expected nerve was picked; `next` is now expected.
    Advanced { next: u8 },
    /// Ordering: XII was picked, the run is over.
    Won { elapsed_secs: f64 },
    /// Ordering: a nerve out of sequence was picked.
    Missed { id: u8 },
    /// Choice: the target was picked.
    Correct { score: u32 },
    /// Choice: a distractor was picked.
    Wrong { target_id: u8 },
    /// The selection had no effect.
    Ignored,
}

impl Selection {
    /// Feedback cue for the presentation layer.
    pub fn cue(&self) -> Option<Cue> {
        match self {
            Selection::Advanced { .. } | Selection::Correct { .. } => Some(Cue::Success),
            Selection::Won { .. } => Some(Cue::Win),
            Selection::Missed { .. } | Selection::Wrong { .. } => Some(Cue::Error),
            Selection::Ignored => None,
        }
    }
}

/// What a finished session left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub mode: GameMode,
    /// Value written to the stats store, if any.
    pub recorded: Option<f64>,
}

/// Pick `OPTION_COUNT - 1` distinct distractors uniformly at random and
/// shuffle them together with `target`.
pub fn build_options<R: Rng + ?Sized>(
    target: &'static NerveRecord,
    rng: &mut R,
) -> Vec<&'static NerveRecord> {
    let others: Vec<&'static NerveRecord> = catalog::all()
        .iter()
        .filter(|n| n.id != target.id)
        .collect();

    let mut options: Vec<&'static NerveRecord> = others
        .choose_multiple(rng, OPTION_COUNT - 1)
        .copied()
        .collect();
    options.push(target);
    options.shuffle(rng);
    options
}

// ---------------------------------------------------------------------------
// Ordering mode
// ---------------------------------------------------------------------------

/// Timed run: pick the nerves in anatomical order as fast as possible.
pub struct OrderingSession {
    id: Uuid,
    board: Vec<&'static NerveRecord>,
    expected: u8,
    won_in: Option<f64>,
    clock: SessionClock,
    flagged: Option<(u8, Instant)>,
    stats: Arc<dyn StatsStore>,
}

impl OrderingSession {
    /// Shuffle a fresh board and start the clock.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start(stats: Arc<dyn StatsStore>) -> Self {
        Self::start_with_rng(stats, &mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(stats: Arc<dyn StatsStore>, rng: &mut R) -> Self {
        let mut board: Vec<&'static NerveRecord> = catalog::all().iter().collect();
        board.shuffle(rng);

        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "ordering session started");

        Self {
            id,
            board,
            expected: 1,
            won_in: None,
            clock: SessionClock::start(),
            flagged: None,
            stats,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Full shuffled board, including completed nerves.
    pub fn board(&self) -> &[&'static NerveRecord] {
        &self.board
    }

    /// Board entries still to be picked, in board order.
    pub fn remaining(&self) -> impl Iterator<Item = &'static NerveRecord> + '_ {
        let won = self.is_won();
        self.board
            .iter()
            .copied()
            .filter(move |n| !won && n.id >= self.expected)
    }

    /// Ordinal of the nerve that must be picked next.
    pub fn expected(&self) -> u8 {
        self.expected
    }

    pub fn is_won(&self) -> bool {
        self.won_in.is_some()
    }

    /// Elapsed seconds; frozen at the winning pick.
    pub fn elapsed_secs(&self) -> f64 {
        self.won_in.unwrap_or_else(|| self.clock.elapsed_secs())
    }

    /// Nerve currently flagged as a wrong pick, if the flash is still active.
    pub fn flagged(&self) -> Option<u8> {
        self.flagged
            .filter(|(_, at)| at.elapsed() < ERROR_FLASH)
            .map(|(id, _)| id)
    }

    /// Pick nerve `id`.
    pub fn select(&mut self, id: u8) -> Selection {
        if self.is_won() {
            return Selection::Ignored;
        }
        // Only nerves still on the board can be picked.
        if catalog::by_id(id).is_err() || id < self.expected {
            return Selection::Ignored;
        }

        if id != self.expected {
            self.flagged = Some((id, Instant::now()));
            tracing::debug!(session = %self.id, id, expected = self.expected, "out of sequence");
            return Selection::Missed { id };
        }

        self.flagged = None;
        if usize::from(id) == NERVE_COUNT {
            let elapsed_secs = self.clock.stop();
            self.won_in = Some(elapsed_secs);
            self.stats.record_result(GameMode::Ordering, elapsed_secs);
            tracing::info!(session = %self.id, elapsed_secs, "ordering run completed");
            return Selection::Won { elapsed_secs };
        }

        self.expected += 1;
        Selection::Advanced {
            next: self.expected,
        }
    }

    /// Leave the session. A win has already been recorded; an unfinished
    /// run records nothing.
    pub fn exit(mut self) -> SessionSummary {
        self.clock.stop();
        SessionSummary {
            session_id: self.id,
            mode: GameMode::Ordering,
            recorded: self.won_in,
        }
    }
}

// ---------------------------------------------------------------------------
// Choice modes
// ---------------------------------------------------------------------------

/// Lifecycle of the current choice round.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundState {
    /// No round requested yet.
    Idle,
    /// Waiting for the content provider.
    Loading,
    /// Options shown, waiting for an answer.
    Ready,
    /// The round was answered.
    Answered { selected: u8, correct: bool },
    /// Content could not be generated; the round may be retried.
    Unavailable { reason: String },
}

/// Identifies one round load. Completions carrying an outdated ticket are
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTicket(u64);

/// Generated content a round is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundContent {
    Scenario(ClinicalScenario),
    Illustration { target_id: u8, image: Illustration },
}

impl RoundContent {
    pub fn target_id(&self) -> u8 {
        match self {
            RoundContent::Scenario(scenario) => scenario.target_id,
            RoundContent::Illustration { target_id, .. } => *target_id,
        }
    }
}

/// A loaded round.
#[derive(Debug, Clone)]
pub struct Round {
    pub number: u64,
    pub target: &'static NerveRecord,
    pub options: Vec<&'static NerveRecord>,
    pub content: RoundContent,
}

/// Multiple-choice session for the clinical or visual quiz.
pub struct ChoiceSession {
    id: Uuid,
    mode: GameMode,
    provider: Arc<dyn ContentProvider>,
    stats: Arc<dyn StatsStore>,
    rng: StdRng,
    score: u32,
    round_seq: u64,
    loading: Option<RoundTicket>,
    state: RoundState,
    round: Option<Round>,
}

impl ChoiceSession {
    /// Clinical cases: the provider picks the target nerve.
    pub fn clinical(provider: Arc<dyn ContentProvider>, stats: Arc<dyn StatsStore>) -> Self {
        Self::new(GameMode::Clinical, provider, stats)
    }

    /// Illustrations: the session picks the target nerve.
    pub fn visual(provider: Arc<dyn ContentProvider>, stats: Arc<dyn StatsStore>) -> Self {
        Self::new(GameMode::Visual, provider, stats)
    }

    fn new(mode: GameMode, provider: Arc<dyn ContentProvider>, stats: Arc<dyn StatsStore>) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, %mode, provider = provider.name(), "choice session started");
        Self {
            id,
            mode,
            provider,
            stats,
            rng: StdRng::from_entropy(),
            score: 0,
            round_seq: 0,
            loading: None,
            state: RoundState::Idle,
            round: None,
        }
    }

    /// Use a deterministic rng for target and option selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Current round, once content has arrived.
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// The answer given this round, if any.
    pub fn selected(&self) -> Option<u8> {
        match self.state {
            RoundState::Answered { selected, .. } => Some(selected),
            _ => None,
        }
    }

    /// Start a new round load, superseding any load still in flight.
    pub fn begin_round(&mut self) -> RoundTicket {
        self.round_seq += 1;
        let ticket = RoundTicket(self.round_seq);
        self.loading = Some(ticket);
        self.round = None;
        self.state = RoundState::Loading;
        ticket
    }

    /// Deliver the outcome of the load identified by `ticket`.
    ///
    /// Returns `false` (and changes nothing) if a newer round has started
    /// since. Failures never touch the score: clinical rounds fall back to
    /// the offline case, visual rounds become [`RoundState::Unavailable`].
    pub fn complete_round(
        &mut self,
        ticket: RoundTicket,
        outcome: anyhow::Result<RoundContent>,
    ) -> bool {
        if self.loading != Some(ticket) {
            tracing::debug!(session = %self.id, round = ticket.0, "discarding stale round content");
            return false;
        }
        self.loading = None;

        let resolved = outcome.and_then(|content| {
            let target = catalog::by_id(content.target_id())?;
            if let RoundContent::Illustration { image, .. } = &content {
                image.decode().context("illustration is not valid base64")?;
            }
            Ok((content, target))
        });

        let (content, target) = match resolved {
            Ok(resolved) => resolved,
            Err(e) if self.mode == GameMode::Clinical => {
                tracing::warn!(session = %self.id, "clinical case generation failed, using offline case: {e:#}");
                let scenario = ClinicalScenario::offline();
                match catalog::by_id(scenario.target_id) {
                    Ok(target) => (RoundContent::Scenario(scenario), target),
                    Err(e) => {
                        self.state = RoundState::Unavailable {
                            reason: e.to_string(),
                        };
                        return true;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(session = %self.id, "illustration generation failed: {e:#}");
                self.state = RoundState::Unavailable {
                    reason: format!("{e:#}"),
                };
                return true;
            }
        };

        let options = build_options(target, &mut self.rng);
        self.round = Some(Round {
            number: ticket.0,
            target,
            options,
            content,
        });
        self.state = RoundState::Ready;
        true
    }

    /// Request content for a new round and wait for it.
    pub async fn load_round(&mut self) -> &RoundState {
        let ticket = self.begin_round();
        let provider = Arc::clone(&self.provider);

        let outcome = match self.mode {
            GameMode::Visual => {
                let target = &catalog::all()[self.rng.gen_range(0..NERVE_COUNT)];
                provider
                    .illustration(target)
                    .await
                    .map(|image| RoundContent::Illustration {
                        target_id: target.id,
                        image,
                    })
            }
            _ => provider
                .clinical_scenario()
                .await
                .map(RoundContent::Scenario),
        };

        self.complete_round(ticket, outcome);
        &self.state
    }

    /// Move on after an answered round, or retry an unavailable one.
    pub async fn advance(&mut self) -> &RoundState {
        match self.state {
            RoundState::Answered { .. } | RoundState::Unavailable { .. } => {
                self.load_round().await
            }
            _ => &self.state,
        }
    }

    /// Answer the current round. Only the first pick of a ready round, among
    /// the offered options, counts.
    pub fn select(&mut self, id: u8) -> Selection {
        if self.state != RoundState::Ready {
            return Selection::Ignored;
        }
        let Some(round) = &self.round else {
            return Selection::Ignored;
        };
        if !round.options.iter().any(|n| n.id == id) {
            return Selection::Ignored;
        }

        let target_id = round.target.id;
        let correct = id == target_id;
        self.state = RoundState::Answered {
            selected: id,
            correct,
        };

        if correct {
            self.score += 1;
            Selection::Correct { score: self.score }
        } else {
            Selection::Wrong { target_id }
        }
    }

    /// Leave the session, recording the score if at least one round was won.
    pub fn exit(self) -> SessionSummary {
        let recorded = if self.score > 0 {
            let value = f64::from(self.score);
            self.stats.record_result(self.mode, value);
            Some(value)
        } else {
            None
        };
        tracing::info!(session = %self.id, mode = %self.mode, score = self.score, "choice session ended");

        SessionSummary {
            session_id: self.id,
            mode: self.mode,
            recorded,
        }
    }
}
