use std::{collections::HashSet, path::PathBuf};

use anyhow::Context;
use match2_engine::{
    BoardSeed, GameConfig, GameSession, GameStats, PlainTiles, Position, SessionState, TileKind,
    points_for_destroyed_group,
};
use rand::Rng as _;
use serde::Serialize;
use tracing::info;

use crate::{
    record::RecordingSession,
    util::{self, Output},
};

/// How the bot picks its next tap.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Strategy {
    /// The tap earning the most points this turn
    #[default]
    Greedy,
    /// The first legal tap in row-major order
    First,
}

/// Overrides for the game options. Unset options keep the base value.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    #[clap(long)]
    width: Option<usize>,
    #[clap(long)]
    height: Option<usize>,
    /// Number of tile colors
    #[clap(long)]
    colors: Option<u8>,
    /// Smallest group a tap destroys
    #[clap(long)]
    min_group: Option<usize>,
    /// Smallest group that leaves a bomb behind
    #[clap(long)]
    bomb_group: Option<usize>,
    #[clap(long)]
    bomb_radius: Option<u32>,
    /// Number of turns before the level is lost
    #[clap(long)]
    turns: Option<usize>,
    /// Points needed to win
    #[clap(long)]
    goal: Option<usize>,
}

impl ConfigArg {
    fn apply(&self, base: GameConfig) -> GameConfig {
        GameConfig {
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            count_colors: self.colors.unwrap_or(base.count_colors),
            min_group_size: self.min_group.unwrap_or(base.min_group_size),
            group_size_for_bomb: self.bomb_group.unwrap_or(base.group_size_for_bomb),
            bomb_radius: self.bomb_radius.unwrap_or(base.bomb_radius),
            turns_limit: self.turns.unwrap_or(base.turns_limit),
            score_goal: self.goal.or(base.score_goal),
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    #[clap(flatten)]
    config: ConfigArg,
    /// Base game options (JSON format), before the overrides above
    #[clap(long = "config")]
    config_file: Option<PathBuf>,
    /// Built-in level to play instead of a randomly filled board
    #[clap(long)]
    level: Option<String>,
    /// Level layout file (JSON format)
    #[clap(long, conflicts_with = "level")]
    level_file: Option<PathBuf>,
    /// Seed for tile colors, as 32 hex digits (random when omitted)
    #[clap(long)]
    seed: Option<BoardSeed>,
    /// Tap selection strategy (greedy or first)
    #[clap(long, default_value = "greedy")]
    strategy: Strategy,
    /// Print the board after every turn
    #[clap(long)]
    show_boards: bool,
    /// Save the game recording to a file when the session ends
    #[clap(long)]
    save_recording: bool,
    /// Directory to save recording files
    #[clap(long, default_value = "./data/recordings/")]
    record_dir: PathBuf,
    /// Maximum number of turns to keep in memory (oldest are discarded)
    #[clap(long, default_value_t = 10000)]
    history_size: usize,
    /// Output file for the final summary (stdout when omitted)
    #[clap(long)]
    output: Option<PathBuf>,
}

/// Final result of an auto-played session.
#[derive(Debug, Clone, Serialize)]
struct PlaySummary {
    seed: BoardSeed,
    level: Option<String>,
    final_state: SessionState,
    goal: usize,
    stats: GameStats,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        config,
        config_file,
        level,
        level_file,
        seed,
        strategy,
        show_boards,
        save_recording,
        record_dir,
        history_size,
        output,
    } = arg;

    let base = match config_file {
        Some(path) => util::read_config_file(path)?,
        None => GameConfig::default(),
    };
    let config = config.apply(base);
    let level = util::resolve_level(level.as_deref(), level_file.as_deref())?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());

    let session = match &level {
        Some(level) => GameSession::from_level(level, &config, seed, PlainTiles)
            .with_context(|| format!("Failed to load level {}", level.name))?,
        None => GameSession::with_seed(config, seed).context("Invalid game options")?,
    };
    let level_name = level.as_ref().map(|level| level.name.clone());
    eprintln!(
        "Playing {} ({}x{}) with seed {}",
        level_name.as_deref().unwrap_or("a random board"),
        session.config().width,
        session.config().height,
        seed_hex(seed),
    );

    let mut session = RecordingSession::new(session, level, *history_size);
    play(&mut session, *strategy, *show_boards)?;

    eprintln!(
        "{:?} after {} turns: {} / {} points",
        session.session_state(),
        session.stats().turns(),
        session.stats().points(),
        session.goal(),
    );
    let summary = PlaySummary {
        seed,
        level: level_name,
        final_state: session.session_state(),
        goal: session.goal(),
        stats: *session.stats(),
    };

    if *save_recording {
        let path = session.into_history().save(record_dir)?;
        eprintln!("Recording saved to {}", path.display());
    }

    Output::save_json(&summary, output.clone())
}

/// Taps until the session ends or no legal tap is left.
fn play(
    session: &mut RecordingSession,
    strategy: Strategy,
    show_boards: bool,
) -> anyhow::Result<()> {
    while session.session_state().is_playing() {
        let Some(candidate) = strategy.choose(&candidates(session)) else {
            info!(turns = session.stats().turns(), "no playable tap left");
            break;
        };
        let outcome = session
            .play_turn(candidate.pos)
            .with_context(|| format!("Tap at {} was refused", candidate.pos))?;

        if show_boards {
            eprintln!(
                "turn {}: tap {} +{} ({} / {})",
                session.stats().turns(),
                outcome.tapped,
                outcome.points,
                session.stats().points(),
                session.goal(),
            );
            eprintln!("{}", session.board());
        }
    }
    Ok(())
}

fn seed_hex(seed: BoardSeed) -> String {
    format!("{:032x}", u128::from_be_bytes(seed.to_bytes()))
}

/// A legal tap and the points it earns this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    pos: Position,
    points: usize,
}

impl Strategy {
    fn choose(self, candidates: &[Candidate]) -> Option<Candidate> {
        match self {
            Strategy::First => candidates.first().copied(),
            // strict comparison keeps the earliest candidate on ties
            Strategy::Greedy => candidates.iter().copied().reduce(|best, candidate| {
                if candidate.points > best.points {
                    candidate
                } else {
                    best
                }
            }),
        }
    }
}

/// Legal taps in row-major order, one per group and one per bomb.
fn candidates(session: &GameSession) -> Vec<Candidate> {
    let board = session.board();
    let config = session.config();
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for tile in board.tiles() {
        let pos = tile.position();
        match tile.kind() {
            TileKind::Bomb => {
                let plan = board.plan_blast(pos, config.bomb_radius);
                candidates.push(Candidate {
                    pos,
                    points: points_for_destroyed_group(plan.area.len(), true),
                });
            }
            TileKind::Simple => {
                if seen.contains(&pos) {
                    continue;
                }
                let group = board.group_at(pos);
                seen.extend(group.iter().copied());
                if group.len() >= config.min_group_size {
                    candidates.push(Candidate {
                        pos,
                        points: points_for_destroyed_group(group.len(), false),
                    });
                }
            }
            TileKind::Block => {}
        }
    }
    candidates
}
