use chrono::{DateTime, Utc};
use match2_engine::{BoardSeed, GameConfig, GameStats, Level, Position, SessionState, TurnResult};
use serde::{Deserialize, Serialize};

/// Recorded play session with metadata for replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSession {
    /// Timestamp when recording was created (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    /// Random seed used for tile colors
    pub seed: BoardSeed,
    /// Options the session was played with, level overrides applied
    pub config: GameConfig,
    /// Level layout, or `None` for a randomly filled board
    pub level: Option<Level>,
    /// Final game statistics at the time of recording
    pub final_stats: GameStats,
    pub final_state: SessionState,
    /// Taps in play order, oldest first
    pub turns: Vec<TurnRecord>,
}

/// A single turn, with the settled board the tap was made on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Turn number (0-indexed)
    pub turn: usize,
    pub tap: Position,
    /// Board before the tap, one string per row (see `Board`'s `Display`)
    pub board_before: Vec<String>,
    pub result: TurnResult,
    /// Points earned by the turn
    pub points: usize,
    /// Whether the tap left a bomb behind
    pub bomb_created: bool,
    /// Number of active gravity steps until the board settled
    pub gravity_steps: usize,
}
