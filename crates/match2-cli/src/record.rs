use std::{
    collections::VecDeque,
    fs::{self, File},
    io::{BufWriter, Write as _},
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Utc;
use match2_engine::{
    BoardSeed, GameConfig, GameSession, GameStats, Level, Position, SessionState, TapError,
    TurnOutcome, TurnResult,
};

use crate::schema::record::{RecordedSession, TurnRecord};

/// A wrapper around [`GameSession`] that records every accepted tap.
///
/// Taps go through [`play_turn`](Self::play_turn), which snapshots the
/// settled board first. Use [`into_history`](Self::into_history) to extract
/// the recorded history after the game ends.
#[derive(Debug)]
pub struct RecordingSession {
    session: GameSession,
    history: SessionHistory,
}

/// Read-only access to the underlying `GameSession`.
///
/// `DerefMut` is not implemented: taps must go through
/// [`RecordingSession::play_turn`] to be recorded.
impl Deref for RecordingSession {
    type Target = GameSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl RecordingSession {
    /// Wraps `session`, keeping at most `history_size` turns.
    pub fn new(session: GameSession, level: Option<Level>, history_size: usize) -> Self {
        let history = SessionHistory::new(
            session.seed(),
            *session.config(),
            level,
            history_size,
        );
        Self { session, history }
    }

    /// Consumes the session and returns the recorded history.
    pub fn into_history(mut self) -> SessionHistory {
        self.history
            .finish(*self.session.stats(), self.session.session_state());
        self.history
    }

    fn capture_snapshot(&self, tap: Position) -> TurnRecord {
        TurnRecord {
            turn: self.session.stats().turns(),
            tap,
            board_before: board_rows(&self.session),
            result: TurnResult::default(),
            points: 0,
            bomb_created: false,
            gravity_steps: 0,
        }
    }

    /// Taps `pos`, settles the board and records the turn.
    ///
    /// Refused taps are not recorded.
    pub fn play_turn(&mut self, pos: Position) -> Result<TurnOutcome<()>, TapError> {
        let mut snapshot = self.capture_snapshot(pos);
        let outcome = self.session.play_turn(pos)?;
        snapshot.result = outcome.result;
        snapshot.points = outcome.points;
        snapshot.bomb_created = outcome.bomb_created.is_some();
        snapshot.gravity_steps = outcome.gravity.len();
        self.history.record(snapshot);
        Ok(outcome)
    }
}

/// Rows of the session's board as rendered by its `Display` impl.
pub fn board_rows(session: &GameSession) -> Vec<String> {
    session
        .board()
        .to_string()
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Recorded history of a game session.
///
/// Holds the seed, options and level needed to rebuild the session, the
/// final statistics and a ring buffer of the most recent turns.
///
/// Created by [`RecordingSession::into_history`] and saved to a file with
/// [`save`](Self::save).
#[derive(Debug)]
pub struct SessionHistory {
    seed: BoardSeed,
    config: GameConfig,
    level: Option<Level>,
    final_stats: Option<(GameStats, SessionState)>,
    buffer: RingBuffer<TurnRecord>,
}

impl SessionHistory {
    fn new(seed: BoardSeed, config: GameConfig, level: Option<Level>, capacity: usize) -> Self {
        Self {
            seed,
            config,
            level,
            final_stats: None,
            buffer: RingBuffer::with_capacity(capacity),
        }
    }

    fn record(&mut self, snapshot: TurnRecord) {
        self.buffer.push(snapshot);
    }

    fn finish(&mut self, stats: GameStats, state: SessionState) {
        self.final_stats = Some((stats, state));
    }

    /// Builds the serializable form of the history.
    ///
    /// # Panics
    ///
    /// Panics if called before [`RecordingSession::into_history`] sets the
    /// final stats, which cannot happen since `SessionHistory` is only
    /// reachable through `into_history`.
    pub fn to_recorded(&self) -> RecordedSession {
        let (final_stats, final_state) = self
            .final_stats
            .expect("final_stats should be set before save");
        RecordedSession {
            recorded_at: Utc::now(),
            seed: self.seed,
            config: self.config,
            level: self.level.clone(),
            final_stats,
            final_state,
            turns: self.buffer.to_vec(),
        }
    }

    /// Saves the recorded session to a JSON file and returns its path.
    ///
    /// The filename is `{level}_{YYYYMMDD_HHMMSS}.json`, with `random` as
    /// the level name for randomly filled boards.
    pub fn save(&self, record_dir: &Path) -> anyhow::Result<PathBuf> {
        let data = self.to_recorded();

        fs::create_dir_all(record_dir)
            .with_context(|| format!("Failed to create directory {}", record_dir.display()))?;

        let prefix = self.level.as_ref().map_or("random", |level| level.name.as_str());
        let filename = format!("{prefix}_{}.json", data.recorded_at.format("%Y%m%d_%H%M%S"));
        let filepath = record_dir.join(filename);

        let file = File::create(&filepath)
            .with_context(|| format!("Failed to create file: {}", filepath.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &data)
            .with_context(|| format!("Failed to write JSON to {}", filepath.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {}", filepath.display()))?;

        Ok(filepath)
    }
}

/// A fixed-capacity ring buffer that drops the oldest entries when full.
#[derive(Debug)]
struct RingBuffer<T> {
    capacity: usize,
    buf: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            buf: VecDeque::with_capacity(capacity),
        }
    }

    fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.buf.len() >= self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(item);
    }

    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.buf.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use match2_engine::{ANY_COLOR as A, PlainTiles};

    use super::*;

    fn tiny_session() -> (GameSession, Level) {
        let level = Level {
            name: "pair".to_owned(),
            width: 2,
            height: 2,
            count_colors: 2,
            field: vec![vec![1, 1], vec![2, 2]],
            drop_queues: Vec::new(),
        };
        let config = GameConfig {
            turns_limit: 5,
            score_goal: Some(10_000),
            ..GameConfig::default()
        };
        let session =
            GameSession::from_level(&level, &config, BoardSeed::from_bytes([3; 16]), PlainTiles)
                .unwrap();
        (session, level)
    }

    #[test]
    fn test_ring_buffer_overwrites_oldest_when_full() {
        let mut buf: RingBuffer<i32> = RingBuffer::with_capacity(3);

        buf.push(1);
        buf.push(2);
        buf.push(3);
        assert_eq!(buf.to_vec(), vec![1, 2, 3]);

        buf.push(4);
        assert_eq!(buf.to_vec(), vec![2, 3, 4]);
    }

    #[test]
    fn test_ring_buffer_zero_capacity_keeps_nothing() {
        let mut buf: RingBuffer<i32> = RingBuffer::with_capacity(0);
        buf.push(1);
        assert!(buf.to_vec().is_empty());
    }

    #[test]
    fn test_records_accepted_taps_only() {
        let (session, level) = tiny_session();
        let mut recording = RecordingSession::new(session, Some(level), 10);

        let before = board_rows(&recording);
        assert_eq!(before, vec!["11".to_owned(), "22".to_owned()]);

        let outcome = recording.play_turn(Position::new(0, 0)).unwrap();
        assert_eq!(outcome.points, 100);

        let history = recording.into_history();
        let recorded = history.to_recorded();
        assert_eq!(recorded.turns.len(), 1);

        let turn = &recorded.turns[0];
        assert_eq!(turn.turn, 0);
        assert_eq!(turn.tap, Position::new(0, 0));
        assert_eq!(turn.board_before, before);
        assert_eq!(turn.points, 100);
        assert_eq!(turn.result.killed_by_tap, 2);
        assert!(turn.gravity_steps > 0);
        assert_eq!(recorded.final_stats.points(), 100);
        assert_eq!(recorded.final_state, SessionState::Playing);
        assert_eq!(recorded.level.map(|level| level.name), Some("pair".to_owned()));
    }

    #[test]
    fn test_refused_tap_is_not_recorded() {
        let level = Level {
            name: "checkers".to_owned(),
            width: 2,
            height: 2,
            count_colors: 2,
            field: vec![vec![1, 2], vec![2, 1]],
            drop_queues: Vec::new(),
        };
        let session = GameSession::from_level(
            &level,
            &GameConfig::default(),
            BoardSeed::from_bytes([0; 16]),
            PlainTiles,
        )
        .unwrap();
        let mut recording = RecordingSession::new(session, None, 10);

        assert!(matches!(
            recording.play_turn(Position::new(0, 0)),
            Err(TapError::GroupTooSmall { size: 1, min: 2 })
        ));
        assert!(recording.into_history().to_recorded().turns.is_empty());
    }

    #[test]
    fn test_recorded_session_round_trips_through_json() {
        let level = Level {
            name: "any".to_owned(),
            width: 3,
            height: 3,
            count_colors: 2,
            field: vec![vec![A; 3]; 3],
            drop_queues: Vec::new(),
        };
        let session = GameSession::from_level(
            &level,
            &GameConfig::default(),
            BoardSeed::from_bytes([9; 16]),
            PlainTiles,
        )
        .unwrap();
        let recording = RecordingSession::new(session, Some(level), 10);
        let recorded = recording.into_history().to_recorded();

        let json = serde_json::to_string(&recorded).unwrap();
        let parsed: RecordedSession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seed, recorded.seed);
        assert_eq!(parsed.config, recorded.config);
        assert_eq!(parsed.level, recorded.level);
        assert_eq!(parsed.final_stats, recorded.final_stats);
    }
}
