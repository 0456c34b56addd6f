use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    ConfigError, LevelError, PlainTiles, Position, TapError, Tile, TileFactory, TileId, TileKind,
};

use super::{
    BoardSeed, GameConfig, GameStats, GravityStep, Level, TurnResult, board::Board,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Won,
    Lost,
}

/// Everything one player action changed.
#[derive(Debug)]
pub struct TurnOutcome<H> {
    pub tapped: Position,
    pub result: TurnResult,
    /// Points earned by this turn.
    pub points: usize,
    /// Destroyed tiles, in destruction order.
    pub destroyed: Vec<Tile<H>>,
    /// Bombs that went off, the tapped one first. Empty for group taps.
    pub detonations: Vec<Position>,
    /// Bomb left at the tapped cell by a large group.
    pub bomb_created: Option<TileId>,
    /// Gravity steps run after the tap. Filled by [`GameSession::play_turn`].
    pub gravity: Vec<GravityStep>,
}

/// One level played turn by turn.
///
/// A turn has two phases. [`GameSession::tap`] destroys the tapped group (or
/// sets off the tapped bomb), leaves a bomb behind for large groups and
/// scores the turn. The board is then unsettled: the caller drives
/// [`GameSession::step_gravity`] until it reports no activity, and further
/// taps are refused with [`TapError::Busy`] until then.
/// [`GameSession::play_turn`] runs both phases at once.
///
/// After each tap the level is won once the points reach the goal, and lost
/// once the turns run out.
///
/// # Example
///
/// ```
/// use match2_engine::{BoardSeed, GameConfig, GameSession, Position};
///
/// let config = GameConfig { width: 4, height: 4, ..GameConfig::default() };
/// let mut session = GameSession::with_seed(config, BoardSeed::from_bytes([1; 16])).unwrap();
///
/// // Tap every cell until one holds a playable group.
/// let outcome = (0..16)
///     .map(|i| Position::new(i % 4, i / 4))
///     .find_map(|pos| session.play_turn(pos).ok());
///
/// if let Some(outcome) = outcome {
///     assert!(session.is_settled());
///     assert_eq!(session.stats().turns(), 1);
///     assert_eq!(session.stats().points(), outcome.points);
/// }
/// ```
#[derive(Debug)]
pub struct GameSession<F: TileFactory = PlainTiles> {
    config: GameConfig,
    seed: BoardSeed,
    board: Board<F>,
    stats: GameStats,
    session_state: SessionState,
    settled: bool,
}

impl GameSession<PlainTiles> {
    /// Starts a session on a randomly filled board with a random seed.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic colors.
    pub fn with_seed(config: GameConfig, seed: BoardSeed) -> Result<Self, ConfigError> {
        Self::with_factory(config, seed, PlainTiles)
    }
}

impl<F: TileFactory> GameSession<F> {
    /// Starts a session on a randomly filled board whose tiles are created
    /// through `factory`.
    pub fn with_factory(config: GameConfig, seed: BoardSeed, factory: F) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut board = Board::from_config(&config, seed, factory);
        board.random_init();
        Ok(Self::from_board(config, seed, board))
    }

    /// Starts a session on a level layout.
    ///
    /// The level's board options override those of `base`. Gravity is run
    /// until the initial layout is stable before the first turn.
    pub fn from_level(
        level: &Level,
        base: &GameConfig,
        seed: BoardSeed,
        factory: F,
    ) -> Result<Self, LevelError> {
        let config = level.apply_to(base);
        let board = level.build_board(&config, seed, factory)?;
        let mut session = Self::from_board(config, seed, board);
        session.settled = false;
        let steps = session.settle();
        debug!(level = %level.name, steps = steps.len(), "level loaded");
        Ok(session)
    }

    fn from_board(config: GameConfig, seed: BoardSeed, board: Board<F>) -> Self {
        Self {
            config,
            seed,
            board,
            stats: GameStats::new(),
            session_state: SessionState::Playing,
            settled: true,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> BoardSeed {
        self.seed
    }

    #[must_use]
    pub fn board(&self) -> &Board<F> {
        &self.board
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    /// Returns `true` once gravity has nothing left to do.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    #[must_use]
    pub fn goal(&self) -> usize {
        self.config.goal()
    }

    #[must_use]
    pub fn turns_left(&self) -> usize {
        self.config.turns_limit.saturating_sub(self.stats.turns())
    }

    /// Fraction of the goal reached, capped at 1.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn goal_progress(&self) -> f64 {
        let goal = self.goal();
        if goal == 0 {
            return 1.0;
        }
        (self.stats.points() as f64 / goal as f64).min(1.0)
    }

    /// Returns `true` if some tap would be accepted on the current board.
    #[must_use]
    pub fn has_playable_tap(&self) -> bool {
        self.board.tiles().any(|tile| match tile.kind() {
            TileKind::Bomb => true,
            TileKind::Simple => {
                self.board.group_at(tile.position()).len() >= self.config.min_group_size
            }
            TileKind::Block => false,
        })
    }

    /// Plays the tile at `pos`, leaving the board unsettled.
    ///
    /// A simple tile destroys its group when the group is large enough; a
    /// group of at least `group_size_for_bomb` tiles leaves a bomb at `pos`.
    /// A bomb sets off its chain. A refused tap leaves the session untouched.
    pub fn tap(&mut self, pos: Position) -> Result<TurnOutcome<F::Handle>, TapError> {
        if !self.session_state.is_playing() {
            return Err(TapError::GameOver);
        }
        if !self.settled {
            return Err(TapError::Busy);
        }
        let (kind, color) = self
            .board
            .tile_at(pos)
            .map(|tile| (tile.kind(), tile.color()))
            .ok_or(TapError::EmptyCell { position: pos })?;

        let mut result = TurnResult::default();
        let mut detonations = Vec::new();
        let mut bomb_created = None;
        let destroyed = match (kind, color) {
            (TileKind::Bomb, _) => {
                let explosion = self.board.trigger_bomb(pos, self.config.bomb_radius);
                result.killed_by_explosion = explosion.destroyed.len();
                detonations = explosion.detonations;
                self.stats.record_bombs_detonated(detonations.len());
                explosion.destroyed
            }
            (TileKind::Simple, Some(color)) => {
                let group = self.board.find_group(pos, color);
                if group.len() < self.config.min_group_size {
                    return Err(TapError::GroupTooSmall {
                        size: group.len(),
                        min: self.config.min_group_size,
                    });
                }
                let destroyed = self.board.destroy(&group);
                result.killed_by_tap = destroyed.len();
                if destroyed.len() >= self.config.group_size_for_bomb {
                    let bomb = self.board.create_tile(TileKind::Bomb, None);
                    bomb_created = Some(bomb.id());
                    self.board.set_tile(pos, Some(bomb));
                    self.stats.record_bomb_created();
                }
                destroyed
            }
            _ => return Err(TapError::EmptyCell { position: pos }),
        };

        let points = self.stats.complete_turn(result);
        self.settled = false;
        self.session_state = if self.stats.points() >= self.goal() {
            SessionState::Won
        } else if self.turns_left() == 0 {
            SessionState::Lost
        } else {
            SessionState::Playing
        };
        debug!(
            %pos,
            killed_by_tap = result.killed_by_tap,
            killed_by_explosion = result.killed_by_explosion,
            points,
            total = self.stats.points(),
            state = ?self.session_state,
            "turn completed"
        );

        Ok(TurnOutcome {
            tapped: pos,
            result,
            points,
            destroyed,
            detonations,
            bomb_created,
            gravity: Vec::new(),
        })
    }

    /// Advances gravity by one step.
    ///
    /// The board becomes settled when a step reports no activity.
    pub fn step_gravity(&mut self) -> GravityStep {
        let step = self.board.step_gravity();
        if !step.is_active() {
            self.settled = true;
        }
        step
    }

    /// Steps gravity until the board is settled and returns the active steps.
    pub fn settle(&mut self) -> Vec<GravityStep> {
        let mut steps = Vec::new();
        while !self.settled {
            let step = self.step_gravity();
            if step.is_active() {
                steps.push(step);
            }
        }
        steps
    }

    /// Taps `pos` and settles the board.
    pub fn play_turn(&mut self, pos: Position) -> Result<TurnOutcome<F::Handle>, TapError> {
        let mut outcome = self.tap(pos)?;
        outcome.gravity = self.settle();
        Ok(outcome)
    }
}
