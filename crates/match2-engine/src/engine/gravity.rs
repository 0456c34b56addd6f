use std::collections::HashSet;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Direction, Position, TileFactory, TileId};

use super::board::Board;

/// A tile moved by a gravity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMove {
    pub tile: TileId,
    pub from: Position,
    pub to: Position,
}

/// A tile spawned at the top of a column by a gravity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpawn {
    pub tile: TileId,
    pub at: Position,
}

/// What one call to [`Board::step_gravity`] changed.
///
/// Presentation layers animate the moves and spawns, then ask for the next
/// step. A step with no activity means the board is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GravityStep {
    /// Straight falls by one row.
    pub falls: Vec<TileMove>,
    /// Diagonal slides by one row and one column.
    pub slides: Vec<TileMove>,
    pub spawns: Vec<TileSpawn>,
}

impl GravityStep {
    /// Returns `true` if any tile moved or spawned.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.falls.is_empty() || !self.slides.is_empty() || !self.spawns.is_empty()
    }

    /// Iterates over all moves, falls first.
    pub fn moves(&self) -> impl Iterator<Item = &TileMove> + '_ {
        self.falls.iter().chain(&self.slides)
    }
}

/// Bookkeeping shared by the passes of one step.
struct StepState {
    /// Tiles that already moved during this step.
    moved: HashSet<TileId>,
    /// Source columns a tile already slid out of during this step.
    slid_columns: Vec<bool>,
    step: GravityStep,
}

impl<F: TileFactory> Board<F> {
    /// Performs one discrete gravity step for the whole board.
    ///
    /// A step alternates a straight-fall pass and a diagonal pass until a
    /// diagonal pass moves nothing, then spawns a tile at the top of every
    /// open column. Each tile moves at most one cell per step, and tiles
    /// never move up.
    ///
    /// # Straight falls
    ///
    /// Rows are scanned bottom to top, columns left to right. A tile falls one
    /// row when the cell below is free.
    ///
    /// # Diagonal slides
    ///
    /// Rows are scanned top to bottom. A tile that cannot fall straight may
    /// slide one cell down-left or down-right when:
    ///
    /// - the landing cell is free;
    /// - scanning the landing column upward from the tile's row reaches a
    ///   blocked cell before any tile, i.e. the landing cell sits in a niche
    ///   that straight falls cannot fill;
    /// - no other tile slid out of the same column during this step.
    ///
    /// Every landing cell remembers the direction of its latest arrival (its
    /// fall trigger). A direction *matches* when it is opposite to the stored
    /// one, so competing tiles take turns. Matching directions are tried
    /// first, then the direction of the tile's own previous slide, then left.
    /// A tile also yields a landing cell to the tile two columns away on the
    /// same row when that rival could slide into it with a matching direction
    /// and its own direction does not match.
    ///
    /// # Spawning
    ///
    /// Every column whose top cell is free receives a new simple tile, colored
    /// from the column's preset queue or at random. It is flagged as
    /// [`dropped`](crate::Tile::is_dropped) until the next step.
    ///
    /// Repeating steps until one is inactive always terminates.
    pub fn step_gravity(&mut self) -> GravityStep {
        self.clear_dropped_flags();
        let mut state = StepState {
            moved: HashSet::new(),
            slid_columns: vec![false; self.width()],
            step: GravityStep::default(),
        };
        loop {
            self.fall_pass(&mut state);
            if !self.slide_pass(&mut state) {
                break;
            }
        }
        self.spawn_pass(&mut state.step);

        let step = state.step;
        debug!(
            falls = step.falls.len(),
            slides = step.slides.len(),
            spawns = step.spawns.len(),
            "gravity step"
        );
        step
    }

    fn fall_pass(&mut self, state: &mut StepState) {
        for y in (0..self.height().saturating_sub(1)).rev() {
            for x in 0..self.width() {
                let from = cell(x, y);
                let Some(id) = self.tile_at(from).map(crate::Tile::id) else {
                    continue;
                };
                if state.moved.contains(&id) {
                    continue;
                }
                let to = from.below();
                if self.relocate(from, to).is_some() {
                    state.moved.insert(id);
                    state.step.falls.push(TileMove { tile: id, from, to });
                }
            }
        }
    }

    /// Returns `true` if any tile slid.
    fn slide_pass(&mut self, state: &mut StepState) -> bool {
        let mut any_slide = false;
        for y in 0..self.height().saturating_sub(1) {
            for x in 0..self.width() {
                if state.slid_columns[x] {
                    continue;
                }
                let from = cell(x, y);
                let Some(id) = self.tile_at(from).map(crate::Tile::id) else {
                    continue;
                };
                if state.moved.contains(&id) || self.is_free(from.below()) {
                    continue;
                }
                let Some(direction) = self.choose_slide(from, state) else {
                    continue;
                };
                let to = from.diagonal_below(direction);
                if self.relocate(from, to).is_none() {
                    continue;
                }
                self.set_fall_trigger(to, direction);
                state.moved.insert(id);
                state.slid_columns[x] = true;
                state.step.slides.push(TileMove { tile: id, from, to });
                any_slide = true;
            }
        }
        any_slide
    }

    fn choose_slide(&self, from: Position, state: &StepState) -> Option<Direction> {
        let mut candidates: ArrayVec<Direction, 2> = Direction::ALL
            .into_iter()
            .filter(|&direction| self.can_slide(from, direction))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let momentum = self.tile_at(from).and_then(crate::Tile::last_slide);
        candidates.sort_by_key(|&direction| {
            (
                !self.trigger_matches(from, direction),
                Some(direction) != momentum,
                direction != Direction::Left,
            )
        });
        trace!(%from, ?candidates, ?momentum, "slide candidates");

        candidates.into_iter().find(|&direction| {
            let yields = self.rival_preempts(from, direction, state);
            if yields {
                trace!(%from, ?direction, "yielding landing cell to rival");
            }
            !yields
        })
    }

    /// Geometric slide conditions: free landing cell inside a niche.
    fn can_slide(&self, from: Position, direction: Direction) -> bool {
        let to = from.diagonal_below(direction);
        if !self.is_free(to) {
            return false;
        }
        let mut probe = Position::new(to.x, from.y);
        while self.is_valid_position(probe) {
            if self.is_blocked(probe) {
                return true;
            }
            if self.tile_at(probe).is_some() {
                return false;
            }
            probe = probe.above();
        }
        false
    }

    fn trigger_matches(&self, from: Position, direction: Direction) -> bool {
        self.fall_trigger(from.diagonal_below(direction)) == Some(direction.opposite())
    }

    /// Whether the tile two columns away should take the landing cell of
    /// `direction` instead of the tile at `from`.
    fn rival_preempts(&self, from: Position, direction: Direction, state: &StepState) -> bool {
        if self.trigger_matches(from, direction) {
            return false;
        }
        let rival_pos = from.offset(2 * direction.dx(), 0);
        let rival_direction = direction.opposite();
        let Some(rival) = self.tile_at(rival_pos) else {
            return false;
        };
        let rival_column = usize::try_from(rival_pos.x).unwrap_or(usize::MAX);
        !state.moved.contains(&rival.id())
            && !state.slid_columns.get(rival_column).copied().unwrap_or(true)
            && !self.is_free(rival_pos.below())
            && self.can_slide(rival_pos, rival_direction)
            && self.trigger_matches(rival_pos, rival_direction)
    }

    fn spawn_pass(&mut self, step: &mut GravityStep) {
        for x in 0..self.width() {
            if let Some(tile) = self.spawn_at_top(x) {
                step.spawns.push(TileSpawn { tile, at: cell(x, 0) });
            }
        }
    }
}

fn cell(x: usize, y: usize) -> Position {
    Position::new(
        i32::try_from(x).unwrap_or(i32::MAX),
        i32::try_from(y).unwrap_or(i32::MAX),
    )
}
