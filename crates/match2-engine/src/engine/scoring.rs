use serde::{Deserialize, Serialize};

/// Points for each destroyed tile.
pub const PRICE_PER_TILE: usize = 50;

/// Multiplier of the quadratic bonus for large tapped groups.
pub const GROUP_MULTIPLIER: usize = 10;

/// Group size up to which a tap earns no bonus.
const BONUS_FREE_TILES: usize = 4;

/// Points for destroying `count` tiles in one go.
///
/// A tapped group earns `count * 50 + max(0, count² - 4) * 10`. Tiles
/// destroyed by a bomb earn the per-tile price only.
///
/// # Example
///
/// ```
/// use match2_engine::points_for_destroyed_group;
///
/// assert_eq!(points_for_destroyed_group(5, false), 460);
/// assert_eq!(points_for_destroyed_group(5, true), 250);
/// ```
#[must_use]
pub const fn points_for_destroyed_group(count: usize, via_bomb: bool) -> usize {
    let base = count.saturating_mul(PRICE_PER_TILE);
    if via_bomb {
        return base;
    }
    let bonus = count
        .saturating_mul(count)
        .saturating_sub(BONUS_FREE_TILES)
        .saturating_mul(GROUP_MULTIPLIER);
    base.saturating_add(bonus)
}

/// Tiles destroyed by a single player action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    /// Tiles of the tapped group.
    pub killed_by_tap: usize,
    /// Tiles caught in bomb blasts, bomb epicenters included.
    pub killed_by_explosion: usize,
}

impl TurnResult {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.killed_by_tap + self.killed_by_explosion
    }

    /// Points of the turn: tapped tiles with the group bonus, exploded tiles
    /// at the linear price.
    #[must_use]
    pub const fn points(&self) -> usize {
        points_for_destroyed_group(self.killed_by_tap, false)
            .saturating_add(points_for_destroyed_group(self.killed_by_explosion, true))
    }

    pub const fn add(&mut self, other: Self) {
        self.killed_by_tap += other.killed_by_tap;
        self.killed_by_explosion += other.killed_by_explosion;
    }
}

/// Statistics of a game session.
///
/// - **Points**: sum of every turn's [`TurnResult::points`]
/// - **Turns**: player actions taken, one per tap regardless of chains
/// - **Destroyed tiles**: split by tap and by explosion
/// - **Bombs**: created from large groups and detonated (chains included)
///
/// # Example
///
/// ```
/// use match2_engine::{GameStats, TurnResult};
///
/// let mut stats = GameStats::new();
/// stats.complete_turn(TurnResult { killed_by_tap: 5, killed_by_explosion: 0 });
///
/// assert_eq!(stats.points(), 460);
/// assert_eq!(stats.turns(), 1);
/// assert_eq!(stats.largest_group(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    points: usize,
    turns: usize,
    killed_by_tap: usize,
    killed_by_explosion: usize,
    largest_group: usize,
    bombs_created: usize,
    bombs_detonated: usize,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: 0,
            turns: 0,
            killed_by_tap: 0,
            killed_by_explosion: 0,
            largest_group: 0,
            bombs_created: 0,
            bombs_detonated: 0,
        }
    }

    #[must_use]
    pub const fn points(&self) -> usize {
        self.points
    }

    #[must_use]
    pub const fn turns(&self) -> usize {
        self.turns
    }

    #[must_use]
    pub const fn killed_by_tap(&self) -> usize {
        self.killed_by_tap
    }

    #[must_use]
    pub const fn killed_by_explosion(&self) -> usize {
        self.killed_by_explosion
    }

    /// Size of the largest group destroyed by a single tap.
    #[must_use]
    pub const fn largest_group(&self) -> usize {
        self.largest_group
    }

    #[must_use]
    pub const fn bombs_created(&self) -> usize {
        self.bombs_created
    }

    #[must_use]
    pub const fn bombs_detonated(&self) -> usize {
        self.bombs_detonated
    }

    /// Records one player action and returns the points it earned.
    pub const fn complete_turn(&mut self, result: TurnResult) -> usize {
        let points = result.points();
        self.turns += 1;
        self.points = self.points.saturating_add(points);
        self.killed_by_tap += result.killed_by_tap;
        self.killed_by_explosion += result.killed_by_explosion;
        if result.killed_by_tap > self.largest_group {
            self.largest_group = result.killed_by_tap;
        }
        points
    }

    pub const fn record_bomb_created(&mut self) {
        self.bombs_created += 1;
    }

    pub const fn record_bombs_detonated(&mut self, count: usize) {
        self.bombs_detonated += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_for_tap() {
        assert_eq!(points_for_destroyed_group(5, false), 5 * 50 + (25 - 4) * 10);
        assert_eq!(points_for_destroyed_group(4, false), 320);
        assert_eq!(points_for_destroyed_group(2, false), 100);
        assert_eq!(points_for_destroyed_group(0, false), 0);
    }

    #[test]
    fn test_points_never_negative_for_tiny_counts() {
        assert_eq!(points_for_destroyed_group(1, false), 50);
        assert_eq!(points_for_destroyed_group(1, true), 50);
    }

    #[test]
    fn test_points_for_bomb_are_linear() {
        assert_eq!(points_for_destroyed_group(5, true), 250);
        assert_eq!(points_for_destroyed_group(13, true), 13 * 50);
    }

    #[test]
    fn test_turn_result_mixes_both_formulas() {
        let result = TurnResult {
            killed_by_tap: 3,
            killed_by_explosion: 10,
        };
        assert_eq!(result.total(), 13);
        assert_eq!(result.points(), (150 + 50) + 500);
    }

    #[test]
    fn test_turn_result_add() {
        let mut result = TurnResult::default();
        result.add(TurnResult {
            killed_by_tap: 2,
            killed_by_explosion: 0,
        });
        result.add(TurnResult {
            killed_by_tap: 0,
            killed_by_explosion: 7,
        });
        assert_eq!(
            result,
            TurnResult {
                killed_by_tap: 2,
                killed_by_explosion: 7
            }
        );
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = GameStats::new();
        let first = stats.complete_turn(TurnResult {
            killed_by_tap: 4,
            killed_by_explosion: 0,
        });
        let second = stats.complete_turn(TurnResult {
            killed_by_tap: 0,
            killed_by_explosion: 6,
        });
        assert_eq!(first, 320);
        assert_eq!(second, 300);
        assert_eq!(stats.points(), 620);
        assert_eq!(stats.turns(), 2);
        assert_eq!(stats.killed_by_tap(), 4);
        assert_eq!(stats.killed_by_explosion(), 6);
        assert_eq!(stats.largest_group(), 4);
    }
}
