use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, points_for_destroyed_group};

/// Size of the group whose points, earned every turn, reach the derived goal.
const GOAL_GROUP_SIZE: usize = 4;

/// Options of one level, passed explicitly to the board and the session.
///
/// All options are validated by range only, see [`GameConfig::validate`].
///
/// # Example
///
/// ```
/// use match2_engine::GameConfig;
///
/// let config = GameConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.goal(), 6400);
///
/// let too_wide = GameConfig { width: 21, ..GameConfig::default() };
/// assert!(too_wide.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Number of colors; simple tiles use colors `1..=count_colors`.
    pub count_colors: u8,
    /// Smallest group a tap destroys.
    pub min_group_size: usize,
    /// Smallest destroyed group that leaves a bomb behind.
    pub group_size_for_bomb: usize,
    /// Manhattan radius of a bomb blast.
    pub bomb_radius: u32,
    pub turns_limit: usize,
    /// Points needed to win; derived from the other options when `None`.
    pub score_goal: Option<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub const SIZE_RANGE: RangeInclusive<usize> = 2..=20;
    pub const COLORS_RANGE: RangeInclusive<usize> = 2..=6;
    pub const MIN_GROUP_RANGE: RangeInclusive<usize> = 2..=5;
    pub const BOMB_RADIUS_RANGE: RangeInclusive<usize> = 1..=20;
    pub const TURNS_RANGE: RangeInclusive<usize> = 1..=1000;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            width: 8,
            height: 8,
            count_colors: 5,
            min_group_size: 2,
            group_size_for_bomb: 5,
            bomb_radius: 2,
            turns_limit: 20,
            score_goal: None,
        }
    }

    /// Checks every option against its allowed range.
    ///
    /// `group_size_for_bomb` must lie between `min_group_size` and the number
    /// of cells on the board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("width", self.width, Self::SIZE_RANGE)?;
        check_range("height", self.height, Self::SIZE_RANGE)?;
        check_range(
            "count_colors",
            usize::from(self.count_colors),
            Self::COLORS_RANGE,
        )?;
        check_range("min_group_size", self.min_group_size, Self::MIN_GROUP_RANGE)?;
        check_range(
            "group_size_for_bomb",
            self.group_size_for_bomb,
            self.min_group_size..=self.width * self.height,
        )?;
        check_range(
            "bomb_radius",
            usize::try_from(self.bomb_radius).unwrap_or(usize::MAX),
            Self::BOMB_RADIUS_RANGE,
        )?;
        check_range("turns_limit", self.turns_limit, Self::TURNS_RANGE)?;
        Ok(())
    }

    /// Points needed to win the level.
    ///
    /// Without an explicit goal this is the score of destroying a group of
    /// four tiles on every turn.
    #[must_use]
    pub fn goal(&self) -> usize {
        self.score_goal.unwrap_or_else(|| {
            points_for_destroyed_group(GOAL_GROUP_SIZE, false).saturating_mul(self.turns_limit)
        })
    }
}

fn check_range(
    name: &'static str,
    value: usize,
    range: RangeInclusive<usize>,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfRange {
        name,
        value,
        min: *range.start(),
        max: *range.end(),
    })
}
