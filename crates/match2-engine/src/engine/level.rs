use serde::{Deserialize, Serialize};

use crate::{
    ANY_COLOR as A, BLOCKED_CELL as BB, Board, BoardSeed, Color, EMPTY_CELL as E, GameConfig,
    LevelError, TileFactory,
};

/// A named board layout.
///
/// The layout uses the cell codes of [`CellCode`](crate::CellCode), top row
/// first. `drop_queues[x]` optionally presets the colors spawned at the top
/// of column `x`, last color first.
///
/// # Example
///
/// ```
/// use match2_engine::{BoardSeed, GameConfig, Level, PlainTiles};
///
/// let level = Level::builtin_named("tiny").unwrap();
/// let config = level.apply_to(&GameConfig::default());
/// let board = level
///     .build_board(&config, BoardSeed::from_bytes([0; 16]), PlainTiles)
///     .unwrap();
/// assert_eq!(board.tile_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub count_colors: u8,
    pub field: Vec<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop_queues: Vec<Vec<Color>>,
}

impl Level {
    /// Levels shipped with the engine.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        let open = [E; 8];
        let odd = [BB, E, BB, E, BB, E, BB, E];
        let even = [E, BB, E, BB, E, BB, E, BB];
        vec![
            Self {
                name: "diagonal-fallings".to_owned(),
                width: 8,
                height: 8,
                count_colors: 3,
                field: [
                    [A, BB, A, BB, A, BB, A, BB],
                    odd,
                    even,
                    open,
                    odd,
                    even,
                    open,
                    [A; 8],
                ]
                .map(Vec::from)
                .into(),
                drop_queues: Vec::new(),
            },
            Self {
                name: "tiny".to_owned(),
                width: 2,
                height: 2,
                count_colors: 3,
                field: vec![vec![A, A], vec![A, A]],
                drop_queues: Vec::new(),
            },
        ]
    }

    #[must_use]
    pub fn builtin_named(name: &str) -> Option<Self> {
        Self::builtin().into_iter().find(|level| level.name == name)
    }

    /// `base` with the board options of this level.
    ///
    /// The bomb group size is capped at the number of cells so that small
    /// levels stay valid.
    #[must_use]
    pub fn apply_to(&self, base: &GameConfig) -> GameConfig {
        GameConfig {
            width: self.width,
            height: self.height,
            count_colors: self.count_colors,
            group_size_for_bomb: base
                .group_size_for_bomb
                .min(self.width * self.height)
                .max(base.min_group_size),
            ..*base
        }
    }

    /// Builds the initial board of this level.
    ///
    /// The board is not settled: layouts may contain tiles floating above
    /// empty cells.
    pub fn build_board<F>(
        &self,
        config: &GameConfig,
        seed: BoardSeed,
        factory: F,
    ) -> Result<Board<F>, LevelError>
    where
        F: TileFactory,
    {
        config.validate()?;
        let mut board = Board::from_config(config, seed, factory);
        board.initialize_from_grid(&self.field)?;
        for (column, colors) in self.drop_queues.iter().enumerate() {
            board
                .set_drop_queue(column, colors.clone())
                .map_err(LevelError::DropQueue)?;
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, GridError, PlainTiles};

    fn seed() -> BoardSeed {
        BoardSeed::from_bytes([2; 16])
    }

    #[test]
    fn test_builtin_levels_build() {
        for level in Level::builtin() {
            let config = level.apply_to(&GameConfig::default());
            assert_eq!(config.validate(), Ok(()), "{}", level.name);
            let board = level.build_board(&config, seed(), PlainTiles).unwrap();
            assert_eq!(board.width(), level.width);
            assert_eq!(board.height(), level.height);
        }
    }

    #[test]
    fn test_diagonal_fallings_layout() {
        let level = Level::builtin_named("diagonal-fallings").unwrap();
        let config = level.apply_to(&GameConfig::default());
        let board = level.build_board(&config, seed(), PlainTiles).unwrap();

        assert_eq!(board.obstacles().len(), 4 + 4 * 4);
        assert_eq!(board.tile_count(), 4 + 8);
        assert_eq!(board.count_colors(), 3);
    }

    #[test]
    fn test_tiny_level_caps_bomb_group() {
        let level = Level::builtin_named("tiny").unwrap();
        let config = level.apply_to(&GameConfig::default());
        assert_eq!(config.group_size_for_bomb, 4);
        assert_eq!(config.turns_limit, GameConfig::default().turns_limit);
    }

    #[test]
    fn test_unknown_level() {
        assert!(Level::builtin_named("nope").is_none());
    }

    #[test]
    fn test_invalid_layout_is_reported() {
        let mut level = Level::builtin_named("tiny").unwrap();
        level.field.pop();
        let config = level.apply_to(&GameConfig::default());
        assert_eq!(
            level.build_board(&config, seed(), PlainTiles).unwrap_err(),
            LevelError::Grid(GridError::HeightMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let level = Level::builtin_named("tiny").unwrap();
        let config = GameConfig {
            count_colors: 9,
            ..level.apply_to(&GameConfig::default())
        };
        assert!(matches!(
            level.build_board(&config, seed(), PlainTiles),
            Err(LevelError::Config(ConfigError::OutOfRange {
                name: "count_colors",
                ..
            }))
        ));
    }

    #[test]
    fn test_level_json_with_drop_queues() {
        let json = r#"{
            "name": "custom",
            "width": 2,
            "height": 2,
            "count_colors": 2,
            "field": [[0, 0], [1, 2]],
            "drop_queues": [[1, 2], []]
        }"#;
        let level: Level = serde_json::from_str(json).unwrap();
        let config = level.apply_to(&GameConfig::default());
        let mut board = level.build_board(&config, seed(), PlainTiles).unwrap();

        board.step_gravity();
        assert!(board.equals_grid(&[[2, A], [1, 2]]), "\n{board}");
    }
}
