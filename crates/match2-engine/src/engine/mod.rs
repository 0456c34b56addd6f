//! Board simulation and game rules.
//!
//! This module builds the game on top of the data types in [`crate::core`]:
//!
//! - [`Board`] - Grid of tiles and blocked cells, with placement and queries
//! - [`Board::step_gravity`] - One discrete fall/slide/spawn step ([`GravityStep`])
//! - [`Board::find_group`] - Connected same-color group search
//! - [`Board::trigger_bomb`] - Bomb blast and chain resolution ([`Explosion`])
//! - [`points_for_destroyed_group`] - Turn scoring, with [`TurnResult`] and [`GameStats`]
//! - [`ColorSource`] - Seeded colors and per-column preset queues ([`BoardSeed`])
//! - [`GameConfig`] - Range-validated level options
//! - [`Level`] - Named board layouts
//! - [`GameSession`] - A level played turn by turn
//!
//! # Turn Flow
//!
//! 1. Initialize the board from a [`Level`] layout or randomly
//! 2. The player taps a cell: its group is destroyed, or the tapped bomb
//!    explodes
//! 3. A large enough group leaves a bomb behind
//! 4. Gravity steps run until one reports no activity
//! 5. The turn is scored; the level ends when the goal is reached or the
//!    turns run out
//!
//! [`GameSession`] implements this flow. The [`Board`] methods can be driven
//! directly by callers that animate every step themselves.
//!
//! # Example
//!
//! ```
//! use match2_engine::{Board, BoardSeed, Color, Position, points_for_destroyed_group};
//!
//! let mut board = Board::with_seed(3, 3, 4, BoardSeed::from_bytes([0; 16]));
//! board
//!     .initialize_from_grid(&[[3, 3, 1], [4, 2, 1], [4, 2, 3]])
//!     .unwrap();
//!
//! let group = board.find_group(Position::new(1, 1), Color::new(2).unwrap());
//! let destroyed = board.destroy(&group);
//! let points = points_for_destroyed_group(destroyed.len(), false);
//! assert_eq!(points, 100);
//!
//! while board.step_gravity().is_active() {}
//! assert_eq!(board.tile_count(), 9);
//! ```

pub use self::{
    board::*, bomb::*, color_source::*, config::*, gravity::*, level::*, scoring::*, session::*,
};

mod board;
mod bomb;
mod color_source;
mod config;
mod gravity;
mod group;
mod level;
mod scoring;
mod session;
