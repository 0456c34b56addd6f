pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{name} must be in {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridError {
    #[display("grid has {actual} rows, board height is {expected}")]
    HeightMismatch { expected: usize, actual: usize },
    #[display("grid row {row} has {actual} cells, board width is {expected}")]
    WidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("color {color} at {position} exceeds the color count {count_colors}")]
    ColorOutOfRange {
        position: Position,
        color: i32,
        count_colors: u8,
    },
    #[display("unknown cell code {code} at {position}")]
    UnknownCode { position: Position, code: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    #[display("drop queue column {column} is outside a board of width {width}")]
    ColumnOutOfRange { column: usize, width: usize },
    #[display("drop color {color} is not in 1..={count_colors}")]
    ColorOutOfRange { color: u8, count_colors: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TapError {
    #[display("session is already over")]
    GameOver,
    #[display("board is still settling from the previous turn")]
    Busy,
    #[display("no tappable tile at {position}")]
    EmptyCell { position: Position },
    #[display("group of {size} tiles is smaller than the minimum of {min}")]
    GroupTooSmall { size: usize, min: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LevelError {
    #[display("invalid level configuration: {_0}")]
    Config(ConfigError),
    #[display("invalid level layout: {_0}")]
    Grid(GridError),
    #[display("invalid level drop queue: {_0}")]
    DropQueue(BoardError),
}
