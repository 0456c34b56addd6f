use serde::{Deserialize, Serialize};

/// A board cell coordinate.
///
/// # Coordinate System
///
/// - (0, 0) is the top-left cell
/// - X increases rightward (columns)
/// - Y increases downward (rows)
///
/// Coordinates are signed so that neighbours of edge cells and the
/// [`Position::INVALID`] sentinel can be expressed without wrapping. Whether a
/// position lies on a particular board is decided by the board itself.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Position of a tile that has not been placed yet.
    pub const INVALID: Self = Self::new(-1, -1);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.x == Self::INVALID.x && self.y == Self::INVALID.y
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    #[must_use]
    pub const fn above(self) -> Self {
        self.offset(0, -1)
    }

    #[must_use]
    pub const fn below(self) -> Self {
        self.offset(0, 1)
    }

    /// The cell one row down in the given horizontal direction.
    #[must_use]
    pub const fn diagonal_below(self, direction: Direction) -> Self {
        self.offset(direction.dx(), 1)
    }

    /// The four orthogonal neighbours: right, left, down, up.
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Horizontal direction of a diagonal slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Both directions, in the order ties are resolved when nothing else decides.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    #[must_use]
    pub const fn dx(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Direction of a horizontal displacement, `None` when there is none.
    #[must_use]
    pub const fn from_dx(dx: i32) -> Option<Self> {
        if dx < 0 {
            Some(Self::Left)
        } else if dx > 0 {
            Some(Self::Right)
        } else {
            None
        }
    }
}
