use super::tile::Color;

/// Grid code of an empty cell.
pub const EMPTY_CELL: i32 = 0;
/// Grid code of a cell filled with a random color.
pub const ANY_COLOR: i32 = -1;
/// Grid code of a blocked cell.
pub const BLOCKED_CELL: i32 = -2;
/// Grid code of a bomb.
pub const BOMB_TAG: i32 = -3;

/// Parsed form of an integer cell code used by board layouts.
///
/// Layouts are written row by row, top row first. A positive code is a simple
/// tile of that color.
///
/// # Example
///
/// ```
/// use match2_engine::{BLOCKED_CELL, CellCode, Color};
///
/// assert_eq!(CellCode::from_code(BLOCKED_CELL), Some(CellCode::Blocked));
/// assert_eq!(CellCode::from_code(3), Some(CellCode::Simple(Color::new(3).unwrap())));
/// assert_eq!(CellCode::from_code(-7), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCode {
    Empty,
    Simple(Color),
    AnyColor,
    Blocked,
    Bomb,
}

impl CellCode {
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            EMPTY_CELL => Some(Self::Empty),
            ANY_COLOR => Some(Self::AnyColor),
            BLOCKED_CELL => Some(Self::Blocked),
            BOMB_TAG => Some(Self::Bomb),
            _ => u8::try_from(code).ok().and_then(Color::new).map(Self::Simple),
        }
    }

    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Empty => EMPTY_CELL,
            Self::Simple(color) => i32::from(color.get()),
            Self::AnyColor => ANY_COLOR,
            Self::Blocked => BLOCKED_CELL,
            Self::Bomb => BOMB_TAG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_roundtrip() {
        for code in [EMPTY_CELL, ANY_COLOR, BLOCKED_CELL, BOMB_TAG, 1, 6] {
            let parsed = CellCode::from_code(code).unwrap();
            assert_eq!(parsed.code(), code);
        }
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(CellCode::from_code(-4), None);
        assert_eq!(CellCode::from_code(256), None);
    }
}
