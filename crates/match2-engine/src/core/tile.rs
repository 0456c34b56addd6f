use serde::{Deserialize, Serialize};

use super::position::{Direction, Position};

/// The kind of a tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum TileKind {
    /// Colored, matchable tile.
    Simple,
    /// Destroys a diamond-shaped area when triggered.
    Bomb,
    /// Impassable obstacle marking a blocked cell. Never stored in the grid.
    Block,
}

/// Tile color, 1-based.
///
/// Only [`TileKind::Simple`] tiles carry a color.
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
#[serde(try_from = "u8", into = "u8")]
pub struct Color(u8);

impl Color {
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Color {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "color must be positive".to_owned())
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// Board-unique tile identifier, assigned in creation order.
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
pub struct TileId(u64);

impl TileId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A unit occupying at most one board cell.
///
/// `H` is the handle attached by the board's [`TileFactory`](super::TileFactory).
/// Presentation layers use it to link a tile to its renderable; the simulation
/// never looks at it.
///
/// A tile is owned by the grid cell that holds it. Once taken off the board
/// it is handed back to the caller and the grid never refers to it again.
#[derive(Debug, Clone)]
pub struct Tile<H = ()> {
    id: TileId,
    kind: TileKind,
    color: Option<Color>,
    position: Position,
    previous_position: Position,
    on_board: bool,
    dropped: bool,
    handle: H,
}

impl<H> Tile<H> {
    pub(crate) fn new(id: TileId, kind: TileKind, color: Option<Color>, handle: H) -> Self {
        Self {
            id,
            kind,
            color: if kind.is_simple() { color } else { None },
            position: Position::INVALID,
            previous_position: Position::INVALID,
            on_board: false,
            dropped: false,
            handle,
        }
    }

    #[must_use]
    pub fn id(&self) -> TileId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Color of a simple tile, `None` for bombs and blocks.
    #[must_use]
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Returns `true` if this is a simple tile of the given color.
    #[must_use]
    pub fn is_simple_of(&self, color: Color) -> bool {
        self.kind.is_simple() && self.color == Some(color)
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Position before the most recent placement.
    #[must_use]
    pub fn previous_position(&self) -> Position {
        self.previous_position
    }

    #[must_use]
    pub fn is_on_board(&self) -> bool {
        self.on_board
    }

    /// Returns `true` for a tile spawned by the latest gravity step.
    #[must_use]
    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    /// Horizontal direction of the latest move, if it was a diagonal one.
    #[must_use]
    pub fn last_slide(&self) -> Option<Direction> {
        if self.previous_position.is_invalid() {
            return None;
        }
        Direction::from_dx(self.position.x - self.previous_position.x)
    }

    #[must_use]
    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    #[must_use]
    pub fn into_handle(self) -> H {
        self.handle
    }

    pub(crate) fn place(&mut self, position: Position) {
        self.previous_position = self.position;
        self.position = position;
        self.on_board = true;
    }

    pub(crate) fn take_off(&mut self) {
        self.on_board = false;
        self.dropped = false;
    }

    pub(crate) fn set_dropped(&mut self, dropped: bool) {
        self.dropped = dropped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_rejects_zero() {
        assert_eq!(Color::new(0), None);
        assert_eq!(Color::new(3).map(Color::get), Some(3));
    }

    #[test]
    fn test_non_simple_tiles_have_no_color() {
        let bomb = Tile::new(TileId::new(0), TileKind::Bomb, Color::new(2), ());
        assert_eq!(bomb.color(), None);
        assert!(!bomb.is_simple_of(Color::new(2).unwrap()));
    }

    #[test]
    fn test_place_tracks_previous_position() {
        let mut tile = Tile::new(TileId::new(1), TileKind::Simple, Color::new(1), ());
        assert!(!tile.is_on_board());
        assert!(tile.position().is_invalid());

        tile.place(Position::new(2, 0));
        assert!(tile.is_on_board());
        assert_eq!(tile.previous_position(), Position::INVALID);
        assert_eq!(tile.last_slide(), None);

        tile.place(Position::new(3, 1));
        assert_eq!(tile.previous_position(), Position::new(2, 0));
        assert_eq!(tile.last_slide(), Some(Direction::Right));

        tile.place(Position::new(3, 2));
        assert_eq!(tile.last_slide(), None);

        tile.take_off();
        assert!(!tile.is_on_board());
    }

    #[test]
    fn test_color_serde_rejects_zero() {
        assert!(serde_json::from_str::<Color>("0").is_err());
        let color: Color = serde_json::from_str("4").unwrap();
        assert_eq!(color.get(), 4);
    }
}
