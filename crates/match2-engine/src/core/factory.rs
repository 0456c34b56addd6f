use super::tile::{Color, TileKind};

/// Hook invoked whenever the board creates a tile.
///
/// A presentation layer implements this to attach a renderable handle to
/// every tile; the board stores the handle alongside the tile and hands it
/// back when the tile leaves the board. The simulation itself never depends
/// on the handle type.
pub trait TileFactory {
    type Handle;

    fn create(&mut self, kind: TileKind, color: Option<Color>) -> Self::Handle;
}

/// Factory for headless boards: tiles carry no handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainTiles;

impl TileFactory for PlainTiles {
    type Handle = ();

    fn create(&mut self, _kind: TileKind, _color: Option<Color>) -> Self::Handle {}
}
