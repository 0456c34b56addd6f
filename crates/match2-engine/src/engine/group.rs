use std::collections::VecDeque;

use crate::{Color, Position, TileFactory};

use super::board::Board;

impl<F: TileFactory> Board<F> {
    /// Finds the connected group of simple tiles of `color` containing
    /// `origin`.
    ///
    /// Breadth-first search over the four orthogonal neighbours. The result
    /// starts with `origin` and is empty when `origin` is out of bounds or does
    /// not hold a simple tile of `color`.
    #[must_use]
    pub fn find_group(&self, origin: Position, color: Color) -> Vec<Position> {
        let matches = |pos: Position| self.tile_at(pos).is_some_and(|t| t.is_simple_of(color));
        if !matches(origin) {
            return Vec::new();
        }

        let mut visited = vec![false; self.width() * self.height()];
        let mut frontier = VecDeque::from([origin]);
        let mut group = Vec::new();
        if let Some(index) = self.index(origin) {
            visited[index] = true;
        }
        while let Some(pos) = frontier.pop_front() {
            group.push(pos);
            for neighbor in pos.neighbors() {
                let Some(index) = self.index(neighbor) else {
                    continue;
                };
                if visited[index] || !matches(neighbor) {
                    continue;
                }
                visited[index] = true;
                frontier.push_back(neighbor);
            }
        }
        group
    }

    /// Group of the simple tile at `pos`, using its own color.
    ///
    /// Empty for bombs, empty cells and out-of-bounds positions.
    #[must_use]
    pub fn group_at(&self, pos: Position) -> Vec<Position> {
        self.tile_at(pos)
            .and_then(crate::Tile::color)
            .map(|color| self.find_group(pos, color))
            .unwrap_or_default()
    }
}
