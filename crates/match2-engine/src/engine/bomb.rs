use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::{Position, Tile, TileFactory};

use super::board::Board;

/// Cells a bomb chain will destroy, computed without touching the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlastPlan {
    /// Bombs in the order they go off, the triggered one first.
    pub detonations: Vec<Position>,
    /// Every occupied cell caught by the chain, each listed once.
    pub area: Vec<Position>,
}

/// Tiles destroyed by a bomb chain.
#[derive(Debug)]
pub struct Explosion<H> {
    /// Bombs in the order they went off, the triggered one first.
    pub detonations: Vec<Position>,
    /// Destroyed tiles, bombs included.
    pub destroyed: Vec<Tile<H>>,
}

impl<H> Default for Explosion<H> {
    fn default() -> Self {
        Self {
            detonations: Vec::new(),
            destroyed: Vec::new(),
        }
    }
}

impl<F: TileFactory> Board<F> {
    /// Occupied cells within Manhattan distance `radius` of `center`, in
    /// row-major order.
    ///
    /// The diamond is clipped to the board; empty and blocked cells are left
    /// out. An occupied `center` is part of its own blast area.
    #[must_use]
    pub fn blast_area(&self, center: Position, radius: u32) -> Vec<Position> {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let mut area = Vec::new();
        for y in center.y.saturating_sub(r)..=center.y.saturating_add(r) {
            for x in center.x.saturating_sub(r)..=center.x.saturating_add(r) {
                let pos = Position::new(x, y);
                if center.manhattan_distance(pos) <= radius && self.tile_at(pos).is_some() {
                    area.push(pos);
                }
            }
        }
        area
    }

    /// Resolves the chain started by the bomb at `center` without destroying
    /// anything.
    ///
    /// Every bomb caught in a blast goes off in turn. A cell caught by several
    /// blasts is listed once. The plan is empty when `center` holds no bomb.
    #[must_use]
    pub fn plan_blast(&self, center: Position, radius: u32) -> BlastPlan {
        let mut plan = BlastPlan::default();
        if !self.tile_at(center).is_some_and(|t| t.kind().is_bomb()) {
            return plan;
        }

        let mut caught = HashSet::from([center]);
        let mut pending = VecDeque::from([center]);
        plan.area.push(center);
        while let Some(bomb) = pending.pop_front() {
            plan.detonations.push(bomb);
            for pos in self.blast_area(bomb, radius) {
                if !caught.insert(pos) {
                    continue;
                }
                plan.area.push(pos);
                if self.tile_at(pos).is_some_and(|t| t.kind().is_bomb()) {
                    pending.push_back(pos);
                }
            }
        }
        plan
    }

    /// Detonates the bomb at `center`, chaining into every bomb caught in a
    /// blast, and returns the destroyed tiles.
    ///
    /// Each tile is destroyed exactly once however many blasts reach it.
    /// Nothing happens when `center` holds no bomb.
    pub fn trigger_bomb(&mut self, center: Position, radius: u32) -> Explosion<F::Handle> {
        let BlastPlan { detonations, area } = self.plan_blast(center, radius);
        if detonations.is_empty() {
            return Explosion::default();
        }
        let destroyed = self.destroy(&area);
        debug!(
            %center,
            chain = detonations.len(),
            destroyed = destroyed.len(),
            "bomb exploded"
        );
        Explosion {
            detonations,
            destroyed,
        }
    }
}
