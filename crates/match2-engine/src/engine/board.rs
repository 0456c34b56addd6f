use std::{collections::HashMap, fmt, iter};

use rand::Rng as _;
use tracing::debug;

use crate::{
    BoardError, BoardSeed, CellCode, Color, ColorSource, Direction, GameConfig, GridError,
    PlainTiles, Position, Tile, TileFactory, TileId, TileKind, BLOCKED_CELL, BOMB_TAG,
    EMPTY_CELL,
};

/// The simulated grid of cells and tiles.
///
/// A cell is either empty, blocked, or holds exactly one tile whose stored
/// position equals the cell's coordinates. Tiles are owned by their cell:
/// every method that takes a tile off the board hands it back by value.
///
/// Blocked cells never hold a tile and obstruct vertical falls. The obstacle
/// tiles created for them during [`Board::initialize_from_grid`] are kept
/// aside in [`Board::obstacles`] for presentation layers.
///
/// Queries taking a [`Position`] are tolerant: out-of-bounds input yields an
/// empty, `None` or `false` result instead of an error.
///
/// # Example
///
/// ```
/// use match2_engine::{Board, BoardSeed, Color, Position};
///
/// let mut board = Board::with_seed(3, 3, 4, BoardSeed::from_bytes([0; 16]));
/// board
///     .initialize_from_grid(&[[3, 3, 1], [4, 2, 1], [0, 0, 0]])
///     .unwrap();
///
/// let group = board.find_group(Position::new(0, 0), Color::new(3).unwrap());
/// assert_eq!(group.len(), 2);
///
/// let destroyed = board.destroy(&group);
/// assert_eq!(destroyed.len(), 2);
/// assert!(board.tile_at(Position::new(0, 0)).is_none());
/// ```
pub struct Board<F: TileFactory = PlainTiles> {
    width: usize,
    height: usize,
    cells: Vec<Option<Tile<F::Handle>>>,
    blocked: Vec<bool>,
    obstacles: Vec<Tile<F::Handle>>,
    fall_triggers: HashMap<Position, Direction>,
    colors: ColorSource,
    factory: F,
    next_tile_id: u64,
}

impl Board<PlainTiles> {
    /// Creates an empty headless board with a random seed.
    #[must_use]
    pub fn new(width: usize, height: usize, count_colors: u8) -> Self {
        Self::with_seed(width, height, count_colors, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic colors.
    #[must_use]
    pub fn with_seed(width: usize, height: usize, count_colors: u8, seed: BoardSeed) -> Self {
        Self::with_factory(width, height, count_colors, seed, PlainTiles)
    }
}

impl<F: TileFactory> Board<F> {
    /// Creates an empty board whose tiles are created through `factory`.
    #[must_use]
    pub fn with_factory(
        width: usize,
        height: usize,
        count_colors: u8,
        seed: BoardSeed,
        factory: F,
    ) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            cells: iter::repeat_with(|| None).take(len).collect(),
            blocked: vec![false; len],
            obstacles: Vec::new(),
            fall_triggers: HashMap::new(),
            colors: ColorSource::with_seed(seed, count_colors, width),
            factory,
            next_tile_id: 0,
        }
    }

    /// Creates an empty board sized by a level configuration.
    #[must_use]
    pub fn from_config(config: &GameConfig, seed: BoardSeed, factory: F) -> Self {
        Self::with_factory(
            config.width,
            config.height,
            config.count_colors,
            seed,
            factory,
        )
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn count_colors(&self) -> u8 {
        self.colors.count_colors()
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    #[must_use]
    pub fn colors(&self) -> &ColorSource {
        &self.colors
    }

    /// Replaces the preset colors spawned at the top of `column`.
    ///
    /// The last color of `colors` spawns first.
    pub fn set_drop_queue(&mut self, column: usize, colors: Vec<Color>) -> Result<(), BoardError> {
        self.colors.set_drop_queue(column, colors)
    }

    /// Bounds check only; blocked cells are valid positions.
    #[must_use]
    pub fn is_valid_position(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    #[must_use]
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|index| self.blocked[index])
    }

    #[must_use]
    pub fn tile_at(&self, pos: Position) -> Option<&Tile<F::Handle>> {
        self.cells[self.index(pos)?].as_ref()
    }

    pub fn tile_at_mut(&mut self, pos: Position) -> Option<&mut Tile<F::Handle>> {
        let index = self.index(pos)?;
        self.cells[index].as_mut()
    }

    /// Iterates over the tiles on the board in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile<F::Handle>> + '_ {
        self.cells.iter().flatten()
    }

    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    /// Obstacle tiles created for blocked cells. They never enter the grid.
    #[must_use]
    pub fn obstacles(&self) -> &[Tile<F::Handle>] {
        &self.obstacles
    }

    /// Creates an off-board tile through the factory.
    pub fn create_tile(&mut self, kind: TileKind, color: Option<Color>) -> Tile<F::Handle> {
        let color = color.filter(|_| kind.is_simple());
        let id = TileId::new(self.next_tile_id);
        self.next_tile_id += 1;
        let handle = self.factory.create(kind, color);
        Tile::new(id, kind, color, handle)
    }

    /// Places `tile` at `pos`, or clears the cell when `tile` is `None`.
    ///
    /// Returns whichever tile ends up off the board: the tile previously in
    /// the cell, or `tile` itself when `pos` is out of bounds or blocked.
    /// Use [`Self::move_tile`] to move a tile that is already on the board.
    pub fn set_tile(
        &mut self,
        pos: Position,
        tile: Option<Tile<F::Handle>>,
    ) -> Option<Tile<F::Handle>> {
        let Some(index) = self.index(pos) else {
            return tile;
        };
        match tile {
            None => self.cells[index].take().map(|mut removed| {
                removed.take_off();
                removed
            }),
            Some(tile) if self.blocked[index] || tile.kind().is_block() => Some(tile),
            Some(tile) => self.put(index, tile),
        }
    }

    /// Takes the tile at `pos` off the board.
    pub fn take_tile(&mut self, pos: Position) -> Option<Tile<F::Handle>> {
        self.set_tile(pos, None)
    }

    /// Moves the tile at `from` to the free cell `to`.
    ///
    /// Returns `false` and leaves the board untouched when there is no tile
    /// at `from` or `to` is not a free cell.
    pub fn move_tile(&mut self, from: Position, to: Position) -> bool {
        self.relocate(from, to).is_some()
    }

    /// Removes every tile and blocked cell, keeping preset drop queues.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.blocked.iter_mut().for_each(|blocked| *blocked = false);
        self.obstacles.clear();
        self.fall_triggers.clear();
    }

    /// Populates the board from a layout of cell codes, top row first.
    ///
    /// The whole layout is validated before the board is touched; on error
    /// the board is left unchanged.
    pub fn initialize_from_grid<R>(&mut self, rows: &[R]) -> Result<(), GridError>
    where
        R: AsRef<[i32]>,
    {
        let codes = self.parse_grid(rows)?;
        self.clear();
        for (index, code) in codes.into_iter().enumerate() {
            let tile = match code {
                CellCode::Empty => continue,
                CellCode::Simple(color) => self.create_tile(TileKind::Simple, Some(color)),
                CellCode::AnyColor => {
                    let color = self.colors.random_color();
                    self.create_tile(TileKind::Simple, Some(color))
                }
                CellCode::Bomb => self.create_tile(TileKind::Bomb, None),
                CellCode::Blocked => {
                    self.blocked[index] = true;
                    let mut obstacle = self.create_tile(TileKind::Block, None);
                    obstacle.place(self.position_of(index));
                    obstacle.take_off();
                    self.obstacles.push(obstacle);
                    continue;
                }
            };
            self.put(index, tile);
        }
        debug!(
            width = self.width,
            height = self.height,
            tiles = self.tile_count(),
            blocked = self.obstacles.len(),
            "initialized board from grid"
        );
        Ok(())
    }

    fn parse_grid<R>(&self, rows: &[R]) -> Result<Vec<CellCode>, GridError>
    where
        R: AsRef<[i32]>,
    {
        if rows.len() != self.height {
            return Err(GridError::HeightMismatch {
                expected: self.height,
                actual: rows.len(),
            });
        }
        let mut codes = Vec::with_capacity(self.cells.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != self.width {
                return Err(GridError::WidthMismatch {
                    row: y,
                    expected: self.width,
                    actual: row.len(),
                });
            }
            for (x, &code) in row.iter().enumerate() {
                let position = Position::new(to_coord(x), to_coord(y));
                let cell = CellCode::from_code(code)
                    .ok_or(GridError::UnknownCode { position, code })?;
                if let CellCode::Simple(color) = cell
                    && color.get() > self.count_colors()
                {
                    return Err(GridError::ColorOutOfRange {
                        position,
                        color: code,
                        count_colors: self.count_colors(),
                    });
                }
                codes.push(cell);
            }
        }
        Ok(codes)
    }

    /// Fills every non-blocked cell with a simple tile of random color.
    pub fn random_init(&mut self) {
        for index in 0..self.cells.len() {
            if self.blocked[index] {
                continue;
            }
            let color = self.colors.random_color();
            let tile = self.create_tile(TileKind::Simple, Some(color));
            self.put(index, tile);
        }
        self.fall_triggers.clear();
        debug!(tiles = self.tile_count(), "randomly initialized board");
    }

    /// Compares the board with a layout of cell codes.
    ///
    /// [`ANY_COLOR`](crate::ANY_COLOR) matches any cell, [`EMPTY_CELL`]
    /// requires an empty non-blocked cell, [`BLOCKED_CELL`] a blocked one,
    /// [`BOMB_TAG`] a bomb and a positive code a simple tile of that color.
    #[must_use]
    pub fn equals_grid<R>(&self, rows: &[R]) -> bool
    where
        R: AsRef<[i32]>,
    {
        rows.len() == self.height
            && rows.iter().enumerate().all(|(y, row)| {
                let row = row.as_ref();
                row.len() == self.width
                    && row.iter().enumerate().all(|(x, &code)| {
                        self.cell_matches(Position::new(to_coord(x), to_coord(y)), code)
                    })
            })
    }

    fn cell_matches(&self, pos: Position, code: i32) -> bool {
        let tile = self.tile_at(pos);
        match CellCode::from_code(code) {
            Some(CellCode::AnyColor) => true,
            Some(CellCode::Empty) => tile.is_none() && !self.is_blocked(pos),
            Some(CellCode::Blocked) => self.is_blocked(pos),
            Some(CellCode::Bomb) => tile.is_some_and(|t| t.kind().is_bomb()),
            Some(CellCode::Simple(color)) => tile.is_some_and(|t| t.is_simple_of(color)),
            None => false,
        }
    }

    /// The board as a layout of cell codes, top row first.
    #[must_use]
    pub fn to_grid(&self) -> Vec<Vec<i32>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        let index = y * self.width + x;
                        if self.blocked[index] {
                            return BLOCKED_CELL;
                        }
                        match &self.cells[index] {
                            None => EMPTY_CELL,
                            Some(tile) => match tile.color() {
                                Some(color) => i32::from(color.get()),
                                None => BOMB_TAG,
                            },
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Removes the tiles at `positions` and returns them.
    ///
    /// Positions that are out of bounds, empty or listed twice are skipped,
    /// so the length of the result is the number of tiles actually destroyed.
    pub fn destroy(&mut self, positions: &[Position]) -> Vec<Tile<F::Handle>> {
        let destroyed: Vec<_> = positions
            .iter()
            .filter_map(|&pos| self.take_tile(pos))
            .collect();
        debug!(
            requested = positions.len(),
            destroyed = destroyed.len(),
            "destroyed tiles"
        );
        destroyed
    }

    pub(super) fn index(&self, pos: Position) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn position_of(&self, index: usize) -> Position {
        Position::new(to_coord(index % self.width), to_coord(index / self.width))
    }

    /// In bounds, not blocked and empty.
    pub(super) fn is_free(&self, pos: Position) -> bool {
        self.index(pos)
            .is_some_and(|index| !self.blocked[index] && self.cells[index].is_none())
    }

    pub(super) fn fall_trigger(&self, pos: Position) -> Option<Direction> {
        self.fall_triggers.get(&pos).copied()
    }

    pub(super) fn set_fall_trigger(&mut self, pos: Position, direction: Direction) {
        self.fall_triggers.insert(pos, direction);
    }

    pub(super) fn clear_dropped_flags(&mut self) {
        for tile in self.cells.iter_mut().flatten() {
            tile.set_dropped(false);
        }
    }

    /// Moves a tile to a free cell and returns its id.
    pub(super) fn relocate(&mut self, from: Position, to: Position) -> Option<TileId> {
        let from_index = self.index(from)?;
        if !self.is_free(to) {
            return None;
        }
        let to_index = self.index(to)?;
        let mut tile = self.cells[from_index].take()?;
        tile.place(to);
        let id = tile.id();
        self.cells[to_index] = Some(tile);
        Some(id)
    }

    /// Spawns a freshly dropped simple tile at the top of `column`.
    pub(super) fn spawn_at_top(&mut self, column: usize) -> Option<TileId> {
        let pos = Position::new(to_coord(column), 0);
        if !self.is_free(pos) {
            return None;
        }
        let index = self.index(pos)?;
        let color = self.colors.next_drop_color(column);
        let mut tile = self.create_tile(TileKind::Simple, Some(color));
        tile.set_dropped(true);
        let id = tile.id();
        self.put(index, tile);
        Some(id)
    }

    fn put(&mut self, index: usize, mut tile: Tile<F::Handle>) -> Option<Tile<F::Handle>> {
        tile.place(self.position_of(index));
        self.cells[index].replace(tile).map(|mut displaced| {
            displaced.take_off();
            displaced
        })
    }
}

fn to_coord(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl<F: TileFactory> fmt::Debug for Board<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("count_colors", &self.count_colors())
            .field("tiles", &self.tile_count())
            .finish_non_exhaustive()
    }
}

/// Renders one character per cell: color digits, `*` for bombs, `#` for
/// blocked cells and `.` for empty ones.
impl<F: TileFactory> fmt::Display for Board<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.width {
                let index = y * self.width + x;
                let ch = if self.blocked[index] {
                    '#'
                } else {
                    match &self.cells[index] {
                        None => '.',
                        Some(tile) => match tile.color() {
                            Some(color) => char::from_digit(u32::from(color.get()), 36)
                                .unwrap_or('?'),
                            None => '*',
                        },
                    }
                };
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ANY_COLOR;

    const E: i32 = EMPTY_CELL;
    const A: i32 = ANY_COLOR;
    const BB: i32 = BLOCKED_CELL;
    const BM: i32 = BOMB_TAG;

    fn board(width: usize, height: usize, count_colors: u8) -> Board {
        Board::with_seed(width, height, count_colors, BoardSeed::from_bytes([3; 16]))
    }

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    /// Every on-board tile is stored at the cell that references it.
    fn assert_consistent<F: TileFactory>(board: &Board<F>) {
        let mut seen = std::collections::HashSet::new();
        for y in 0..board.height() {
            for x in 0..board.width() {
                let p = pos(to_coord(x), to_coord(y));
                if let Some(tile) = board.tile_at(p) {
                    assert_eq!(tile.position(), p);
                    assert!(tile.is_on_board());
                    assert!(!board.is_blocked(p), "tile in blocked cell {p}");
                    assert!(seen.insert(tile.id()), "tile {} referenced twice", tile.id());
                }
            }
        }
    }

    #[test]
    fn test_initialize_from_grid() {
        let mut board = board(3, 3, 4);
        board
            .initialize_from_grid(&[[3, 3, 1], [4, 2, 1], [E, E, E]])
            .unwrap();

        assert!(board.equals_grid(&[[3, 3, 1], [4, 2, 1], [E, E, E]]));
        assert_eq!(board.tile_count(), 6);
        assert_eq!(
            board.tile_at(pos(0, 1)).and_then(Tile::color),
            Color::new(4),
            "rows are vertical, columns horizontal"
        );
        assert_consistent(&board);
    }

    #[test]
    fn test_initialize_special_codes() {
        let mut board = board(3, 2, 3);
        board
            .initialize_from_grid(&[[A, BB, BM], [1, E, BB]])
            .unwrap();

        assert!(board.tile_at(pos(0, 0)).is_some_and(|t| t.kind().is_simple()));
        assert!(board.is_blocked(pos(1, 0)));
        assert!(board.tile_at(pos(1, 0)).is_none());
        assert!(board.tile_at(pos(2, 0)).is_some_and(|t| t.kind().is_bomb()));
        assert_eq!(board.obstacles().len(), 2);
        assert!(board.obstacles().iter().all(|t| !t.is_on_board()));
        assert_eq!(board.obstacles()[0].position(), pos(1, 0));
        assert_eq!(board.to_grid()[0][1..], [BB, BM]);
        assert_consistent(&board);
    }

    #[test]
    fn test_initialize_errors_leave_board_untouched() {
        let mut board = board(2, 2, 3);
        board.initialize_from_grid(&[[1, 2], [3, 1]]).unwrap();

        assert_eq!(
            board.initialize_from_grid(&[[1, 2]]),
            Err(GridError::HeightMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            board.initialize_from_grid(&[vec![1, 2], vec![3]]),
            Err(GridError::WidthMismatch {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            board.initialize_from_grid(&[[1, 2], [4, 1]]),
            Err(GridError::ColorOutOfRange {
                position: pos(0, 1),
                color: 4,
                count_colors: 3
            })
        );
        assert_eq!(
            board.initialize_from_grid(&[[1, -9], [1, 1]]),
            Err(GridError::UnknownCode {
                position: pos(1, 0),
                code: -9
            })
        );
        assert!(board.equals_grid(&[[1, 2], [3, 1]]));
    }

    #[test]
    fn test_equals_grid_wildcards() {
        let mut board = board(2, 2, 3);
        board.initialize_from_grid(&[[1, E], [BB, 2]]).unwrap();

        assert!(board.equals_grid(&[[A, E], [BB, A]]));
        assert!(board.equals_grid(&[[A, A], [A, A]]));
        assert!(!board.equals_grid(&[[A, 1], [BB, A]]), "empty cell holds no color");
        assert!(!board.equals_grid(&[[A, A], [E, A]]), "blocked cell is not empty");
        assert!(!board.equals_grid(&[[A, A]]), "height mismatch");
    }

    #[test]
    fn test_set_tile_and_overwrite() {
        let mut board = board(2, 2, 3);
        let first = board.create_tile(TileKind::Simple, Color::new(1));
        let first_id = first.id();
        assert!(board.set_tile(pos(1, 1), Some(first)).is_none());
        assert_eq!(board.tile_at(pos(1, 1)).map(Tile::id), Some(first_id));

        let second = board.create_tile(TileKind::Simple, Color::new(2));
        let displaced = board.set_tile(pos(1, 1), Some(second)).unwrap();
        assert_eq!(displaced.id(), first_id);
        assert!(!displaced.is_on_board());

        let removed = board.set_tile(pos(1, 1), None).unwrap();
        assert!(!removed.is_on_board());
        assert!(board.tile_at(pos(1, 1)).is_none());
        assert_consistent(&board);
    }

    #[test]
    fn test_set_tile_rejects_invalid_and_blocked_cells() {
        let mut board = board(2, 2, 3);
        board.initialize_from_grid(&[[E, BB], [E, E]]).unwrap();

        let tile = board.create_tile(TileKind::Simple, Color::new(1));
        let rejected = board.set_tile(pos(5, 0), Some(tile)).unwrap();
        let rejected = board.set_tile(pos(1, 0), Some(rejected)).unwrap();
        assert!(!rejected.is_on_board());
        assert_eq!(board.tile_count(), 0);
    }

    #[test]
    fn test_move_tile() {
        let mut board = board(2, 2, 3);
        board.initialize_from_grid(&[[1, 2], [E, E]]).unwrap();

        assert!(board.move_tile(pos(0, 0), pos(0, 1)));
        assert!(!board.move_tile(pos(1, 0), pos(0, 1)), "destination occupied");
        assert!(!board.move_tile(pos(0, 0), pos(1, 1)), "no tile at source");
        let moved = board.tile_at(pos(0, 1)).unwrap();
        assert_eq!(moved.previous_position(), pos(0, 0));
        assert_consistent(&board);
    }

    #[test]
    fn test_tolerant_queries() {
        let board = board(3, 3, 3);
        for p in [pos(-1, 0), pos(0, -1), pos(3, 0), pos(0, 3), Position::INVALID] {
            assert!(!board.is_valid_position(p));
            assert!(!board.is_blocked(p));
            assert!(board.tile_at(p).is_none());
        }
        assert!(board.is_valid_position(pos(2, 2)));
    }

    #[test]
    fn test_destroy_counts_only_present_tiles() {
        let mut board = board(3, 3, 4);
        board
            .initialize_from_grid(&[[3, 3, 1], [4, 2, 1], [E, E, E]])
            .unwrap();

        let destroyed = board.destroy(&[pos(0, 0), pos(0, 0), pos(0, 2), pos(9, 9), pos(1, 0)]);
        assert_eq!(destroyed.len(), 2);
        assert!(destroyed.iter().all(|t| !t.is_on_board()));
        assert!(board.equals_grid(&[[E, E, 1], [4, 2, 1], [E, E, E]]));
    }

    #[test]
    fn test_random_init_fills_open_cells() {
        let mut board = board(4, 3, 2);
        board
            .initialize_from_grid(&[[E, BB, E, E], [E, E, E, E], [BB, E, E, E]])
            .unwrap();
        board.random_init();

        assert_eq!(board.tile_count(), 10);
        assert!(board.tiles().all(|t| {
            t.color()
                .is_some_and(|c| (1..=2).contains(&c.get()))
        }));
        assert_consistent(&board);
    }

    #[test]
    fn test_display() {
        let mut board = board(3, 2, 3);
        board.initialize_from_grid(&[[1, BB, BM], [E, 3, 2]]).unwrap();
        assert_eq!(board.to_string(), "1#*\n.32");
    }

    #[test]
    fn test_factory_receives_every_created_tile() {
        #[derive(Default)]
        struct Counting(Vec<TileKind>);

        impl TileFactory for Counting {
            type Handle = usize;

            fn create(&mut self, kind: TileKind, _color: Option<Color>) -> usize {
                self.0.push(kind);
                self.0.len()
            }
        }

        let mut board =
            Board::with_factory(2, 2, 3, BoardSeed::from_bytes([0; 16]), Counting::default());
        board.initialize_from_grid(&[[1, BB], [BM, E]]).unwrap();

        assert_eq!(
            board.factory().0,
            [TileKind::Simple, TileKind::Block, TileKind::Bomb]
        );
        assert_eq!(board.tile_at(pos(0, 1)).map(|t| *t.handle()), Some(3));
    }
}
