use core::fmt;
use core::ops::Index;

use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangular grid of cells with mines already placed.
///
/// Cells live in one flat array addressed by `(x, y)`; adjacency comes from a table computed at construction, so
/// cells never reference each other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    neighbors: NeighborTable,
    mine_count: CellCount,
}

impl Board {
    /// Builds a board for `config`, placing mines from `generator`.
    pub fn new(config: GameConfig, generator: impl MineGenerator) -> Result<Self> {
        let config = config.validate()?;
        let mine_coords = generator.generate(config);
        let mut board = Self::empty(config.size);
        board.place_mines(&mine_coords)?;
        if board.mine_count != config.mines {
            log::debug!(
                "Generator placed {} mines, config asked for {}",
                board.mine_count,
                config.mines
            );
            return Err(GameError::InvalidLayout);
        }
        log::debug!(
            "New {}x{} board with {} mines",
            config.size.0,
            config.size.1,
            board.mine_count
        );
        Ok(board)
    }

    /// Builds a board with mines at exactly `mine_coords`, repeated coordinates count once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidSize);
        }

        let mut seen = HashSet::with_capacity(mine_coords.len());
        let mut unique = Vec::with_capacity(mine_coords.len());
        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            if seen.insert(coords) {
                unique.push(coords);
            }
        }

        let mines = CellCount::try_from(unique.len()).map_err(|_| GameError::TooManyMines)?;
        GameConfig::new(size, mines)?;

        let mut board = Self::empty(size);
        board.place_mines(&unique)?;
        Ok(board)
    }

    /// Parses a layout where every line is a row, `*` is a mine and `.` or `o` is a safe cell.
    pub fn from_layout_str(layout: &str) -> Result<Self> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let width = rows.first().map_or(0, |row| row.chars().count());
        let width = Coord::try_from(width).map_err(|_| GameError::InvalidSize)?;
        let height = Coord::try_from(rows.len()).map_err(|_| GameError::InvalidSize)?;

        let mut mine_coords = Vec::new();
        for (y, row) in (0..height).zip(&rows) {
            if row.chars().count() != usize::from(width) {
                return Err(GameError::InvalidLayout);
            }
            for (x, symbol) in (0..width).zip(row.chars()) {
                match symbol {
                    '*' => mine_coords.push((x, y)),
                    '.' | 'o' => {}
                    _ => return Err(GameError::InvalidLayout),
                }
            }
        }

        Self::from_mine_coords((width, height), &mine_coords)
    }

    fn empty(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
            neighbors: NeighborTable::new(size),
            mine_count: 0,
        }
    }

    /// Marks every coordinate as a mine, then bumps the count of each non-mine neighbor.
    fn place_mines(&mut self, mine_coords: &[Coord2]) -> Result<()> {
        for &coords in mine_coords {
            let coords = self.validate_coords(coords)?;
            self.cells[coords.to_nd_index()].set_mine();
        }

        let placed: Vec<Coord2> = self.mine_cells().map(|(coords, _)| coords).collect();
        for &coords in &placed {
            for &pos in self.neighbors.neighbors(coords) {
                self.cells[pos.to_nd_index()].increment_value();
            }
        }

        self.mine_count = placed
            .len()
            .try_into()
            .map_err(|_| GameError::TooManyMines)?;
        Ok(())
    }

    pub fn config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        self.neighbors.size()
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.width(), self.height())
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()])
    }

    /// In-bounds neighbors of `coords`, up to 8.
    pub fn neighbors(&self, coords: Coord2) -> Result<&[Coord2]> {
        let coords = self.validate_coords(coords)?;
        Ok(self.neighbors.neighbors(coords))
    }

    /// Every cell with its coordinates, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((x, y), &cell)| ((x as Coord, y as Coord), cell))
    }

    pub fn unopened_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.iter().filter(|(_, cell)| !cell.is_open())
    }

    pub fn mine_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.iter().filter(|(_, cell)| cell.is_mine())
    }

    pub fn unopened_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| !cell.is_open())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }

    pub(crate) fn neighbor_coords(&self, coords: Coord2) -> &[Coord2] {
        self.neighbors.neighbors(coords)
    }

    pub(crate) fn count_neighbors(&self, coords: Coord2, predicate: impl Fn(Cell) -> bool) -> usize {
        self.neighbor_coords(coords)
            .iter()
            .filter(|&&pos| predicate(self[pos]))
            .count()
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

/// Debug dump, one line per row.
///
/// | Cell             | Char       |
/// | ---------------- | ---------- |
/// | closed           | `.`        |
/// | closed, flagged  | `F`        |
/// | closed, guessed  | `?`        |
/// | open             | `0` to `8` |
/// | open mine        | `*`        |
/// | exploded mine    | `X`        |
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.size();
        for y in 0..height {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..width {
                let cell = self[(x, y)];
                let symbol = match (cell.visual_state(), cell.marker_state()) {
                    _ if cell.is_exploded() => 'X',
                    (VisualState::Open, _) if cell.is_mine() => '*',
                    (VisualState::Open, _) => char::from(b'0' + cell.value() as u8),
                    (_, MarkerState::Flagged) => 'F',
                    (_, MarkerState::Guessed) => '?',
                    _ => '.',
                };
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}
