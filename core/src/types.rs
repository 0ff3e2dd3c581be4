use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Relative offsets of the 8 surrounding cells, column by column.
const DISPLACEMENTS: [(i16, i16); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (i16, i16), bounds: Coord2) -> Option<Coord2> {
    let (x, y) = coords;
    let (dx, dy) = delta;
    let (max_x, max_y) = bounds;

    let next_x = x.checked_add_signed(dx.try_into().ok()?)?;
    if next_x >= max_x {
        return None;
    }

    let next_y = y.checked_add_signed(dy.try_into().ok()?)?;
    if next_y >= max_y {
        return None;
    }

    Some((next_x, next_y))
}

pub type Neighbors = SmallVec<[Coord2; 8]>;

/// Precomputed adjacency for every cell of a board, keyed by linear index.
///
/// Built once per board; lookups never recompute edge clipping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeighborTable {
    size: Coord2,
    entries: Vec<Neighbors>,
}

impl NeighborTable {
    pub fn new(size: Coord2) -> Self {
        let (width, height) = size;
        let mut entries = Vec::with_capacity(usize::from(mult(width, height)));
        for x in 0..width {
            for y in 0..height {
                entries.push(
                    DISPLACEMENTS
                        .iter()
                        .filter_map(|&delta| apply_delta((x, y), delta, size))
                        .collect(),
                );
            }
        }
        Self { size, entries }
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    /// Linear index matching the standard layout of a `(width, height)` array.
    pub fn linear_index(&self, (x, y): Coord2) -> usize {
        usize::from(x) * usize::from(self.size.1) + usize::from(y)
    }

    pub fn neighbors(&self, coords: Coord2) -> &[Coord2] {
        &self.entries[self.linear_index(coords)]
    }
}
