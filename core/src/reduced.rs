use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Read-only projection of a board assuming every flag sits on a mine.
///
/// Flagged cells show as [`VisualState::ReducedOpen`] with the flag hidden, and every non-mine cell counts only the
/// mines not yet accounted for by adjacent flags, never going below zero. The source board is never touched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReducedView {
    cells: Array2<Cell>,
}

impl ReducedView {
    pub fn project(board: &Board) -> Self {
        let (width, height) = board.size();
        let mut cells = Array2::from_shape_fn(board.size().to_nd_index(), |(x, y)| {
            board[(x as Coord, y as Coord)]
        });

        for x in 0..width {
            for y in 0..height {
                let coords = (x, y);
                if !board[coords].is_flagged() {
                    continue;
                }
                for &pos in board.neighbor_coords(coords) {
                    if !board[pos].is_mine() {
                        cells[pos.to_nd_index()].decrement_value();
                    }
                }
                cells[coords.to_nd_index()].enter_reduced();
            }
        }

        Self { cells }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn cell(&self, coords: Coord2) -> Result<Cell> {
        let (width, height) = self.size();
        if coords.0 < width && coords.1 < height {
            Ok(self.cells[coords.to_nd_index()])
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((x, y), &cell)| ((x as Coord, y as Coord), cell))
    }
}
