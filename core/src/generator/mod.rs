use crate::*;
pub use random::*;

mod random;

/// Strategy producing the mine coordinates of a new board.
///
/// Implementations receive an already validated config and must return exactly `config.mines` distinct in-bounds
/// coordinates.
pub trait MineGenerator {
    fn generate(&self, config: GameConfig) -> Vec<Coord2>;
}

impl MineGenerator for &[Coord2] {
    fn generate(&self, _config: GameConfig) -> Vec<Coord2> {
        self.to_vec()
    }
}
