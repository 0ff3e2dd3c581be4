use hashbrown::HashSet;

use super::*;

/// Purely random placement driven by a seeded stream.
///
/// Draws `(x, y)` uniformly and rejects repeats until enough distinct positions are collected. The same seed and
/// config always yield the same coordinates in the same order.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMineGenerator {
    seed: Seed,
}

impl RandomMineGenerator {
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&self, config: GameConfig) -> Vec<Coord2> {
        use rand::prelude::*;

        let (width, height) = config.size;
        let mines = usize::from(config.mines);

        let mut rng = SmallRng::seed_from_u64(self.seed.to_u64());
        let mut chosen = HashSet::with_capacity(mines);
        let mut coords = Vec::with_capacity(mines);
        let mut draws = 0_usize;

        while coords.len() < mines {
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..height);
            draws += 1;
            if chosen.insert((x, y)) {
                coords.push((x, y));
            }
        }

        log::trace!(
            "Placed {} mines on {}x{} with seed {} after {} draws",
            mines,
            width,
            height,
            self.seed,
            draws
        );
        coords
    }
}
