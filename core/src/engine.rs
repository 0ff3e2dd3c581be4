use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - New -> InProgress
/// - New -> Win
/// - New -> Lose
/// - InProgress -> Win
/// - InProgress -> Lose
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Nothing revealed yet
    #[default]
    New,
    /// At least one cell revealed
    InProgress,
    /// Every safe cell revealed
    Win,
    /// A mine was revealed
    Lose,
}

impl GameState {
    pub const fn is_new(self) -> bool {
        matches!(self, Self::New)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

/// One session over one board, from first click to win or loss.
///
/// Moves against a finished game, or moves that cannot apply to their target, are absorbed as
/// [`OpenOutcome::NoChange`]/[`FlagOutcome::NoChange`]. Only out-of-range coordinates are errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    seed: Option<Seed>,
    state: GameState,
    mine_count: CellCount,
    flag_count: CellCount,
    exploded_at: Option<Coord2>,
    #[serde(skip)]
    open_queue: VecDeque<Coord2>,
    /// Cached reduced projection, `None` while dirty
    #[serde(skip)]
    reduced: Option<ReducedView>,
}

impl Game {
    /// Starts a session on a freshly generated board, a missing seed draws a random one.
    pub fn new(config: GameConfig, seed: Option<Seed>) -> Result<Self> {
        let seed = seed.unwrap_or_else(Seed::fresh);
        let board = Board::new(config, RandomMineGenerator::new(seed.clone()))?;
        log::debug!("New game with seed {}", seed);
        Ok(Self::with_seed(board, Some(seed)))
    }

    /// Starts a session on an existing board, e.g. one built from a fixed layout.
    pub fn from_board(board: Board) -> Self {
        Self::with_seed(board, None)
    }

    fn with_seed(board: Board, seed: Option<Seed>) -> Self {
        let mine_count = board.mine_count();
        Self {
            board,
            seed,
            state: Default::default(),
            mine_count,
            flag_count: 0,
            exploded_at: None,
            open_queue: VecDeque::new(),
            reduced: None,
        }
    }

    /// Replaces board and counters wholesale, leaves the current game untouched on error.
    pub fn start_new_game(&mut self, config: GameConfig, seed: Option<Seed>) -> Result<()> {
        *self = Self::new(config, seed)?;
        Ok(())
    }

    /// Independent deep copy of the whole session.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_final()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seed the board was generated from, `None` for boards supplied directly.
    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn width(&self) -> Coord {
        self.board.width()
    }

    pub fn height(&self) -> Coord {
        self.board.height()
    }

    pub fn mines(&self) -> CellCount {
        self.mine_count
    }

    pub fn flags(&self) -> CellCount {
        self.flag_count
    }

    /// How many mines have not been flagged yet, negative when over-flagged
    pub fn mines_left(&self) -> isize {
        (self.mine_count as isize) - (self.flag_count as isize)
    }

    pub fn cell(&self, coords: Coord2) -> Result<Cell> {
        self.board.cell(coords)
    }

    /// The mine whose reveal lost the game.
    pub fn exploded_cell(&self) -> Option<Coord2> {
        self.exploded_at
    }

    /// Last refreshed reduced view, `None` if never refreshed or dirtied by a move since.
    pub fn reduced_view(&self) -> Option<&ReducedView> {
        self.reduced.as_ref()
    }

    /// Recomputes the reduced view if it is dirty.
    pub fn refresh_reduced_view(&mut self) -> &ReducedView {
        self.reduced
            .get_or_insert_with(|| ReducedView::project(&self.board))
    }

    pub fn unopened_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.board.unopened_cells()
    }

    pub fn mine_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.board.mine_cells()
    }

    /// Open a closed cell with flood-fill, or chord an already open one
    pub fn open_cell(&mut self, coords: Coord2) -> Result<OpenOutcome> {
        let coords = self.board.validate_coords(coords)?;

        if self.state.is_final() {
            return Ok(OpenOutcome::NoChange);
        }

        if self.board[coords].is_open() {
            return Ok(self.maybe_chord_cell(coords));
        }

        self.open_queue.push_back(coords);
        Ok(self.process_open_queue())
    }

    /// Cycle the marker of a closed cell, or flag-chord an already open one
    pub fn flag_cell(&mut self, coords: Coord2, use_guessing: bool) -> Result<FlagOutcome> {
        let coords = self.board.validate_coords(coords)?;

        if self.state.is_final() {
            return Ok(FlagOutcome::NoChange);
        }

        if self.board[coords].is_open() {
            return Ok(self.maybe_flag_chord_cell(coords));
        }

        let cell = self.board.cell_mut(coords);
        let was_flagged = cell.is_flagged();
        let is_flagged = cell.toggle_flag(use_guessing);
        match (was_flagged, is_flagged) {
            (false, true) => self.flag_count += 1,
            (true, false) => self.flag_count -= 1,
            _ => {}
        }
        self.reduced = None;
        log::trace!("Marker at {:?} is now {:?}", coords, cell.marker_state());
        Ok(FlagOutcome::MarkChanged)
    }

    /// Opens every closed, unflagged neighbor when the flagged neighbors account for all adjacent mines.
    fn maybe_chord_cell(&mut self, coords: Coord2) -> OpenOutcome {
        let Some(count) = self.board[coords].adjacent_mines() else {
            return OpenOutcome::NoChange;
        };

        let flagged = self.board.count_neighbors(coords, Cell::is_flagged);
        if flagged != usize::from(count) {
            log::trace!(
                "No chord at {:?}, {} flags around a {}",
                coords,
                flagged,
                count
            );
            return OpenOutcome::NoChange;
        }

        for &pos in self.board.neighbor_coords(coords) {
            let neighbor = self.board[pos];
            if !neighbor.is_open() && !neighbor.is_flagged() {
                self.open_queue.push_back(pos);
            }
        }
        log::trace!("Chording {:?}, queued {:?}", coords, self.open_queue);
        self.process_open_queue()
    }

    /// Flags every closed neighbor when the closed neighbors account for all adjacent mines.
    fn maybe_flag_chord_cell(&mut self, coords: Coord2) -> FlagOutcome {
        let Some(count) = self.board[coords].adjacent_mines() else {
            return FlagOutcome::NoChange;
        };

        let closed = self.board.count_neighbors(coords, |cell| !cell.is_open());
        if closed != usize::from(count) {
            return FlagOutcome::NoChange;
        }

        let targets: Neighbors = self
            .board
            .neighbor_coords(coords)
            .iter()
            .copied()
            .filter(|&pos| !self.board[pos].is_open() && !self.board[pos].is_flagged())
            .collect();
        if targets.is_empty() {
            return FlagOutcome::NoChange;
        }

        for &pos in &targets {
            self.board.cell_mut(pos).flag();
            self.flag_count += 1;
        }
        self.reduced = None;
        log::trace!("Flag-chording {:?}, flagged {:?}", coords, targets);
        FlagOutcome::MarkChanged
    }

    /// Drains the queue first-in first-out, expanding through zero cells and stopping at the first mine.
    fn process_open_queue(&mut self) -> OpenOutcome {
        let mut opened: CellCount = 0;

        while let Some(coords) = self.open_queue.pop_front() {
            let cell = self.board.cell_mut(coords);
            if cell.is_open() {
                continue;
            }
            if !cell.maybe_open() {
                log::trace!("Skipping marked cell at {:?}", coords);
                continue;
            }
            self.reduced = None;

            if cell.is_mine() {
                cell.explode();
                self.open_queue.clear();
                self.lose(coords);
                return OpenOutcome::Explode;
            }

            opened += 1;
            log::trace!("Opened cell at {:?}, value: {}", coords, cell.value());

            if cell.value() == 0 {
                self.open_queue
                    .extend(self.board.neighbor_coords(coords).iter().copied());
            }
        }

        if opened == 0 {
            return OpenOutcome::NoChange;
        }

        if self.board.unopened_count() == self.mine_count {
            self.win();
            OpenOutcome::Win
        } else {
            self.mark_started();
            OpenOutcome::Safe
        }
    }

    fn mark_started(&mut self) {
        if self.state.is_new() {
            log::debug!("Game started");
            self.state = GameState::InProgress;
        }
    }

    fn win(&mut self) {
        log::debug!("Game won with {} flags placed", self.flag_count);
        self.state = GameState::Win;
    }

    /// Ends the game and forces every mine open, flags are left as placed.
    fn lose(&mut self, exploded_at: Coord2) {
        log::debug!("Game lost, mine hit at {:?}", exploded_at);
        self.state = GameState::Lose;
        self.exploded_at = Some(exploded_at);

        let mines: Vec<Coord2> = self.board.mine_cells().map(|(coords, _)| coords).collect();
        for coords in mines {
            self.board.cell_mut(coords).open();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(size: Coord2, mines: &[Coord2]) -> Game {
        Game::from_board(Board::from_mine_coords(size, mines).unwrap())
    }

    fn open_coords(game: &Game) -> Vec<Coord2> {
        game.board()
            .iter()
            .filter(|(_, cell)| cell.is_open())
            .map(|(coords, _)| coords)
            .collect()
    }

    #[test]
    fn open_mine_loses_and_reveals_all_mines() {
        let mut game = game((3, 3), &[(0, 0), (2, 2)]);

        assert_eq!(game.open_cell((0, 0)).unwrap(), OpenOutcome::Explode);
        assert_eq!(game.state(), GameState::Lose);
        assert_eq!(game.exploded_cell(), Some((0, 0)));

        let exploded = game.cell((0, 0)).unwrap();
        assert!(exploded.is_exploded());
        assert!(exploded.is_open());
        assert_eq!(exploded.marker_state(), MarkerState::Mine);

        let other = game.cell((2, 2)).unwrap();
        assert!(other.is_open());
        assert!(!other.is_exploded());
        assert_eq!(open_coords(&game), vec![(0, 0), (2, 2)]);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_border() {
        let mut game = game((3, 3), &[(2, 2)]);

        assert_eq!(game.open_cell((0, 0)).unwrap(), OpenOutcome::Win);
        assert_eq!(game.state(), GameState::Win);
        assert_eq!(game.cell((1, 1)).unwrap().value(), 1);
        assert!(!game.cell((2, 2)).unwrap().is_open());
    }

    #[test]
    fn flood_fill_stops_at_numbers() {
        let mut game = game((5, 1), &[(2, 0)]);

        assert_eq!(game.open_cell((0, 0)).unwrap(), OpenOutcome::Safe);
        assert_eq!(game.state(), GameState::InProgress);
        assert_eq!(open_coords(&game), vec![(0, 0), (1, 0)]);
        assert_eq!(game.board().to_string(), "01...");
    }

    #[test]
    fn flood_fill_skips_marked_cells() {
        let mut game = game((4, 1), &[(3, 0)]);
        game.flag_cell((1, 0), false).unwrap();

        game.open_cell((0, 0)).unwrap();

        assert_eq!(open_coords(&game), vec![(0, 0)]);
        assert_eq!(game.board().to_string(), "0F..");
    }

    #[test]
    fn chord_reveals_remaining_neighbors() {
        let mut game = game((3, 3), &[(0, 1), (2, 1)]);

        game.open_cell((1, 1)).unwrap();
        game.flag_cell((0, 1), false).unwrap();
        game.flag_cell((2, 1), false).unwrap();

        assert_eq!(game.open_cell((1, 1)).unwrap(), OpenOutcome::Win);
        assert_eq!(game.cell((1, 0)).unwrap().value(), 2);
        assert_eq!(game.cell((1, 2)).unwrap().value(), 2);
        assert_eq!(game.unopened_cells().count(), 2);
    }

    #[test]
    fn chord_mismatch_is_noop() {
        let mut game = game((3, 3), &[(0, 1), (2, 1)]);
        game.open_cell((1, 1)).unwrap();
        game.flag_cell((0, 1), false).unwrap();
        let before = game.snapshot();

        assert_eq!(game.open_cell((1, 1)).unwrap(), OpenOutcome::NoChange);
        assert_eq!(game, before);
    }

    #[test]
    fn chord_on_wrong_flag_loses() {
        let mut game = game((3, 3), &[(0, 1), (2, 1)]);
        game.open_cell((1, 1)).unwrap();
        game.flag_cell((0, 1), false).unwrap();
        game.flag_cell((1, 0), false).unwrap();

        assert_eq!(game.open_cell((1, 1)).unwrap(), OpenOutcome::Explode);
        assert_eq!(game.state(), GameState::Lose);
        assert_eq!(game.exploded_cell(), Some((2, 1)));
        assert!(game.cell((0, 1)).unwrap().is_flagged());

        // (1, 2) is queued before the mine, (2, 2) after it
        assert!(game.cell((1, 2)).unwrap().is_open());
        assert!(!game.cell((2, 2)).unwrap().is_open());
        let wrong_flag = game.cell((1, 0)).unwrap();
        assert!(wrong_flag.is_flagged());
        assert!(!wrong_flag.is_open());
    }

    #[test]
    fn flag_chord_marks_closed_neighbors() {
        let mut game = game((4, 1), &[(0, 0), (2, 0)]);

        assert_eq!(game.open_cell((1, 0)).unwrap(), OpenOutcome::Safe);
        assert_eq!(game.flag_cell((1, 0), false).unwrap(), FlagOutcome::MarkChanged);
        assert!(game.cell((0, 0)).unwrap().is_flagged());
        assert!(game.cell((2, 0)).unwrap().is_flagged());
        assert_eq!(game.flags(), 2);

        assert_eq!(game.flag_cell((1, 0), false).unwrap(), FlagOutcome::NoChange);
        assert_eq!(game.flags(), 2);
    }

    #[test]
    fn flag_chord_mismatch_is_noop() {
        let mut game = game((3, 3), &[(0, 0)]);
        game.open_cell((1, 1)).unwrap();

        assert_eq!(game.flag_cell((1, 1), false).unwrap(), FlagOutcome::NoChange);
        assert_eq!(game.flags(), 0);
    }

    #[test]
    fn flag_chord_promotes_guessed_neighbor() {
        let mut game = game((4, 1), &[(0, 0), (2, 0)]);
        game.flag_cell((0, 0), true).unwrap();
        game.flag_cell((0, 0), true).unwrap();
        assert_eq!(game.flags(), 0);

        game.open_cell((1, 0)).unwrap();
        assert_eq!(game.flag_cell((1, 0), true).unwrap(), FlagOutcome::MarkChanged);

        assert!(game.cell((0, 0)).unwrap().is_flagged());
        assert!(game.cell((2, 0)).unwrap().is_flagged());
        assert_eq!(game.flags(), 2);
    }

    #[test]
    fn flag_counter_tracks_guess_cycle() {
        let mut game = game((2, 2), &[(0, 0)]);

        game.flag_cell((0, 0), true).unwrap();
        assert_eq!(game.flags(), 1);
        game.flag_cell((0, 0), true).unwrap();
        assert_eq!(game.flags(), 0);
        assert_eq!(game.cell((0, 0)).unwrap().marker_state(), MarkerState::Guessed);
        game.flag_cell((0, 0), true).unwrap();
        assert_eq!(game.flags(), 0);
        assert_eq!(game.mines_left(), 1);
    }

    #[test]
    fn flagging_does_not_start_game() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.flag_cell((1, 1), false).unwrap();

        assert_eq!(game.state(), GameState::New);
        assert_eq!(game.mines_left(), 0);
    }

    #[test]
    fn moves_after_end_are_noops() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.open_cell((0, 0)).unwrap();
        let before = game.snapshot();

        assert_eq!(game.open_cell((1, 1)).unwrap(), OpenOutcome::NoChange);
        assert_eq!(game.flag_cell((1, 0), false).unwrap(), FlagOutcome::NoChange);
        assert_eq!(game, before);
    }

    #[test]
    fn out_of_range_is_error() {
        let mut game = game((2, 2), &[(0, 0)]);

        assert_eq!(game.open_cell((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(game.flag_cell((0, 2), false), Err(GameError::InvalidCoords));
        assert_eq!(game.cell((5, 5)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn open_flagged_cell_is_noop() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.flag_cell((1, 1), false).unwrap();

        assert_eq!(game.open_cell((1, 1)).unwrap(), OpenOutcome::NoChange);
        assert_eq!(game.state(), GameState::New);
    }

    #[test]
    fn win_ignores_flags() {
        let mut game = game((2, 1), &[(0, 0)]);

        assert_eq!(game.open_cell((1, 0)).unwrap(), OpenOutcome::Win);
        assert_eq!(game.state(), GameState::Win);
        assert!(!game.cell((0, 0)).unwrap().is_open());
        assert_eq!(game.board().unopened_count(), game.mines());
        assert_eq!(game.flags(), 0);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut game = game((3, 3), &[(2, 2)]);
        let before = game.snapshot();

        game.open_cell((0, 0)).unwrap();

        assert_eq!(before.state(), GameState::New);
        assert!(!before.cell((0, 0)).unwrap().is_open());
        assert!(game.cell((0, 0)).unwrap().is_open());
    }

    #[test]
    fn snapshot_survives_serialization() {
        let mut game = game((3, 3), &[(1, 1)]);
        game.open_cell((0, 0)).unwrap();
        game.flag_cell((1, 1), false).unwrap();

        let json = serde_json::to_string(&game).unwrap();
        let restored: Game = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, game);
    }

    #[test]
    fn start_new_game_replaces_session() {
        let mut game = Game::new(GameConfig::beginner(), Some("first".into())).unwrap();
        game.flag_cell((0, 0), false).unwrap();

        game.start_new_game(GameConfig::new((5, 4), 3).unwrap(), Some("second".into()))
            .unwrap();

        assert_eq!(game.size(), (5, 4));
        assert_eq!(game.mines(), 3);
        assert_eq!(game.flags(), 0);
        assert_eq!(game.state(), GameState::New);
        assert_eq!(game.seed(), Some(&Seed::from("second")));
    }

    #[test]
    fn start_new_game_rejects_bad_config() {
        let mut game = Game::new(GameConfig::beginner(), Some(Seed::from(3_u64))).unwrap();
        let bad = GameConfig { size: (2, 2), mines: 4 };

        assert_eq!(game.start_new_game(bad, None), Err(GameError::TooManyMines));
        assert_eq!(game.size(), (9, 9));
    }

    #[test]
    fn unseeded_game_records_its_seed() {
        let game = Game::new(GameConfig::beginner(), None).unwrap();
        let seed = game.seed().cloned().unwrap();
        let replay = Game::new(GameConfig::beginner(), Some(seed)).unwrap();

        assert_eq!(game.board(), replay.board());
    }
}
