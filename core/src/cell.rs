use serde::{Deserialize, Serialize};

/// Stored value of a mine cell.
pub const MINE_VALUE: i8 = -1;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualState {
    #[default]
    Closed,
    Open,
    /// Flagged cell shown as if its mine were resolved, only produced by the reduced view.
    ReducedOpen,
}

/// Player annotation, independent of whether the cell is revealed.
///
/// Toggling cycles `None -> Flagged -> Guessed -> None` with guessing enabled, or `None -> Flagged -> None`
/// without it. `Mine` is only ever set when a mine cell is opened.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerState {
    #[default]
    None,
    Flagged,
    Guessed,
    Mine,
}

/// One square of the board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    value: i8,
    visual: VisualState,
    marker: MarkerState,
    exploded: bool,
}

impl Cell {
    /// `-1` for a mine, otherwise the number of adjacent mines.
    pub const fn value(self) -> i8 {
        self.value
    }

    /// Adjacent mine count, `None` for a mine.
    pub fn adjacent_mines(self) -> Option<u8> {
        u8::try_from(self.value).ok()
    }

    pub const fn visual_state(self) -> VisualState {
        self.visual
    }

    pub const fn marker_state(self) -> MarkerState {
        self.marker
    }

    pub const fn is_mine(self) -> bool {
        self.value == MINE_VALUE
    }

    pub const fn is_open(self) -> bool {
        matches!(self.visual, VisualState::Open)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self.marker, MarkerState::Flagged)
    }

    /// Flagged or guessed, either protects the cell from a plain reveal.
    pub const fn is_marked(self) -> bool {
        matches!(self.marker, MarkerState::Flagged | MarkerState::Guessed)
    }

    pub const fn is_exploded(self) -> bool {
        self.exploded
    }

    /// Opens the cell regardless of markers.
    pub fn open(&mut self) {
        self.visual = VisualState::Open;
    }

    /// Opens the cell unless it is marked or already open, returns whether it opened.
    pub fn maybe_open(&mut self) -> bool {
        if self.is_marked() || self.is_open() {
            return false;
        }

        self.visual = VisualState::Open;
        if self.is_mine() {
            self.marker = MarkerState::Mine;
        }
        true
    }

    /// Advances the marker cycle, returns whether the cell ends up flagged.
    pub fn toggle_flag(&mut self, use_guessing: bool) -> bool {
        use MarkerState::*;

        self.marker = match self.marker {
            None => Flagged,
            Flagged if use_guessing => Guessed,
            Flagged => None,
            Guessed => None,
            Mine => Mine,
        };
        self.is_flagged()
    }

    pub fn explode(&mut self) {
        self.exploded = true;
    }

    pub(crate) fn flag(&mut self) {
        self.marker = MarkerState::Flagged;
    }

    pub(crate) fn set_mine(&mut self) {
        self.value = MINE_VALUE;
    }

    pub(crate) fn increment_value(&mut self) {
        if !self.is_mine() {
            self.value += 1;
        }
    }

    pub(crate) fn decrement_value(&mut self) {
        if self.value > 0 {
            self.value -= 1;
        }
    }

    /// Hides the flag and shows the cell as resolved.
    pub(crate) fn enter_reduced(&mut self) {
        self.visual = VisualState::ReducedOpen;
        self.marker = MarkerState::None;
    }
}
