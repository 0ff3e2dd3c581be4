use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board must be at least one cell wide and tall")]
    InvalidSize,
    #[error("At least one mine is required")]
    NoMines,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board layout is malformed")]
    InvalidLayout,
}

pub type Result<T> = std::result::Result<T, GameError>;
