//! Core types shared across the crate
//! This module contains pure data types with no external dependencies

/// Board dimensions
pub const BOARD_WIDTH: u8 = 10;
pub const BOARD_HEIGHT: u8 = 22;

/// Total number of cells on the board
pub const CELL_COUNT: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Gravity interval for a fresh session (milliseconds)
pub const INITIAL_SPEED_MS: u32 = 300;

/// Line-clear target for the first level
pub const INITIAL_GOAL: u32 = 10;

/// Score awarded per cleared line
pub const SCORE_PER_LINE: u32 = 1000;

/// Tetromino shape kinds. `Empty` doubles as the vacant board cell, so the
/// discriminants are also the wire encoding of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tetromino {
    Empty = 0,
    Z = 1,
    S = 2,
    I = 3,
    T = 4,
    O = 5,
    L = 6,
    J = 7,
}

impl Tetromino {
    /// The seven playable kinds, in discriminant order
    pub const KINDS: [Tetromino; 7] = [
        Tetromino::Z,
        Tetromino::S,
        Tetromino::I,
        Tetromino::T,
        Tetromino::O,
        Tetromino::L,
        Tetromino::J,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a wire cell value
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Tetromino::Empty),
            1 => Some(Tetromino::Z),
            2 => Some(Tetromino::S),
            3 => Some(Tetromino::I),
            4 => Some(Tetromino::T),
            5 => Some(Tetromino::O),
            6 => Some(Tetromino::L),
            7 => Some(Tetromino::J),
            _ => None,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Tetromino::Empty
    }
}

/// Player inputs accepted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateRight,
    Hold,
    TogglePause,
}

/// Coarse session phase, derived from the engine flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Falling,
    LineClearPause,
    Paused,
    GameOver,
}

/// Events accumulated by the engine and drained by the session layer.
/// `BoardCommitted` marks a landed-grid change worth broadcasting;
/// `GameOver` is emitted exactly once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    BoardCommitted,
    GameOver,
}
