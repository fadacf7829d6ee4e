//! Read-only session view handed to render and wire callers.

use crate::types::{Phase, Tetromino, CELL_COUNT};

/// The falling piece resolved to absolute board cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: Tetromino,
    pub cells: [(i8, i8); 4],
}

/// Everything a renderer or broadcaster needs, detached from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Landed grid as wire cell values, `index = y * width + x`
    pub board: [u8; CELL_COUNT],
    pub active: Option<ActivePiece>,
    pub next: Tetromino,
    pub held: Option<Tetromino>,
    pub score: u32,
    pub level: u32,
    pub goal: u32,
    pub lines_to_goal: u32,
    pub lines_cleared: u32,
    pub speed_ms: u32,
    pub phase: Phase,
}
