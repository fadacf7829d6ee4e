//! Core module - pure game logic with no external dependencies
//!
//! This module contains all the game rules, state management, and logic.
//! It has zero dependencies on UI, networking, or I/O.

pub mod bag;
pub mod board;
pub mod game_state;
pub mod pieces;
pub mod snapshot;

// Re-export commonly used types
pub use bag::{PieceBag, SimpleRng};
pub use board::Board;
pub use game_state::GameState;
pub use pieces::Piece;
pub use snapshot::{ActivePiece, GameSnapshot};
