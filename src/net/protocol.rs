//! Protocol module - plain text match tokens
//!
//! Three message kinds cross the wire, one newline-terminated token per
//! message: `start_game`, `board_state:<peer>:<c0,...,c219>` and
//! `game_over`. Tokens themselves never contain a newline. Anything that
//! fails to parse is the sender's problem: receivers log and move on.

use std::fmt;
use std::fmt::Write as _;

use crate::types::CELL_COUNT;

pub const START_GAME: &str = "start_game";
pub const GAME_OVER: &str = "game_over";
const BOARD_STATE_PREFIX: &str = "board_state:";

/// One match message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetMessage {
    /// Host tells joiners the match begins
    Start,
    /// Full landed-grid snapshot of one peer's board, row-major from the
    /// bottom row
    Board { peer: u8, cells: [u8; CELL_COUNT] },
    /// The sending peer's session ended
    GameOver,
}

/// A token that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    UnknownToken,
    BadPeerIndex,
    BadCellValue,
    BadCellCount(usize),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownToken => write!(f, "unrecognized token"),
            ProtocolError::BadPeerIndex => write!(f, "peer index is not a number"),
            ProtocolError::BadCellValue => write!(f, "cell value is not a shape"),
            ProtocolError::BadCellCount(n) => {
                write!(f, "expected {} cells, got {}", CELL_COUNT, n)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Render a message as its wire token (no trailing newline)
pub fn encode(message: &NetMessage) -> String {
    match message {
        NetMessage::Start => START_GAME.to_string(),
        NetMessage::GameOver => GAME_OVER.to_string(),
        NetMessage::Board { peer, cells } => {
            // "board_state:" + index + 220 cells with separators
            let mut out = String::with_capacity(BOARD_STATE_PREFIX.len() + 4 + CELL_COUNT * 2);
            out.push_str(BOARD_STATE_PREFIX);
            let _ = write!(out, "{}", peer);
            for (i, cell) in cells.iter().enumerate() {
                out.push(if i == 0 { ':' } else { ',' });
                let _ = write!(out, "{}", cell);
            }
            out
        }
    }
}

/// Parse one received token
pub fn parse(token: &str) -> Result<NetMessage, ProtocolError> {
    if token == START_GAME {
        return Ok(NetMessage::Start);
    }
    if token == GAME_OVER {
        return Ok(NetMessage::GameOver);
    }

    let Some(rest) = token.strip_prefix(BOARD_STATE_PREFIX) else {
        return Err(ProtocolError::UnknownToken);
    };
    let Some((peer, cell_list)) = rest.split_once(':') else {
        return Err(ProtocolError::UnknownToken);
    };

    let peer: u8 = peer.parse().map_err(|_| ProtocolError::BadPeerIndex)?;

    let mut cells = [0u8; CELL_COUNT];
    let mut count = 0usize;
    for value in cell_list.split(',') {
        if count == CELL_COUNT {
            return Err(ProtocolError::BadCellCount(count + 1));
        }
        let v: u8 = value.trim().parse().map_err(|_| ProtocolError::BadCellValue)?;
        if v > 7 {
            return Err(ProtocolError::BadCellValue);
        }
        cells[count] = v;
        count += 1;
    }

    if count != CELL_COUNT {
        return Err(ProtocolError::BadCellCount(count));
    }

    Ok(NetMessage::Board { peer, cells })
}
