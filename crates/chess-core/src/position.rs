//! FEN conversion and post-move snapshots.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};

use crate::NotationError;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a standard-chess position.
pub fn from_fen(fen: &str) -> Result<Chess, NotationError> {
    let trimmed = fen.trim();
    let parsed: Fen = trimmed.parse().map_err(|e| NotationError::InvalidFen {
        fen: trimmed.to_string(),
        reason: format!("{e}"),
    })?;

    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| NotationError::InvalidFen {
            fen: trimmed.to_string(),
            reason: format!("{e}"),
        })
}

/// Render a position as FEN, keeping the en-passant square only when a
/// capture is actually legal (what UCI engines expect).
pub fn to_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Copy of `pos` with `mv` applied. The input position is left untouched.
///
/// `mv` must be legal in `pos`; callers validate with [`crate::parse_move`]
/// or `legal_moves()` first.
pub fn after_move(pos: &Chess, mv: &Move) -> Chess {
    let mut next = pos.clone();
    next.play_unchecked(mv.clone());
    next
}
