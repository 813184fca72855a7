//! Move notation: accepts UCI (`e2e4`, `e7e8q`) or SAN (`e4`, `Nf3`, `O-O`, `Qxf7#`).

use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Move};

use crate::position::to_fen;
use crate::NotationError;

/// Resolve move text against `pos`.
///
/// UCI is tried first, then SAN. Text that neither parser understands is
/// `UnrecognizedMove`; text that parses but is not legal here is
/// `IllegalMove`.
pub fn parse_move(pos: &Chess, text: &str) -> Result<Move, NotationError> {
    let text = text.trim();

    if let Ok(uci) = text.parse::<UciMove>() {
        return uci.to_move(pos).map_err(|_| illegal(pos, text));
    }

    match text.parse::<SanPlus>() {
        Ok(san_plus) => san_plus.san.to_move(pos).map_err(|_| illegal(pos, text)),
        Err(_) => Err(NotationError::UnrecognizedMove(text.to_string())),
    }
}

/// Standard algebraic notation for a legal move, e.g. `Nf3`.
pub fn to_san(pos: &Chess, mv: &Move) -> String {
    San::from_move(pos, mv.clone()).to_string()
}

/// UCI notation for a move, e.g. `e2e4`. Castling uses the king's
/// destination square as engines expect.
pub fn to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

fn illegal(pos: &Chess, text: &str) -> NotationError {
    NotationError::IllegalMove {
        mv: text.to_string(),
        fen: to_fen(pos),
    }
}
