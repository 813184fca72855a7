//! Position and move notation helpers.
//!
//! Chess rules are delegated to `shakmaty`; this crate only converts between
//! the text forms the mentor accepts (FEN, UCI, SAN) and shakmaty values.

pub mod notation;
pub mod position;

pub use notation::{parse_move, to_san, to_uci};
pub use position::{after_move, from_fen, to_fen, STANDARD_START_FEN};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Unrecognized move notation: {0}")]
    UnrecognizedMove(String),

    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },
}
