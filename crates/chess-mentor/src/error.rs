//! Mentor error types

use std::time::Duration;

use chess_core::NotationError;
use thiserror::Error;

/// Errors surfaced to the caller. Only caller-contract violations (bad
/// notation, illegal moves) and bad configuration end up here; engine and
/// explanation failures are reported inside the analysis result instead.
#[derive(Error, Debug)]
pub enum MentorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Notation error: {0}")]
    Notation(NotationError),

    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },
}

impl From<NotationError> for MentorError {
    fn from(err: NotationError) -> Self {
        match err {
            NotationError::IllegalMove { mv, fen } => MentorError::IllegalMove { mv, fen },
            other => MentorError::Notation(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to spawn engine {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine handshake failed: {0}")]
    Handshake(String),

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine closed its output")]
    Closed,

    #[error("Engine did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Response contained no text")]
    Empty,
}
