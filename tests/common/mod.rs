#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chess_mentor::explain::GenerativeBackend;
use chess_mentor::{
    EngineError, EngineScore, EvalResult, Evaluator, ExplainError, Explainer, QualityTier,
    SearchLimits,
};
use shakmaty::{Chess, Move, Position};

/// FEN after 1.e4 from the start position.
pub const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

/// What the stub engine does for one position.
#[derive(Clone, Debug)]
pub enum Reply {
    Score(EngineScore),
    Fail(fn() -> EngineError),
}

/// Deterministic engine keyed by FEN. Unknown positions get no score.
#[derive(Default)]
pub struct StubEngine {
    replies: HashMap<String, Reply>,
    pub log: Arc<Mutex<Vec<(String, SearchLimits)>>>,
    pub quits: Arc<AtomicUsize>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(mut self, fen: &str, score: EngineScore) -> Self {
        self.replies.insert(fen.to_string(), Reply::Score(score));
        self
    }

    pub fn fail(mut self, fen: &str, err: fn() -> EngineError) -> Self {
        self.replies.insert(fen.to_string(), Reply::Fail(err));
        self
    }

    pub fn boxed(self) -> Option<Box<dyn Evaluator>> {
        Some(Box::new(self))
    }
}

#[async_trait]
impl Evaluator for StubEngine {
    async fn analyze(
        &mut self,
        position: &Chess,
        limits: SearchLimits,
    ) -> Result<EvalResult, EngineError> {
        let fen = chess_core::to_fen(position);
        self.log.lock().unwrap().push((fen.clone(), limits));

        let score = match self.replies.get(&fen) {
            Some(Reply::Score(score)) => *score,
            Some(Reply::Fail(err)) => return Err(err()),
            None => EngineScore::missing(position.turn()),
        };
        Ok(EvalResult {
            score,
            best_move: None,
            depth: Some(limits.depth),
        })
    }

    async fn quit(&mut self) {
        self.quits.fetch_add(1, Ordering::SeqCst);
    }
}

/// Explainer that returns a fixed reply and counts calls.
#[derive(Clone, Default)]
pub struct RecordingExplainer {
    pub reply: Option<String>,
    pub calls: Arc<Mutex<Vec<QualityTier>>>,
}

impl RecordingExplainer {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Explainer for RecordingExplainer {
    async fn explain(&self, _position: &Chess, _mv: &Move, quality: QualityTier) -> Option<String> {
        self.calls.lock().unwrap().push(quality);
        self.reply.clone()
    }
}

/// Generative backend where only `answering` replies. Records the model of
/// every call.
#[derive(Clone, Default)]
pub struct CountingBackend {
    pub answering: String,
    pub reply: String,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl CountingBackend {
    pub fn new(answering: &str, reply: &str) -> Self {
        Self {
            answering: answering.to_string(),
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeBackend for CountingBackend {
    async fn generate(&self, model: &str, _prompt: &str) -> Result<String, ExplainError> {
        self.calls.lock().unwrap().push(model.to_string());
        if model == self.answering {
            Ok(self.reply.clone())
        } else {
            Err(ExplainError::Status {
                status: 404,
                body: format!("{model} not found"),
            })
        }
    }
}

/// Write an executable shell script into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}
