//! Move analysis: evaluate before and after, classify, explain, display.

use serde::Serialize;
use shakmaty::{Chess, Move, Position};
use tracing::{debug, error, info, warn};

use crate::config::MentorConfig;
use crate::engine::{self, Evaluator, SearchLimits};
use crate::error::{EngineError, MentorError};
use crate::explain::{self, Explainer, NullExplainer};
use crate::quality::{QualityThresholds, QualityTier};
use crate::score::{to_signed_centipawns, EngineScore};

/// Outcome of analysing one move
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Engine score after the move, from the new side to move's perspective
    pub score: Option<EngineScore>,
    /// Plies to mate after the move, signed like `score`
    pub mate: Option<i32>,
    pub quality: QualityTier,
    /// Centipawn change for the mover (`after - before`)
    pub score_diff: Option<i32>,
    pub explanation: Option<String>,
    pub error: Option<String>,
    pub engine_available: bool,
}

impl AnalysisResult {
    fn engine_unavailable() -> Self {
        Self {
            score: None,
            mate: None,
            quality: QualityTier::Unknown,
            score_diff: None,
            explanation: None,
            error: None,
            engine_available: false,
        }
    }

    fn failed(err: &EngineError) -> Self {
        Self {
            quality: QualityTier::Error,
            error: Some(err.to_string()),
            engine_available: true,
            ..Self::engine_unavailable()
        }
    }
}

pub struct Mentor {
    engine: Option<Box<dyn Evaluator>>,
    explainer: Box<dyn Explainer>,
    thresholds: QualityThresholds,
}

impl Mentor {
    /// Start the engine and explainer the configuration describes. Missing
    /// pieces degrade the mentor instead of failing it.
    pub async fn new(config: &MentorConfig) -> Self {
        let engine = engine::start(config.engine_path.as_deref(), config.engine_options)
            .await
            .map(|e| Box::new(e) as Box<dyn Evaluator>);
        let explainer = explain::from_config(config);

        Self::with_parts(engine, explainer)
            .await
            .with_thresholds(config.thresholds)
    }

    /// Assemble a mentor from ready-made parts.
    ///
    /// The explainer settles on its model here, so analyses make at most one
    /// remote call each.
    pub async fn with_parts(engine: Option<Box<dyn Evaluator>>, explainer: Box<dyn Explainer>) -> Self {
        explainer.warm_up().await;
        Self {
            engine,
            explainer,
            thresholds: QualityThresholds::default(),
        }
    }

    /// A mentor with neither engine nor explanations.
    pub fn offline() -> Self {
        Self {
            engine: None,
            explainer: Box::new(NullExplainer),
            thresholds: QualityThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn engine_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Evaluate `mv` in `position`, grade it and ask for an explanation.
    ///
    /// An illegal move is the only error. Engine trouble shows up as an
    /// `Error` result and skips the explanation; a missing engine gives an
    /// `Unknown` result.
    pub async fn analyze_move(
        &mut self,
        position: &Chess,
        mv: &Move,
        limits: SearchLimits,
    ) -> Result<AnalysisResult, MentorError> {
        if !position.legal_moves().contains(mv) {
            return Err(MentorError::IllegalMove {
                mv: chess_core::to_uci(mv),
                fen: chess_core::to_fen(position),
            });
        }

        let mut result = self.evaluate(position, mv, limits).await;
        if result.quality != QualityTier::Error {
            result.explanation = self.explainer.explain(position, mv, result.quality).await;
        }
        Ok(result)
    }

    /// [`Mentor::analyze_move`] for move text in UCI or SAN.
    pub async fn analyze_notation(
        &mut self,
        position: &Chess,
        notation: &str,
        limits: SearchLimits,
    ) -> Result<AnalysisResult, MentorError> {
        let mv = chess_core::parse_move(position, notation)?;
        self.analyze_move(position, &mv, limits).await
    }

    /// [`Mentor::analyze_notation`] for a position given as FEN.
    pub async fn analyze_fen(
        &mut self,
        fen: &str,
        notation: &str,
        limits: SearchLimits,
    ) -> Result<AnalysisResult, MentorError> {
        let position = chess_core::from_fen(fen)?;
        self.analyze_notation(&position, notation, limits).await
    }

    async fn evaluate(&mut self, position: &Chess, mv: &Move, limits: SearchLimits) -> AnalysisResult {
        let Some(engine) = self.engine.as_mut() else {
            debug!("No engine, skipping evaluation");
            return AnalysisResult::engine_unavailable();
        };

        let mover = position.turn();
        let after = chess_core::after_move(position, mv);

        let before_eval = match engine.analyze(position, limits).await {
            Ok(eval) => eval,
            Err(e) => {
                error!(error = %e, "Engine failed on the position before the move");
                return AnalysisResult::failed(&e);
            }
        };
        let after_eval = match engine.analyze(&after, limits).await {
            Ok(eval) => eval,
            Err(e) => {
                error!(error = %e, "Engine failed on the position after the move");
                return AnalysisResult::failed(&e);
            }
        };

        let before_cp = to_signed_centipawns(&before_eval.score, mover);
        let after_cp = to_signed_centipawns(&after_eval.score, mover);
        let (quality, score_diff) = self.thresholds.classify(before_cp, after_cp);
        if quality == QualityTier::Unknown {
            warn!(fen = %chess_core::to_fen(position), "Engine returned no score");
        }
        debug!(?before_cp, ?after_cp, ?score_diff, quality = quality.name(), "Move classified");

        AnalysisResult {
            score: Some(after_eval.score).filter(|s| !s.is_missing()),
            mate: after_eval.score.mate_plies(),
            quality,
            score_diff,
            explanation: None,
            error: None,
            engine_available: true,
        }
    }

    /// Stop the engine. Later analyses report the engine as unavailable.
    pub async fn shutdown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.quit().await;
            info!("Mentor shut down");
        }
    }
}

/// Render a result as a few lines of text.
///
/// `Move`, `Quality`, then `Score Change` when known and `Error` when set.
/// An explanation, or a notice that analysis was unavailable, follows after
/// a blank line.
pub fn format_for_display(move_notation: &str, result: &AnalysisResult) -> String {
    let mut lines = vec![
        format!("Move: {move_notation}"),
        format!("Quality: {}", result.quality.label()),
    ];
    if let Some(diff) = result.score_diff {
        lines.push(format!("Score Change: {:+.1}cp", diff as f64));
    }
    if let Some(err) = &result.error {
        lines.push(format!("Error: {err}"));
    }

    match &result.explanation {
        Some(text) => {
            lines.push(String::new());
            lines.push(text.clone());
        }
        None if !result.quality.is_graded() => {
            lines.push(String::new());
            lines.push("(analysis not available)".to_string());
        }
        None => {}
    }

    lines.join("\n")
}
