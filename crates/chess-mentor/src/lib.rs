//! Chess mentor: grades a single move with a UCI engine and, when a
//! generative text service is configured, explains the grade in plain words.

pub mod config;
pub mod engine;
pub mod error;
pub mod explain;
pub mod gemini;
pub mod mentor;
pub mod quality;
pub mod score;

pub use config::MentorConfig;
pub use engine::{EngineOptions, EvalResult, Evaluator, SearchLimits, UciEngine};
pub use error::{ConfigError, EngineError, ExplainError, MentorError};
pub use explain::{Explainer, NullExplainer};
pub use mentor::{format_for_display, AnalysisResult, Mentor};
pub use quality::{classify, QualityThresholds, QualityTier};
pub use score::{to_signed_centipawns, EngineScore, Score, MATE_SCORE};
