//! Natural-language move explanations from a generative text service.
//!
//! The service is optional. Every failure is logged and turns into "no
//! explanation"; nothing here returns an error to the mentor.

use async_trait::async_trait;
use shakmaty::{Chess, Move};
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::config::MentorConfig;
use crate::error::ExplainError;
use crate::gemini::GeminiClient;
use crate::quality::QualityTier;

/// Prompt sent to each candidate model to see whether it answers.
pub const PROBE_PROMPT: &str = "ok";

#[async_trait]
pub trait Explainer: Send + Sync {
    /// One or two sentences on why `mv` earned `quality`, or `None`.
    async fn explain(&self, position: &Chess, mv: &Move, quality: QualityTier) -> Option<String>;

    /// Do any one-time setup up front instead of on the first `explain`.
    async fn warm_up(&self) {}
}

/// Used when explanations are disabled or unconfigured.
pub struct NullExplainer;

#[async_trait]
impl Explainer for NullExplainer {
    async fn explain(&self, _position: &Chess, _mv: &Move, _quality: QualityTier) -> Option<String> {
        None
    }
}

/// A text-generation service addressed by model name.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ExplainError>;
}

/// Explainer backed by a [`GenerativeBackend`].
///
/// The candidate models are probed in order on warm-up, or on the first
/// explanation request otherwise, and the first one that answers is bound. The outcome, including "none answered",
/// is kept for the life of the explainer.
pub struct RemoteExplainer<B> {
    backend: B,
    candidates: Vec<String>,
    bound: OnceCell<Option<String>>,
}

impl<B: GenerativeBackend> RemoteExplainer<B> {
    pub fn new(backend: B, candidates: Vec<String>) -> Self {
        Self {
            backend,
            candidates,
            bound: OnceCell::new(),
        }
    }

    /// The bound model, probing on first use.
    pub async fn bound_model(&self) -> Option<&str> {
        self.bound
            .get_or_init(|| self.probe())
            .await
            .as_deref()
    }

    async fn probe(&self) -> Option<String> {
        for model in &self.candidates {
            match self.backend.generate(model, PROBE_PROMPT).await {
                Ok(_) => {
                    info!(model = %model, "Explanation model selected");
                    return Some(model.clone());
                }
                Err(e) => warn!(model = %model, error = %e, "Model probe failed"),
            }
        }
        error!(
            tried = self.candidates.len(),
            "No explanation model responded; explanations disabled"
        );
        None
    }
}

#[async_trait]
impl<B: GenerativeBackend> Explainer for RemoteExplainer<B> {
    async fn warm_up(&self) {
        self.bound_model().await;
    }

    async fn explain(&self, position: &Chess, mv: &Move, quality: QualityTier) -> Option<String> {
        let model = self.bound_model().await?;
        let san = chess_core::to_san(position, mv);
        let prompt = build_prompt(&san, &chess_core::to_fen(position), quality);

        match self.backend.generate(model, &prompt).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!(model, san = %san, "Explanation was empty");
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Err(e) => {
                warn!(model, san = %san, error = %e, "Explanation request failed");
                None
            }
        }
    }
}

pub fn build_prompt(san: &str, fen: &str, quality: QualityTier) -> String {
    if !quality.is_graded() {
        return format!(
            "You are a chess coach. Briefly explain the move {san} played in this position.\n\
             \n\
             FEN: {fen}\n\
             Engine evaluation unavailable.\n\
             \n\
             In 1-2 sentences, describe the ideas behind this move, referring to chess \
             principles such as centre control, development, king safety or tactics. \
             Keep it concise and educational."
        );
    }

    let tier = quality.name();
    format!(
        "You are a chess coach. Briefly explain the move {san} played in this position.\n\
         \n\
         FEN: {fen}\n\
         Move quality: {tier}\n\
         \n\
         In 1-2 sentences, say why this move is {tier}, referring to chess principles \
         such as centre control, development, king safety or tactics. \
         Keep it concise and educational."
    )
}

/// Build the explainer the configuration asks for.
///
/// Falls back to [`NullExplainer`] when explanations are switched off, no API
/// key is set, or the HTTP client cannot be built.
pub fn from_config(config: &MentorConfig) -> Box<dyn Explainer> {
    if !config.explanations {
        info!("Explanations disabled by configuration");
        return Box::new(NullExplainer);
    }
    let Some(api_key) = config.api_key.as_deref() else {
        warn!("GOOGLE_GEMINI_API_KEY not set; explanations disabled");
        return Box::new(NullExplainer);
    };
    if config.models.is_empty() {
        warn!("No candidate models configured; explanations disabled");
        return Box::new(NullExplainer);
    }

    match GeminiClient::new(api_key, &config.api_base, config.request_timeout) {
        Ok(client) => Box::new(RemoteExplainer::new(client, config.models.clone())),
        Err(e) => {
            error!(error = %e, "Failed to build explanation client; explanations disabled");
            Box::new(NullExplainer)
        }
    }
}
