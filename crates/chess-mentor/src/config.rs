//! Mentor configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::{EngineOptions, SearchLimits};
use crate::error::ConfigError;
use crate::gemini::DEFAULT_API_BASE;
use crate::quality::QualityThresholds;

/// Models tried in order until one answers
pub const DEFAULT_MODELS: &[&str] = &[
    "models/gemini-2.5-flash",
    "models/gemini-2.5-pro",
    "models/gemini-flash-latest",
    "models/gemini-2.0-flash",
    "models/gemini-pro-latest",
];

#[derive(Clone, Debug)]
pub struct MentorConfig {
    /// Explicit engine executable; discovery runs when unset
    pub engine_path: Option<PathBuf>,

    pub engine_options: EngineOptions,

    /// Default search bounds per analysis
    pub limits: SearchLimits,

    pub thresholds: QualityThresholds,

    /// Master switch for explanations
    pub explanations: bool,

    /// Generative API key; explanations are off without one
    pub api_key: Option<String>,

    /// Candidate models, probed in order
    pub models: Vec<String>,

    pub api_base: String,

    /// Per-request timeout for the explanation service
    pub request_timeout: Duration,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self {
            engine_path: None,
            engine_options: EngineOptions::default(),
            limits: SearchLimits::default(),
            thresholds: QualityThresholds::default(),
            explanations: true,
            api_key: None,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl MentorConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`. Unset or blank variables keep
    /// their defaults; unparseable values are errors.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        config.engine_path = get("STOCKFISH_PATH").map(PathBuf::from);

        if let Some(threads) = parse_var(get("ENGINE_THREADS"), "ENGINE_THREADS")? {
            config.engine_options.threads = threads;
        }
        if let Some(hash_mb) = parse_var(get("ENGINE_HASH_MB"), "ENGINE_HASH_MB")? {
            config.engine_options.hash_mb = hash_mb;
        }
        if let Some(depth) = parse_var(get("MENTOR_DEPTH"), "MENTOR_DEPTH")? {
            config.limits.depth = depth;
        }
        if let Some(ms) = parse_var::<u64>(get("MENTOR_TIME_LIMIT_MS"), "MENTOR_TIME_LIMIT_MS")? {
            config.limits.movetime = Duration::from_millis(ms);
        }

        if let Some(value) = get("MENTOR_EXPLANATIONS") {
            config.explanations = parse_bool(&value).ok_or(ConfigError::Invalid {
                var: "MENTOR_EXPLANATIONS",
                value,
            })?;
        }

        config.api_key = get("GOOGLE_GEMINI_API_KEY");

        if let Some(models) = get("GEMINI_MODELS") {
            config.models = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(base) = get("GEMINI_API_BASE") {
            config.api_base = base;
        }
        if let Some(secs) = parse_var::<u64>(get("GEMINI_TIMEOUT_SECS"), "GEMINI_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(value: Option<String>, var: &'static str) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| v.parse().map_err(|_| ConfigError::Invalid { var, value: v }))
        .transpose()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<MentorConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MentorConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.engine_path, None);
        assert_eq!(config.limits, SearchLimits::default());
        assert_eq!(config.engine_options.hash_mb, 64);
        assert!(config.explanations);
        assert_eq!(config.api_key, None);
        assert_eq!(config.models.len(), DEFAULT_MODELS.len());
        assert_eq!(config.models[0], "models/gemini-2.5-flash");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOCKFISH_PATH", "/opt/sf/stockfish"),
            ("MENTOR_DEPTH", "12"),
            ("MENTOR_TIME_LIMIT_MS", "250"),
            ("MENTOR_EXPLANATIONS", "off"),
            ("GOOGLE_GEMINI_API_KEY", "secret"),
            ("GEMINI_MODELS", "models/a, models/b ,,"),
            ("ENGINE_THREADS", "4"),
        ])
        .unwrap();

        assert_eq!(config.engine_path, Some(PathBuf::from("/opt/sf/stockfish")));
        assert_eq!(config.limits.depth, 12);
        assert_eq!(config.limits.movetime, Duration::from_millis(250));
        assert!(!config.explanations);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.models, vec!["models/a", "models/b"]);
        assert_eq!(config.engine_options.threads, 4);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[("GOOGLE_GEMINI_API_KEY", "  "), ("STOCKFISH_PATH", "")]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.engine_path, None);
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[("MENTOR_DEPTH", "deep")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MENTOR_DEPTH", .. }));
    }

    #[test]
    fn test_invalid_bool() {
        let err = load(&[("MENTOR_EXPLANATIONS", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("MENTOR_EXPLANATIONS"));
    }
}
