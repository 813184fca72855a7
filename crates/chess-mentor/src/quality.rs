//! Move quality classification from before/after scores (pure functions only)

use std::fmt;

use serde::{Serialize, Serializer};

/// Default tier boundaries (centipawn change for the mover, inclusive)
const THRESHOLD_EXCELLENT: i32 = 50;
const THRESHOLD_GOOD: i32 = 15;
const THRESHOLD_NEUTRAL: i32 = -15;
const THRESHOLD_QUESTIONABLE: i32 = -50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityTier {
    Excellent,
    Good,
    Neutral,
    Questionable,
    Blunder,
    /// No evaluation was possible (engine missing or no score).
    Unknown,
    /// Evaluation was attempted and failed.
    Error,
}

impl QualityTier {
    pub fn name(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "Excellent",
            QualityTier::Good => "Good",
            QualityTier::Neutral => "Neutral",
            QualityTier::Questionable => "Questionable",
            QualityTier::Blunder => "Blunder",
            QualityTier::Unknown => "Unknown",
            QualityTier::Error => "Error",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "⭐",
            QualityTier::Good => "✓",
            QualityTier::Neutral => "=",
            QualityTier::Questionable => "⚠️",
            QualityTier::Blunder => "❌",
            QualityTier::Unknown => "?",
            QualityTier::Error => "✖",
        }
    }

    /// Display label, symbol first: `"⭐ Excellent"`.
    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "⭐ Excellent",
            QualityTier::Good => "✓ Good",
            QualityTier::Neutral => "= Neutral",
            QualityTier::Questionable => "⚠️ Questionable",
            QualityTier::Blunder => "❌ Blunder",
            QualityTier::Unknown => "? Unknown",
            QualityTier::Error => "✖ Error",
        }
    }

    /// True for the five tiers backed by an actual score change.
    pub fn is_graded(&self) -> bool {
        !matches!(self, QualityTier::Unknown | QualityTier::Error)
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for QualityTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityThresholds {
    pub excellent: i32,
    pub good: i32,
    pub neutral: i32,
    pub questionable: i32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            excellent: THRESHOLD_EXCELLENT,
            good: THRESHOLD_GOOD,
            neutral: THRESHOLD_NEUTRAL,
            questionable: THRESHOLD_QUESTIONABLE,
        }
    }
}

impl QualityThresholds {
    /// Tier for a score change, checked best to worst; each bound is inclusive.
    pub fn tier_for(&self, delta: i32) -> QualityTier {
        if delta >= self.excellent {
            QualityTier::Excellent
        } else if delta >= self.good {
            QualityTier::Good
        } else if delta >= self.neutral {
            QualityTier::Neutral
        } else if delta >= self.questionable {
            QualityTier::Questionable
        } else {
            QualityTier::Blunder
        }
    }

    /// Classify a move from the mover's signed scores before and after it.
    ///
    /// Returns the tier and the change `after - before`; if either score is
    /// missing the tier is `Unknown` and there is no change.
    pub fn classify(&self, before: Option<i32>, after: Option<i32>) -> (QualityTier, Option<i32>) {
        match (before, after) {
            (Some(before), Some(after)) => {
                let delta = after.saturating_sub(before);
                (self.tier_for(delta), Some(delta))
            }
            _ => (QualityTier::Unknown, None),
        }
    }
}

/// [`QualityThresholds::classify`] with the default thresholds.
pub fn classify(before: Option<i32>, after: Option<i32>) -> (QualityTier, Option<i32>) {
    QualityThresholds::default().classify(before, after)
}
