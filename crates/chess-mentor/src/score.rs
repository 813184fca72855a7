//! Engine scores and their conversion to the mover's point of view.

use serde::{Serialize, Serializer};
use shakmaty::Color;

/// Centipawn magnitude a forced mate converts to.
pub const MATE_SCORE: i32 = 100_000;

/// Mate distances beyond this are treated as this far away.
const MAX_MATE_DISTANCE: i32 = 1_000;

/// Centipawn scores are clamped below the smallest mate value so a mate
/// always outranks material.
const MAX_CP: i32 = MATE_SCORE - MAX_MATE_DISTANCE - 1;

/// A raw engine score, relative to whichever side reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    Cp(i32),
    /// Mate in N moves; positive when the reporting side delivers it.
    Mate(i32),
    /// No score was reported, or the score was unreadable.
    Missing,
}

/// A score together with the side whose perspective it is reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineScore {
    #[serde(serialize_with = "serialize_color")]
    pub pov: Color,
    pub score: Score,
}

impl EngineScore {
    pub fn new(pov: Color, score: Score) -> Self {
        Self { pov, score }
    }

    pub fn cp(pov: Color, cp: i32) -> Self {
        Self::new(pov, Score::Cp(cp))
    }

    pub fn mate(pov: Color, moves: i32) -> Self {
        Self::new(pov, Score::Mate(moves))
    }

    pub fn missing(pov: Color) -> Self {
        Self::new(pov, Score::Missing)
    }

    pub fn is_missing(&self) -> bool {
        self.score == Score::Missing
    }

    /// Plies to mate, if this is a mate score.
    ///
    /// Signed like the engine's `mate N`: positive when `pov` delivers the
    /// mate, which takes `2N - 1` plies; negative when `pov` is mated in
    /// `2|N|` plies. `mate 0` is 0.
    pub fn mate_plies(&self) -> Option<i32> {
        match self.score {
            Score::Mate(n) => {
                let n = n.clamp(-MAX_MATE_DISTANCE, MAX_MATE_DISTANCE);
                Some(if n > 0 { 2 * n - 1 } else { 2 * n })
            }
            _ => None,
        }
    }
}

/// Convert an engine score to signed centipawns from `perspective`'s side.
///
/// Mates become `±(MATE_SCORE - N)` so a quicker mate scores higher; `mate 0`
/// means the reporting side has been mated. A missing score stays `None`
/// regardless of perspective.
pub fn to_signed_centipawns(score: &EngineScore, perspective: Color) -> Option<i32> {
    let own = match score.score {
        Score::Cp(cp) => cp.clamp(-MAX_CP, MAX_CP),
        Score::Mate(n) => {
            let n = n.clamp(-MAX_MATE_DISTANCE, MAX_MATE_DISTANCE);
            if n > 0 {
                MATE_SCORE - n
            } else {
                -MATE_SCORE - n
            }
        }
        Score::Missing => return None,
    };

    Some(if score.pov == perspective { own } else { -own })
}

fn serialize_color<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(match color {
        Color::White => "white",
        Color::Black => "black",
    })
}
