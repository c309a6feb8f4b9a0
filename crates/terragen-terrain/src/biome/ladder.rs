//! Threshold ladder: an ordered `(threshold, band)` table with a fallback.

use super::{Biome, Rgba8};

/// Errors produced when a ladder table is malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LadderError {
    /// A threshold is NaN or infinite.
    #[error("threshold {0} is not finite")]
    NonFiniteThreshold(f32),

    /// Two rungs share the same threshold.
    #[error("threshold {0} appears more than once")]
    DuplicateThreshold(f32),

    /// A higher threshold maps to a wetter band than a lower one.
    #[error("band {higher:?} above threshold {threshold} is wetter than {lower:?} below it")]
    NotMonotonic {
        threshold: f32,
        lower: Biome,
        higher: Biome,
    },

    /// The fallback band is drier than the lowest rung.
    #[error("fallback {fallback:?} is drier than lowest band {lowest:?}")]
    FallbackTooDry { fallback: Biome, lowest: Biome },
}

/// Maps a height to a color.
pub trait Classifier {
    /// Color for displacement `height`. Must be total: every input, NaN included, yields a color.
    fn color(&self, height: f32) -> Rgba8;
}

impl<F> Classifier for F
where
    F: Fn(f32) -> Rgba8,
{
    fn color(&self, height: f32) -> Rgba8 {
        self(height)
    }
}

/// Sorted height thresholds mapped to bands.
///
/// [`classify`](Self::classify) returns the band of the highest threshold
/// strictly below the height, or the fallback when none is.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeLadder {
    /// Rungs sorted by descending threshold.
    rungs: Vec<(f32, Biome)>,
    fallback: Biome,
}

impl BiomeLadder {
    /// Validate and build a ladder. `rungs` may be given in any order.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError`] if a threshold is not finite, a threshold is
    /// repeated, bands get wetter as thresholds rise, or the fallback is drier
    /// than the lowest rung.
    pub fn new(mut rungs: Vec<(f32, Biome)>, fallback: Biome) -> Result<Self, LadderError> {
        if let Some(&(t, _)) = rungs.iter().find(|(t, _)| !t.is_finite()) {
            return Err(LadderError::NonFiniteThreshold(t));
        }

        rungs.sort_by(|a, b| b.0.total_cmp(&a.0));

        for pair in rungs.windows(2) {
            let (upper_t, upper) = pair[0];
            let (lower_t, lower) = pair[1];
            if upper_t == lower_t {
                return Err(LadderError::DuplicateThreshold(upper_t));
            }
            if upper < lower {
                return Err(LadderError::NotMonotonic {
                    threshold: upper_t,
                    lower,
                    higher: upper,
                });
            }
        }

        if let Some(&(_, lowest)) = rungs.last()
            && fallback > lowest
        {
            return Err(LadderError::FallbackTooDry { fallback, lowest });
        }

        Ok(Self { rungs, fallback })
    }

    /// Ladder for raw signed noise in roughly `[-1, 1]`.
    pub fn signed() -> Self {
        Self {
            rungs: vec![
                (0.45, Biome::Rock),
                (0.25, Biome::DarkSoil),
                (0.0, Biome::Soil),
                (-0.2, Biome::ShallowWater),
            ],
            fallback: Biome::DeepWater,
        }
    }

    /// Band for `height`. NaN falls through to the fallback.
    pub fn classify(&self, height: f32) -> Biome {
        self.rungs
            .iter()
            .find(|(threshold, _)| height > *threshold)
            .map_or(self.fallback, |&(_, biome)| biome)
    }

    /// Rungs, highest threshold first.
    pub fn rungs(&self) -> &[(f32, Biome)] {
        &self.rungs
    }

    /// Band returned when no threshold is exceeded.
    pub fn fallback(&self) -> Biome {
        self.fallback
    }
}

impl Default for BiomeLadder {
    /// Ladder for heights remapped into `[0, 0.5]`.
    fn default() -> Self {
        Self {
            rungs: vec![
                (0.4, Biome::Rock),
                (0.3, Biome::DarkSoil),
                (0.2, Biome::Soil),
                (0.1, Biome::ShallowWater),
            ],
            fallback: Biome::DeepWater,
        }
    }
}

impl Classifier for BiomeLadder {
    fn color(&self, height: f32) -> Rgba8 {
        self.classify(height).color()
    }
}
