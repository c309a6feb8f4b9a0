//! Biome classification: maps a displacement height to a surface band and color.
//!
//! A [`BiomeLadder`] is an ordered table of height thresholds. Higher
//! displacement never maps to a wetter band than lower displacement.

mod band;
mod ladder;

pub use band::{Biome, Rgba8};
pub use ladder::{BiomeLadder, Classifier, LadderError};
