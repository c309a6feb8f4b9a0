//! Terrain fields: fractal noise, displacement sources, and biome classification.

mod displacement;
mod noise;

pub mod biome;

pub use biome::{Biome, BiomeLadder, Classifier, LadderError, Rgba8};
pub use displacement::{DisplacementSource, FbmDisplacement, HeightRange, remap};
pub use noise::{FbmNoise, NoiseParameters, sample};
