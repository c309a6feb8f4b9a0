//! Surface bands and their display colors.

/// 8-bit-per-channel RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Channels in `[r, g, b, a]` order, as stored in vertex data.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Surface band, ordered from wettest to driest.
///
/// The derived `Ord` follows declaration order, so `DeepWater < Rock`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Biome {
    DeepWater,
    ShallowWater,
    Soil,
    DarkSoil,
    Rock,
}

impl Biome {
    /// Every band, wettest first.
    pub const ALL: [Biome; 5] = [
        Biome::DeepWater,
        Biome::ShallowWater,
        Biome::Soil,
        Biome::DarkSoil,
        Biome::Rock,
    ];

    /// Display color for this band.
    pub const fn color(self) -> Rgba8 {
        match self {
            Biome::DeepWater => Rgba8::rgb(0, 82, 172),
            Biome::ShallowWater => Rgba8::rgb(102, 191, 255),
            Biome::Soil => Rgba8::rgb(127, 106, 79),
            Biome::DarkSoil => Rgba8::rgb(76, 63, 47),
            Biome::Rock => Rgba8::rgb(80, 80, 80),
        }
    }
}
