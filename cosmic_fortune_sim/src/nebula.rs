// Nebula generation.
//
// Re-seeds from the same coordinate key as the resolver and star systems and
// draws: existence (one-in-20), overall size, type, overall tint; then, at
// full detail, a cloud count and per-cloud tint, position and ellipse size.
// Clouds are pure description for renderers; they carry no further state.
//
// Each `NebulaType` has a fixed pair of tints. Every tint pick is a `[0, 2)`
// draw where 1 selects the first tint of the pair.

use crate::context::GenContext;
use crate::galaxy::Detail;
use crate::types::{Rgba, SectorCoord, WebColor};
use serde::{Deserialize, Serialize};

const NEBULA_SIZE: (f64, f64) = (100.0, 400.0);
const CLOUD_COUNT: (i32, i32) = (75, 150);
const CLOUD_OFFSET_MAX: i32 = 180;
const CLOUD_EXTENT: (i32, i32) = (20, 40);
const CLOUD_ALPHA: u8 = 180;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NebulaType {
    Reflection,
    Dark,
    Supernova,
    Emission,
    Planetary,
}

impl NebulaType {
    /// Draw order index → type. Index order is fixed; saved galaxies depend on it.
    pub const ALL: [NebulaType; 5] = [
        NebulaType::Reflection,
        NebulaType::Dark,
        NebulaType::Supernova,
        NebulaType::Emission,
        NebulaType::Planetary,
    ];

    /// The (first, second) tint pair clouds of this type pick from.
    pub const fn tints(self) -> (WebColor, WebColor) {
        match self {
            NebulaType::Reflection => (WebColor::Blue, WebColor::Cyan),
            NebulaType::Dark => (WebColor::DarkViolet, WebColor::Red),
            NebulaType::Supernova => (WebColor::Cyan, WebColor::Yellow),
            NebulaType::Emission => (WebColor::Red, WebColor::Orange),
            NebulaType::Planetary => (WebColor::LightCoral, WebColor::DarkBlue),
        }
    }
}

/// One translucent ellipse in a nebula, positioned in a local
/// `CLOUD_OFFSET_MAX`-square box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub color: Rgba,
    pub offset: (i32, i32),
    pub size: (i32, i32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Nebula {
    pub coord: SectorCoord,
    pub exists: bool,
    /// Fields below are meaningful only when `exists`.
    pub size: f64,
    pub kind: NebulaType,
    pub overall_color: WebColor,
    /// Empty at summary detail.
    pub clouds: Vec<Cloud>,
}

impl Nebula {
    pub fn generate(ctx: &GenContext, coord: SectorCoord, detail: Detail) -> Self {
        let mut rng = ctx.rng_at(coord);
        let mut nebula = Self {
            coord,
            exists: rng.one_in(20),
            size: 0.0,
            kind: NebulaType::Reflection,
            overall_color: NebulaType::Reflection.tints().0,
            clouds: Vec::new(),
        };
        if !nebula.exists {
            return nebula;
        }

        nebula.size = rng.range_f64(NEBULA_SIZE.0, NEBULA_SIZE.1);
        nebula.kind = NebulaType::ALL[rng.range_usize(NebulaType::ALL.len())];
        let (first, second) = nebula.kind.tints();
        nebula.overall_color = if rng.one_in(2) { first } else { second };

        if detail == Detail::Summary {
            return nebula;
        }

        let count = rng.range_i32(CLOUD_COUNT.0, CLOUD_COUNT.1);
        nebula.clouds = (0..count)
            .map(|_| {
                let tint = if rng.one_in(2) { first } else { second };
                let offset = (
                    rng.range_i32(0, CLOUD_OFFSET_MAX),
                    rng.range_i32(0, CLOUD_OFFSET_MAX),
                );
                let size = (
                    rng.range_i32(CLOUD_EXTENT.0, CLOUD_EXTENT.1),
                    rng.range_i32(CLOUD_EXTENT.0, CLOUD_EXTENT.1),
                );
                Cloud {
                    color: tint.rgb().with_alpha(CLOUD_ALPHA),
                    offset,
                    size,
                }
            })
            .collect();
        nebula
    }
}
