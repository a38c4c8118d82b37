// Coordinate resolver and the galactic body model.
//
// `body_at()` answers "is there anything in this sector, and what kind?" with
// two draws from a PRNG seeded by the sector's coordinate key: a one-in-20
// existence roll, then a `[0, 500)` classification roll (0 → black hole,
// 1..=15 → nebula, everything else → star system). The thresholds are fixed:
// changing them moves every body in every saved galaxy.
//
// `GalacticBody` is the closed set of things a sector can hold. Hosts
// pattern-match on it; there is no runtime type inspection anywhere.
// `GalacticBody::at()` resolves a sector and then runs the matching
// generator at the requested detail. The generators re-seed from the same
// key and repeat the existence roll, so they agree with the resolver without
// sharing a PRNG instance.
//
// `survey()` resolves a rectangular window of sectors. Each sector owns an
// independent PRNG, so the window is evaluated in parallel with rayon; the
// result is collected in row-major order and is identical to a serial scan.
//
// See also: `star_system.rs`, `nebula.rs`, `context.rs`.

use crate::context::GenContext;
use crate::nebula::Nebula;
use crate::star_system::StarSystem;
use crate::types::SectorCoord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One sector in `OCCUPANCY_ODDS` holds a body.
const OCCUPANCY_ODDS: i32 = 20;
/// Classification roll range.
const CLASSIFY_RANGE: i32 = 500;
/// Classification rolls in `1..=NEBULA_MAX_ROLL` are nebulae; 0 is a black hole.
const NEBULA_MAX_ROLL: i32 = 15;

/// How much of a body to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Detail {
    /// Existence, size and color only: enough to draw the galaxy view.
    Summary,
    /// Everything, including planets or clouds. Used on selection.
    Full,
}

/// What kind of body occupies a sector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    BlackHole,
    Nebula,
    StarSystem,
}

impl BodyKind {
    /// One-character map glyph, used by text hosts.
    pub const fn glyph(self) -> char {
        match self {
            BodyKind::BlackHole => '@',
            BodyKind::Nebula => '~',
            BodyKind::StarSystem => '*',
        }
    }
}

/// A black hole. Terminal: nothing further is generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackHole {
    pub coord: SectorCoord,
}

/// The contents of one sector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GalacticBody {
    Absent,
    BlackHole(BlackHole),
    Nebula(Nebula),
    StarSystem(StarSystem),
}

impl GalacticBody {
    /// Resolve `coord` and generate whatever lives there.
    pub fn at(ctx: &GenContext, coord: SectorCoord, detail: Detail) -> Self {
        match body_at(ctx, coord) {
            None => GalacticBody::Absent,
            Some(BodyKind::BlackHole) => GalacticBody::BlackHole(BlackHole { coord }),
            Some(BodyKind::Nebula) => GalacticBody::Nebula(Nebula::generate(ctx, coord, detail)),
            Some(BodyKind::StarSystem) => {
                GalacticBody::StarSystem(StarSystem::generate(ctx, coord, detail))
            }
        }
    }

    pub fn kind(&self) -> Option<BodyKind> {
        match self {
            GalacticBody::Absent => None,
            GalacticBody::BlackHole(_) => Some(BodyKind::BlackHole),
            GalacticBody::Nebula(_) => Some(BodyKind::Nebula),
            GalacticBody::StarSystem(_) => Some(BodyKind::StarSystem),
        }
    }

    pub fn coord(&self) -> Option<SectorCoord> {
        match self {
            GalacticBody::Absent => None,
            GalacticBody::BlackHole(b) => Some(b.coord),
            GalacticBody::Nebula(n) => Some(n.coord),
            GalacticBody::StarSystem(s) => Some(s.coord),
        }
    }
}

/// Resolve a sector: `None` for empty space, otherwise the body's kind.
pub fn body_at(ctx: &GenContext, coord: SectorCoord) -> Option<BodyKind> {
    let mut rng = ctx.rng_at(coord);
    if !rng.one_in(OCCUPANCY_ODDS) {
        return None;
    }
    Some(match rng.range_i32(0, CLASSIFY_RANGE) {
        0 => BodyKind::BlackHole,
        1..=NEBULA_MAX_ROLL => BodyKind::Nebula,
        _ => BodyKind::StarSystem,
    })
}

/// An occupied sector found by `survey()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyEntry {
    pub coord: SectorCoord,
    pub kind: BodyKind,
}

/// Resolve every sector in the `width × height` window whose top-left corner
/// is `origin`, returning only occupied sectors in row-major order.
/// Coordinates wrap at `u32::MAX`.
pub fn survey(ctx: &GenContext, origin: SectorCoord, width: u32, height: u32) -> Vec<SurveyEntry> {
    (0..height)
        .into_par_iter()
        .flat_map_iter(|dy| {
            (0..width).filter_map(move |dx| {
                let coord = origin.wrapping_offset(dx, dy);
                body_at(ctx, coord).map(|kind| SurveyEntry { coord, kind })
            })
        })
        .collect()
}
