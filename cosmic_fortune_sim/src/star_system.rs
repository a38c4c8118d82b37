// Star system and planet generation.
//
// `StarSystem::generate()` re-seeds a PRNG from the system's coordinate key
// (the same key the resolver uses) and draws, in this fixed order:
//
//   1. existence         one-in-20
//   2. star diameter     [10, 40)
//   3. star color        index into STAR_PALETTE
//   -- summary detail stops here --
//   4. first orbit       [40, 180)
//   5. planet count      [0, 12)
//   6. per planet: temperature jitter, orbital step, diameter, foliage
//      factor, mineral draw (only when temperature >= 0), gas factor,
//      population base, population sign, ring, moon count, moon sizes.
//
// Summary generation (galaxy view) and full generation (on selection) share
// steps 1-3, so both agree on whether and what star exists without sharing
// an instance. Planets are stored in generation order; the index into
// `planets` is the stable selection index hosts use.
//
// Population is always zero. The draws that would have produced it are still
// consumed so every later draw lands where saved galaxies expect it.
//
// See also: `galaxy.rs` for the resolver that decides a star system lives at
// a coordinate, `terrain.rs` for what happens when a planet is landed on.
//
// **Critical constraint: determinism.** Do not reorder, add, or skip draws.

use crate::context::GenContext;
use crate::galaxy::Detail;
use crate::prng::GalaxyRng;
use crate::types::{Rgb, STAR_PALETTE, SectorCoord, WebColor};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

const STAR_DIAMETER: (f64, f64) = (10.0, 40.0);
const FIRST_ORBIT: (f64, f64) = (40.0, 180.0);
const MAX_PLANETS: i32 = 12;
const ORBIT_STEP: (f64, f64) = (30.0, 200.0);
const PLANET_DIAMETER: (f64, f64) = (4.0, 20.0);
const TEMPERATURE_JITTER: (f64, f64) = (0.0, 20.0);
const MIN_BASE_TEMPERATURE: f64 = -200.0;
const FOLIAGE_FACTOR: (f64, f64) = (0.6, 1.5);
const GAS_FACTOR: (f64, f64) = (0.5, 1.2);
const COLD_MINERALS: f64 = 0.15;
const POPULATION_MAX: f64 = 100_000_000.0;
const RING_ODDS: i32 = 8;
const MOON_COUNT: (i32, i32) = (-5, 5);
const MOON_SHRINK: (f64, f64) = (1.0, 15.0);

/// A generated planet. Every field is a pure function of the parent system's
/// coordinate, the galaxy seed, and the planet's position in the system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Distance from the star, accumulated across orbits.
    pub distance: f64,
    pub diameter: f64,
    /// Ambient temperature (°F). Falls with distance, rises with star size.
    pub temperature: f64,
    pub water: f64,
    pub foliage: f64,
    pub minerals: f64,
    pub gases: f64,
    /// Always 0.0; see the module docs.
    pub population: f64,
    pub has_ring: bool,
    /// Moon diameters, at most four.
    pub moons: SmallVec<[f64; 4]>,
    pub color: Rgb,
    /// Absolute placement: the system coordinate offset by the truncated
    /// distance on both axes. Keys the planet's terrain.
    pub coord: SectorCoord,
}

impl Planet {
    /// Seed of this planet's terrain PRNG and the key of its save file.
    pub fn terrain_seed(&self) -> u32 {
        self.coord.key()
    }

    /// Side length of the terrain grid: the diameter, truncated.
    pub fn grid_diameter(&self) -> usize {
        self.diameter as usize
    }
}

/// A star and (at full detail) its planets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub coord: SectorCoord,
    pub exists: bool,
    /// 0.0 when the star does not exist.
    pub star_diameter: f64,
    /// `White` when the star does not exist.
    pub star_color: WebColor,
    /// Empty at summary detail.
    pub planets: Vec<Planet>,
}

impl StarSystem {
    pub fn generate(ctx: &GenContext, coord: SectorCoord, detail: Detail) -> Self {
        let mut rng = ctx.rng_at(coord);
        let mut system = Self {
            coord,
            exists: rng.one_in(20),
            star_diameter: 0.0,
            star_color: WebColor::White,
            planets: Vec::new(),
        };
        if !system.exists {
            return system;
        }

        system.star_diameter = rng.range_f64(STAR_DIAMETER.0, STAR_DIAMETER.1);
        system.star_color = STAR_PALETTE[rng.range_usize(STAR_PALETTE.len())];

        if detail == Detail::Full {
            system.planets = generate_planets(&mut rng, coord, system.star_diameter);
        }
        system
    }

    pub fn planet(&self, index: usize) -> Option<&Planet> {
        self.planets.get(index)
    }
}

fn generate_planets(rng: &mut GalaxyRng, coord: SectorCoord, star_diameter: f64) -> Vec<Planet> {
    let mut distance = rng.range_f64(FIRST_ORBIT.0, FIRST_ORBIT.1);
    let count = rng.range_i32(0, MAX_PLANETS);
    let mut planets = Vec::with_capacity(count as usize);

    for _ in 0..count {
        // Temperature uses the distance *before* this orbit's step.
        let temperature = (star_diameter * 20.0 - distance * 1.5).max(MIN_BASE_TEMPERATURE)
            - rng.range_f64(TEMPERATURE_JITTER.0, TEMPERATURE_JITTER.1);
        distance += rng.range_f64(ORBIT_STEP.0, ORBIT_STEP.1);
        let diameter = rng.range_f64(PLANET_DIAMETER.0, PLANET_DIAMETER.1);

        let water = if temperature >= -100.0 {
            ((temperature + 100.0) / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let foliage = (rng.range_f64(FOLIAGE_FACTOR.0, FOLIAGE_FACTOR.1) * water).min(1.0);
        // The mineral draw only happens on temperate-or-warmer planets.
        let minerals = if temperature >= 0.0 {
            let hot_bonus = if temperature < 50.0 { 0.0 } else { 0.4 };
            (rng.range_f64(0.0, 1.0) * 0.5 + 0.3 + hot_bonus).clamp(0.0, 1.0)
        } else {
            COLD_MINERALS
        };
        let gases = (rng.range_f64(GAS_FACTOR.0, GAS_FACTOR.1) * minerals).min(1.0);

        let _population_base = rng.range_f64(0.0, POPULATION_MAX);
        let _population_sign = rng.range_i32(-999, 2);
        let population = 0.0;

        let has_ring = rng.one_in(RING_ODDS);

        let color = Rgb::new(
            (gases * 190.0) as u8,
            (foliage * 200.0) as u8,
            (water * 240.0) as u8,
        );

        let moon_count = rng.range_i32(MOON_COUNT.0, MOON_COUNT.1).max(0);
        let moons = (0..moon_count)
            .map(|_| (diameter - rng.range_f64(MOON_SHRINK.0, MOON_SHRINK.1)).max(1.0))
            .collect();

        let offset = distance as u32;
        planets.push(Planet {
            distance,
            diameter,
            temperature,
            water,
            foliage,
            minerals,
            gases,
            population,
            has_ring,
            moons,
            color,
            coord: coord.wrapping_offset(offset, offset),
        });
    }
    planets
}
