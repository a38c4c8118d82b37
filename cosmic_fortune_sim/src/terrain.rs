// Planet terrain grid and the harvest mutation layer.
//
// `ChunkGrid::generate()` builds a dense `diameter × diameter` grid (row-major,
// index = y * diameter + x) from a PRNG seeded by the planet's *absolute*
// coordinate, so two planets under the same star never share a terrain
// stream. Per chunk it draws, in order: tile index, water, foliage, minerals,
// gases. Each resource is a `[0.1, 0.6)` fraction of the planet's aggregate
// attribute.
//
// The grid is an arena (`chunks`) plus a sparse overlay (`ModificationSet`)
// of every chunk that has been written since generation. Reads consult the
// overlay first; writes update the arena and upsert the overlay. The overlay
// is the only part of a planet ever persisted (see `save.rs`); the arena is
// regenerated from seed on every landing.
//
// Every harvested chunk is recorded, even if a later harvest could never
// bring it back to baseline: the overlay is "touched", not "differs".
//
// ## Tile state machine
//
//   0      blank      inert
//   1..=5  vegetated  → depleted when water AND foliage < threshold
//   6      depleted   → barren   when minerals AND gases < threshold
//   7      barren     terminal
//
// At most one transition happens per harvest. Transitions only move down
// the list, so a chunk never regains vegetation.
//
// See also: `star_system.rs` for the `Planet` attributes this reads,
// `config.rs` for `TerrainConfig`, `explorer.rs` which owns the grid of the
// planet currently landed on.

use crate::config::TerrainConfig;
use crate::context::GenContext;
use crate::error::GridError;
use crate::star_system::Planet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const RESOURCE_FRACTION: (f64, f64) = (0.1, 0.6);

pub const TILE_BLANK: u8 = 0;
pub const TILE_DEPLETED: u8 = 6;
pub const TILE_BARREN: u8 = 7;
/// Highest valid tile index.
pub const TILE_MAX: u8 = TILE_BARREN;

const VEGETATED_TILES: (i32, i32) = (1, 6);
const ROCKY_TILES: (i32, i32) = (5, 8);
const MIXED_TILES: (i32, i32) = (1, 8);

/// Coarse classification of a tile index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileClass {
    Blank,
    Vegetated,
    Depleted,
    Barren,
}

impl TileClass {
    /// `None` for indices above `TILE_MAX`.
    pub fn of(tile: u8) -> Option<Self> {
        match tile {
            TILE_BLANK => Some(TileClass::Blank),
            1..=5 => Some(TileClass::Vegetated),
            TILE_DEPLETED => Some(TileClass::Depleted),
            TILE_BARREN => Some(TileClass::Barren),
            _ => None,
        }
    }
}

/// One cell of a planet's terrain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetChunk {
    pub tile: u8,
    pub water: f64,
    pub foliage: f64,
    pub minerals: f64,
    pub gases: f64,
    /// Sum of the four quantities, kept in step by every write.
    pub total: f64,
}

impl PlanetChunk {
    pub fn new(tile: u8, water: f64, foliage: f64, minerals: f64, gases: f64) -> Self {
        Self {
            tile,
            water,
            foliage,
            minerals,
            gases,
            total: water + foliage + minerals + gases,
        }
    }

    pub fn class(&self) -> Option<TileClass> {
        TileClass::of(self.tile)
    }

    fn refresh_total(&mut self) {
        self.total = self.water + self.foliage + self.minerals + self.gases;
    }

    /// Advance the tile state machine by at most one step.
    fn advance_tile(&mut self, threshold: f64) {
        match self.class() {
            Some(TileClass::Vegetated) if self.water < threshold && self.foliage < threshold => {
                self.tile = TILE_DEPLETED;
            }
            Some(TileClass::Depleted) if self.minerals < threshold && self.gases < threshold => {
                self.tile = TILE_BARREN;
            }
            _ => {}
        }
    }
}

/// Resources removed by one harvest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDelta {
    pub water: f64,
    pub foliage: f64,
    pub minerals: f64,
    pub gases: f64,
}

impl ResourceDelta {
    pub fn total(&self) -> f64 {
        self.water + self.foliage + self.minerals + self.gases
    }
}

/// Sparse overlay of chunks written since generation, keyed by chunk index.
/// Ordered so saves are byte-stable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModificationSet {
    entries: BTreeMap<usize, PlanetChunk>,
}

impl ModificationSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlanetChunk> {
        self.entries.get(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &PlanetChunk)> {
        self.entries.iter().map(|(&i, c)| (i, c))
    }

    fn upsert(&mut self, index: usize, chunk: PlanetChunk) {
        self.entries.insert(index, chunk);
    }
}

/// Dense terrain grid with its modification overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkGrid {
    diameter: usize,
    terrain_seed: u32,
    chunks: Vec<PlanetChunk>,
    modifications: ModificationSet,
}

impl ChunkGrid {
    /// Generate the baseline terrain for `planet`.
    pub fn generate(ctx: &GenContext, planet: &Planet, config: &TerrainConfig) -> Self {
        let diameter = planet.grid_diameter();
        let mut rng = ctx.rng_at(planet.coord);
        let (tile_low, tile_high) = tile_range(planet, config.dominance_threshold);

        let chunks = (0..diameter * diameter)
            .map(|_| {
                let tile = rng.range_i32(tile_low, tile_high) as u8;
                let mut share =
                    |attribute: f64| rng.range_f64(RESOURCE_FRACTION.0, RESOURCE_FRACTION.1) * attribute;
                let water = share(planet.water);
                let foliage = share(planet.foliage);
                let minerals = share(planet.minerals);
                let gases = share(planet.gases);
                PlanetChunk::new(tile, water, foliage, minerals, gases)
            })
            .collect();

        tracing::debug!(
            terrain_seed = planet.terrain_seed(),
            diameter,
            "generated planet terrain"
        );
        Self {
            diameter,
            terrain_seed: planet.terrain_seed(),
            chunks,
            modifications: ModificationSet::default(),
        }
    }

    pub fn diameter(&self) -> usize {
        self.diameter
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Key of the planet this grid belongs to (and of its save file).
    pub fn terrain_seed(&self) -> u32 {
        self.terrain_seed
    }

    pub fn modifications(&self) -> &ModificationSet {
        &self.modifications
    }

    /// Row-major index of `(x, y)`, or `None` outside the grid.
    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.diameter && y < self.diameter).then_some(y * self.diameter + x)
    }

    fn check(&self, index: usize) -> Result<(), GridError> {
        if index < self.chunks.len() {
            Ok(())
        } else {
            Err(GridError::IndexOutOfRange {
                index,
                len: self.chunks.len(),
            })
        }
    }

    pub fn get(&self, index: usize) -> Result<&PlanetChunk, GridError> {
        self.check(index)?;
        Ok(self
            .modifications
            .get(index)
            .unwrap_or(&self.chunks[index]))
    }

    /// All chunks in row-major order, overlay applied.
    pub fn chunks(&self) -> impl Iterator<Item = &PlanetChunk> {
        // The arena is kept in step with the overlay on every write.
        self.chunks.iter()
    }

    fn write(&mut self, index: usize, chunk: PlanetChunk) {
        self.chunks[index] = chunk;
        self.modifications.upsert(index, chunk);
    }

    /// Remove `harvest_fraction` of each resource at `index`, advance the
    /// tile, record the chunk, and return what was removed.
    ///
    /// Quantities that fall below `depletion_floor` are zeroed; the dust is
    /// discarded rather than returned, so each successive delta is no larger
    /// than the one before.
    pub fn harvest(&mut self, index: usize, config: &TerrainConfig) -> Result<ResourceDelta, GridError> {
        let mut chunk = *self.get(index)?;
        let fraction = config.harvest_fraction.clamp(0.0, 1.0);
        let floor = config.depletion_floor;

        let delta = ResourceDelta {
            water: take(&mut chunk.water, fraction, floor),
            foliage: take(&mut chunk.foliage, fraction, floor),
            minerals: take(&mut chunk.minerals, fraction, floor),
            gases: take(&mut chunk.gases, fraction, floor),
        };
        chunk.refresh_total();
        chunk.advance_tile(config.depletion_threshold);

        self.write(index, chunk);
        Ok(delta)
    }

    /// Overwrite cells from saved records. Every index is validated before
    /// any cell is written, so a bad record leaves the grid untouched.
    pub fn apply_records(&mut self, records: &[(usize, PlanetChunk)]) -> Result<(), GridError> {
        for &(index, _) in records {
            self.check(index)?;
        }
        for &(index, chunk) in records {
            self.write(index, chunk);
        }
        Ok(())
    }
}

fn tile_range(planet: &Planet, dominance: f64) -> (i32, i32) {
    if planet.foliage >= dominance && planet.foliage >= planet.minerals {
        VEGETATED_TILES
    } else if planet.minerals >= dominance && planet.minerals > planet.foliage {
        ROCKY_TILES
    } else {
        MIXED_TILES
    }
}

/// Remove `fraction` of `amount`, zeroing any remainder below `floor`.
fn take(amount: &mut f64, fraction: f64, floor: f64) -> f64 {
    let removed = *amount * fraction;
    *amount -= removed;
    if *amount < floor {
        *amount = 0.0;
    }
    removed
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{Rgb, SectorCoord};
    use smallvec::SmallVec;

    /// A hand-built planet so terrain tests don't depend on which systems
    /// happen to exist near the origin.
    pub(crate) fn test_planet(diameter: f64, water: f64, foliage: f64, minerals: f64, gases: f64) -> Planet {
        Planet {
            distance: 120.0,
            diameter,
            temperature: 40.0,
            water,
            foliage,
            minerals,
            gases,
            population: 0.0,
            has_ring: false,
            moons: SmallVec::new(),
            color: Rgb::new(0, 0, 0),
            coord: SectorCoord::new(129, 120),
        }
    }

    fn ctx() -> GenContext {
        GenContext::new(44)
    }

    #[test]
    fn diameter_ten_has_one_hundred_chunks() {
        let planet = test_planet(10.7, 0.8, 0.7, 0.5, 0.4);
        let grid = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        assert_eq!(grid.diameter(), 10);
        assert_eq!(grid.len(), 100);
        assert!(grid.modifications().is_empty());
    }

    #[test]
    fn generation_is_deterministic() {
        let planet = test_planet(12.0, 0.6, 0.3, 0.9, 0.5);
        let a = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        let b = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        assert_eq!(a, b);
    }

    #[test]
    fn terrain_keyed_by_absolute_coordinate() {
        let a = test_planet(8.0, 0.6, 0.6, 0.6, 0.6);
        let mut b = a.clone();
        b.coord = SectorCoord::new(300, 291);
        let ga = ChunkGrid::generate(&ctx(), &a, &TerrainConfig::default());
        let gb = ChunkGrid::generate(&ctx(), &b, &TerrainConfig::default());
        assert_ne!(ga.chunks().collect::<Vec<_>>(), gb.chunks().collect::<Vec<_>>());
        assert_eq!(ga.terrain_seed(), a.coord.key());
    }

    /// Leading chunks of the first planet at (210, 0), seed 44. Pins the
    /// per-chunk draw order: tile, water, foliage, minerals, gases.
    #[test]
    fn known_terrain_seed_44() {
        use crate::galaxy::Detail;
        use crate::star_system::StarSystem;

        let system = StarSystem::generate(&ctx(), SectorCoord::new(210, 0), Detail::Full);
        let planet = system.planet(0).unwrap();
        let grid = ChunkGrid::generate(&ctx(), planet, &TerrainConfig::default());
        assert_eq!(grid.diameter(), 16);
        assert_eq!(grid.terrain_seed(), SectorCoord::new(540, 330).key());

        let expected = [
            (
                5,
                0.3098327773180401,
                0.38204629394561607,
                0.40502745996030964,
                0.2899412511770839,
            ),
            (
                2,
                0.5162656597132482,
                0.15994764169296385,
                0.261482935503729,
                0.13185009514854262,
            ),
            (
                4,
                0.39106262787037127,
                0.23895816018576904,
                0.13855269063485073,
                0.2279679720896044,
            ),
        ];
        for (chunk, &(tile, water, foliage, minerals, gases)) in grid.chunks().zip(&expected) {
            assert_eq!(chunk.tile, tile);
            for (actual, pinned) in [
                (chunk.water, water),
                (chunk.foliage, foliage),
                (chunk.minerals, minerals),
                (chunk.gases, gases),
            ] {
                assert!((actual - pinned).abs() < 1e-9, "expected {pinned}, got {actual}");
            }
        }
    }

    #[test]
    fn resources_are_fractions_of_planet_attributes() {
        let planet = test_planet(9.0, 0.8, 0.4, 0.6, 0.2);
        let grid = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        for chunk in grid.chunks() {
            for (value, attribute) in [
                (chunk.water, planet.water),
                (chunk.foliage, planet.foliage),
                (chunk.minerals, planet.minerals),
                (chunk.gases, planet.gases),
            ] {
                assert!(value >= 0.1 * attribute && value <= 0.6 * attribute);
            }
            let sum = chunk.water + chunk.foliage + chunk.minerals + chunk.gases;
            assert_eq!(chunk.total, sum);
        }
    }

    #[test]
    fn foliage_dominant_planet_is_vegetated() {
        let planet = test_planet(10.0, 0.9, 0.9, 0.3, 0.2);
        let grid = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        assert!(grid.chunks().all(|c| c.class() == Some(TileClass::Vegetated)));
    }

    #[test]
    fn mineral_dominant_planet_is_rocky() {
        let planet = test_planet(10.0, 0.2, 0.1, 0.9, 0.6);
        let grid = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        assert!(grid.chunks().all(|c| (5..=7).contains(&c.tile)));
        assert!(grid.chunks().any(|c| c.tile == TILE_BARREN));
    }

    #[test]
    fn mixed_planet_uses_full_range() {
        let planet = test_planet(15.0, 0.3, 0.2, 0.3, 0.2);
        let grid = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        assert!(grid.chunks().all(|c| (1..=7).contains(&c.tile)));
    }

    #[test]
    fn harvest_twice_non_increasing() {
        let planet = test_planet(10.0, 0.8, 0.7, 0.5, 0.4);
        let config = TerrainConfig::default();
        let mut grid = ChunkGrid::generate(&ctx(), &planet, &config);
        let first = grid.harvest(55, &config).unwrap();
        let second = grid.harvest(55, &config).unwrap();
        for (a, b) in [
            (first.water, second.water),
            (first.foliage, second.foliage),
            (first.minerals, second.minerals),
            (first.gases, second.gases),
        ] {
            assert!(a >= 0.0 && b >= 0.0);
            assert!(b <= a);
        }
        assert!(second.total() <= first.total());
        assert_eq!(grid.modifications().len(), 1);
    }

    #[test]
    fn harvest_removes_ten_percent() {
        let planet = test_planet(6.0, 0.8, 0.7, 0.5, 0.4);
        let config = TerrainConfig::default();
        let mut grid = ChunkGrid::generate(&ctx(), &planet, &config);
        let before = *grid.get(7).unwrap();
        let delta = grid.harvest(7, &config).unwrap();
        let after = *grid.get(7).unwrap();
        assert_eq!(delta.water, before.water * 0.1);
        assert_eq!(after.water, before.water - before.water * 0.1);
        assert_eq!(after.total, after.water + after.foliage + after.minerals + after.gases);
    }

    #[test]
    fn repeated_harvest_reaches_zero() {
        let planet = test_planet(5.0, 1.0, 1.0, 1.0, 1.0);
        let config = TerrainConfig::default();
        let mut grid = ChunkGrid::generate(&ctx(), &planet, &config);
        let mut previous = f64::INFINITY;
        for _ in 0..400 {
            let delta = grid.harvest(3, &config).unwrap();
            assert!(delta.total() >= 0.0);
            assert!(delta.total() <= previous);
            previous = delta.total();
        }
        let chunk = grid.get(3).unwrap();
        assert_eq!(chunk.total, 0.0);
        assert_eq!(chunk.tile, TILE_BARREN);
    }

    #[test]
    fn tile_transitions_are_monotonic() {
        let planet = test_planet(10.0, 0.9, 0.9, 0.3, 0.2);
        let config = TerrainConfig::default();
        let mut grid = ChunkGrid::generate(&ctx(), &planet, &config);
        let mut saw_depleted = false;
        let mut saw_barren = false;
        for _ in 0..100 {
            grid.harvest(42, &config).unwrap();
            match grid.get(42).unwrap().class() {
                Some(TileClass::Vegetated) => {
                    assert!(!saw_depleted && !saw_barren, "vegetation came back");
                }
                Some(TileClass::Depleted) => {
                    assert!(!saw_barren, "barren tile changed");
                    saw_depleted = true;
                }
                Some(TileClass::Barren) => saw_barren = true,
                other => panic!("unexpected tile class {other:?}"),
            }
        }
        assert!(saw_depleted && saw_barren);
    }

    #[test]
    fn barren_is_terminal() {
        let mut chunk = PlanetChunk::new(TILE_BARREN, 0.0, 0.0, 0.0, 0.0);
        chunk.advance_tile(0.25);
        assert_eq!(chunk.tile, TILE_BARREN);
    }

    #[test]
    fn vegetated_needs_both_water_and_foliage_low() {
        let mut chunk = PlanetChunk::new(3, 0.1, 0.3, 0.0, 0.0);
        chunk.advance_tile(0.25);
        assert_eq!(chunk.tile, 3);
        chunk.foliage = 0.2;
        chunk.advance_tile(0.25);
        assert_eq!(chunk.tile, TILE_DEPLETED);
        // One step per call.
        assert_ne!(chunk.tile, TILE_BARREN);
        chunk.advance_tile(0.25);
        assert_eq!(chunk.tile, TILE_BARREN);
    }

    #[test]
    fn blank_tile_never_transitions() {
        let mut chunk = PlanetChunk::new(TILE_BLANK, 0.0, 0.0, 0.0, 0.0);
        chunk.advance_tile(0.25);
        assert_eq!(chunk.tile, TILE_BLANK);
    }

    #[test]
    fn harvest_out_of_range_is_error() {
        let planet = test_planet(4.0, 0.5, 0.5, 0.5, 0.5);
        let config = TerrainConfig::default();
        let mut grid = ChunkGrid::generate(&ctx(), &planet, &config);
        assert_eq!(
            grid.harvest(16, &config),
            Err(GridError::IndexOutOfRange { index: 16, len: 16 })
        );
        assert!(grid.modifications().is_empty());
    }

    #[test]
    fn apply_records_is_all_or_nothing() {
        let planet = test_planet(4.0, 0.5, 0.5, 0.5, 0.5);
        let mut grid = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        let baseline = grid.clone();
        let records = [
            (1, PlanetChunk::new(6, 0.1, 0.1, 0.1, 0.1)),
            (99, PlanetChunk::new(7, 0.0, 0.0, 0.0, 0.0)),
        ];
        assert!(grid.apply_records(&records).is_err());
        assert_eq!(grid, baseline);
    }

    #[test]
    fn overlay_read_wins() {
        let planet = test_planet(4.0, 0.5, 0.5, 0.5, 0.5);
        let mut grid = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        let chunk = PlanetChunk::new(6, 0.1, 0.1, 0.1, 0.1);
        grid.apply_records(&[(3, chunk)]).unwrap();
        assert_eq!(*grid.get(3).unwrap(), chunk);
        assert_eq!(grid.modifications().get(3), Some(&chunk));
        assert_eq!(grid.chunks().nth(3), Some(&chunk));
    }

    #[test]
    fn index_of_clamps_to_grid() {
        let planet = test_planet(5.0, 0.5, 0.5, 0.5, 0.5);
        let grid = ChunkGrid::generate(&ctx(), &planet, &TerrainConfig::default());
        assert_eq!(grid.index_of(2, 3), Some(17));
        assert_eq!(grid.index_of(5, 0), None);
        assert_eq!(grid.index_of(0, 5), None);
    }
}
