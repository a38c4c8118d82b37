// Explorer session: navigation state machine over the generated universe.
//
// The host calls `update()` once per frame with the held keys and the real
// frame time; the explorer's `SimClock` scales it before anything moves. A
// time scale of zero freezes panning and key repeat. The explorer is in one
// of three views:
//
//   Galaxy  WASD pans the visible window (continuous, `pan_speed` sectors
//           per second, never below sector 0). IJKL steps a cursor inside
//           the window. Space resolves the sector under the cursor at full
//           detail; anything present opens the Body view.
//   Body    J/L cycle the selected planet of a star system, wrapping at both
//           ends. Enter lands on the selected planet. Escape goes back.
//   Planet  Terrain is generated for the planet and its saved modifications
//           are overlaid. IJKL step the chunk cursor. Space harvests the chunk
//           under the cursor into the resource totals. Tab saves. Escape
//           saves and returns to Body.
//
// Discrete steps (cursor moves, planet cycling) fire on key-down and then
// repeat every `step_cooldown` seconds while the key stays held. Actions
// (select, land, harvest, save, back) fire on key-down only.
//
// A landing whose modification file cannot be read logs a warning and keeps
// the baseline terrain; the session carries on. Errors from *writing* saves
// are returned from `update()` and the view does not change.
//
// See also: `input.rs` for `InputState`, `clock.rs` for `SimClock`, `save.rs`
// for `PlanetStore` and `ResourceTotals`, `config.rs` for `ExplorerConfig`.

use crate::config::GalaxyConfig;
use crate::clock::SimClock;
use crate::context::GenContext;
use crate::error::SaveResult;
use crate::galaxy::{Detail, GalacticBody};
use crate::input::{InputState, InputTracker, Key};
use crate::save::{PlanetStore, ResourceTotals};
use crate::star_system::{Planet, StarSystem};
use crate::terrain::{ChunkGrid, PlanetChunk};
use crate::types::SectorCoord;
use std::path::PathBuf;

const CURSOR_KEYS: [Key; 4] = [Key::I, Key::J, Key::K, Key::L];
const CYCLE_KEYS: [Key; 2] = [Key::J, Key::L];

/// What the explorer is currently looking at.
#[derive(Clone, Debug, PartialEq)]
pub enum View {
    Galaxy,
    Body {
        body: GalacticBody,
        planet_index: usize,
    },
    Planet {
        system: StarSystem,
        planet_index: usize,
        grid: ChunkGrid,
        /// Chunk cursor `(x, y)`, always inside the grid.
        cursor: (usize, usize),
    },
}

/// One play session over a single galaxy seed.
#[derive(Debug)]
pub struct Explorer {
    ctx: GenContext,
    config: GalaxyConfig,
    store: PlanetStore,
    totals: ResourceTotals,
    totals_path: PathBuf,
    view: View,
    /// Top-left sector of the galaxy window.
    offset: (f64, f64),
    /// Cursor within the galaxy window.
    cursor: (u32, u32),
    input: InputTracker,
    clock: SimClock,
    /// Seconds until a held step key repeats.
    step_timer: f32,
}

impl Explorer {
    /// Start a session with zeroed resource totals.
    pub fn new(ctx: GenContext, config: GalaxyConfig) -> Self {
        let store = PlanetStore::new(config.save.planet_dir(ctx.seed()), config.save.format);
        let totals_path = config.save.totals_file();
        Self {
            ctx,
            config,
            store,
            totals: ResourceTotals::default(),
            totals_path,
            view: View::Galaxy,
            offset: (0.0, 0.0),
            cursor: (0, 0),
            input: InputTracker::new(),
            clock: SimClock::new(),
            step_timer: 0.0,
        }
    }

    /// Start a session, restoring resource totals from the save directory.
    pub fn open(ctx: GenContext, config: GalaxyConfig) -> SaveResult<Self> {
        let mut explorer = Self::new(ctx, config);
        explorer.totals = ResourceTotals::load(&explorer.totals_path)?;
        tracing::info!(seed = ctx.seed(), "explorer session opened");
        Ok(explorer)
    }

    pub fn context(&self) -> &GenContext {
        &self.ctx
    }

    pub fn config(&self) -> &GalaxyConfig {
        &self.config
    }

    pub fn store(&self) -> &PlanetStore {
        &self.store
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn totals(&self) -> &ResourceTotals {
        &self.totals
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Scale applied to every frame time passed to `update()`. Zero pauses.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.clock.set_time_scale(scale);
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    pub fn cursor(&self) -> (u32, u32) {
        self.cursor
    }

    /// The sector under the galaxy cursor.
    pub fn selected_sector(&self) -> SectorCoord {
        SectorCoord::new(self.offset.0 as u32, self.offset.1 as u32)
            .wrapping_offset(self.cursor.0, self.cursor.1)
    }

    /// The selected planet, in the Body view of a star system or the Planet
    /// view.
    pub fn selected_planet(&self) -> Option<&Planet> {
        match &self.view {
            View::Body {
                body: GalacticBody::StarSystem(system),
                planet_index,
            }
            | View::Planet {
                system,
                planet_index,
                ..
            } => system.planet(*planet_index),
            _ => None,
        }
    }

    /// The chunk under the terrain cursor, in the Planet view.
    pub fn selected_chunk(&self) -> Option<&PlanetChunk> {
        match &self.view {
            View::Planet { grid, cursor, .. } => grid
                .index_of(cursor.0, cursor.1)
                .and_then(|index| grid.get(index).ok()),
            _ => None,
        }
    }

    /// Jump the galaxy window so its top-left sector is `coord`, cursor
    /// reset. Ignored outside the Galaxy view.
    pub fn focus(&mut self, coord: SectorCoord) {
        if matches!(self.view, View::Galaxy) {
            self.offset = (f64::from(coord.x), f64::from(coord.y));
            self.cursor = (0, 0);
        }
    }

    /// Advance one frame of `real_dt` seconds.
    pub fn update(&mut self, input: InputState, real_dt: f32) -> SaveResult<()> {
        let dt = self.clock.tick(real_dt);
        self.input.advance(input);
        self.step_timer = (self.step_timer - dt).max(0.0);
        match self.view {
            View::Galaxy => {
                self.update_galaxy(dt);
                Ok(())
            }
            View::Body { .. } => {
                self.update_body();
                Ok(())
            }
            View::Planet { .. } => self.update_planet(),
        }
    }

    /// Write the current planet's modifications (if landed) and the resource
    /// totals.
    pub fn save(&self) -> SaveResult<()> {
        if let View::Planet { grid, .. } = &self.view {
            self.store.save(grid)?;
        }
        self.totals.save(&self.totals_path)
    }

    /// First of `keys` that takes a discrete step this frame: freshly
    /// pressed, or held with the repeat timer expired.
    fn take_step(&mut self, keys: &[Key]) -> Option<Key> {
        let input = &self.input;
        let timer = self.step_timer;
        let key = keys
            .iter()
            .copied()
            .find(|&k| input.just_pressed(k) || (input.held(k) && timer <= 0.0))?;
        self.step_timer = self.config.explorer.step_cooldown;
        Some(key)
    }

    fn update_galaxy(&mut self, dt: f32) {
        let pan = f64::from(self.config.explorer.pan_speed * dt);
        let mut delta = (0.0, 0.0);
        if self.input.held(Key::A) {
            delta.0 -= pan;
        }
        if self.input.held(Key::D) {
            delta.0 += pan;
        }
        if self.input.held(Key::W) {
            delta.1 -= pan;
        }
        if self.input.held(Key::S) {
            delta.1 += pan;
        }
        let limit = f64::from(u32::MAX);
        self.offset = (
            (self.offset.0 + delta.0).clamp(0.0, limit),
            (self.offset.1 + delta.1).clamp(0.0, limit),
        );

        let (cols, rows) = self.config.explorer.view_sectors;
        match self.take_step(&CURSOR_KEYS) {
            Some(Key::I) => self.cursor.1 = self.cursor.1.saturating_sub(1),
            Some(Key::K) => {
                self.cursor.1 = self.cursor.1.saturating_add(1).min(rows.saturating_sub(1))
            }
            Some(Key::J) => self.cursor.0 = self.cursor.0.saturating_sub(1),
            Some(Key::L) => {
                self.cursor.0 = self.cursor.0.saturating_add(1).min(cols.saturating_sub(1))
            }
            _ => {}
        }

        if self.input.just_pressed(Key::Space) {
            self.select();
        }
    }

    fn select(&mut self) {
        let coord = self.selected_sector();
        let body = GalacticBody::at(&self.ctx, coord, Detail::Full);
        match body.kind() {
            None => tracing::debug!(%coord, "nothing at selected sector"),
            Some(kind) => {
                tracing::info!(%coord, ?kind, "selected body");
                self.view = View::Body {
                    body,
                    planet_index: 0,
                };
            }
        }
    }

    fn update_body(&mut self) {
        if self.input.just_pressed(Key::Escape) {
            self.view = View::Galaxy;
            return;
        }
        let step = self.take_step(&CYCLE_KEYS);
        let View::Body {
            body: GalacticBody::StarSystem(system),
            planet_index,
        } = &mut self.view
        else {
            return;
        };
        let count = system.planets.len();
        if count == 0 {
            return;
        }
        match step {
            Some(Key::J) => *planet_index = (*planet_index + count - 1) % count,
            Some(Key::L) => *planet_index = (*planet_index + 1) % count,
            _ => {}
        }
        if self.input.just_pressed(Key::Enter) {
            let system = system.clone();
            let planet_index = *planet_index;
            self.land(system, planet_index);
        }
    }

    fn land(&mut self, system: StarSystem, planet_index: usize) {
        let Some(planet) = system.planet(planet_index) else {
            return;
        };
        let mut grid = ChunkGrid::generate(&self.ctx, planet, &self.config.terrain);
        match self.store.load(&mut grid) {
            Ok(restored) => tracing::info!(
                terrain_seed = grid.terrain_seed(),
                restored,
                "landed on planet"
            ),
            Err(e) => tracing::warn!(
                terrain_seed = grid.terrain_seed(),
                error = %e,
                "could not load planet modifications, using baseline terrain"
            ),
        }
        self.view = View::Planet {
            system,
            planet_index,
            grid,
            cursor: (0, 0),
        };
    }

    fn update_planet(&mut self) -> SaveResult<()> {
        let step = self.take_step(&CURSOR_KEYS);
        let View::Planet { grid, cursor, .. } = &mut self.view else {
            return Ok(());
        };
        let max = grid.diameter().saturating_sub(1);
        match step {
            Some(Key::I) => cursor.1 = cursor.1.saturating_sub(1),
            Some(Key::K) => cursor.1 = (cursor.1 + 1).min(max),
            Some(Key::J) => cursor.0 = cursor.0.saturating_sub(1),
            Some(Key::L) => cursor.0 = (cursor.0 + 1).min(max),
            _ => {}
        }

        if self.input.just_pressed(Key::Space) {
            if let Some(index) = grid.index_of(cursor.0, cursor.1) {
                let delta = grid.harvest(index, &self.config.terrain)?;
                self.totals.absorb(&delta);
                tracing::debug!(index, amount = delta.total(), "harvested chunk");
            }
        }

        if self.input.just_pressed(Key::Tab) {
            self.save()?;
        }

        if self.input.just_pressed(Key::Escape) {
            self.save()?;
            if let View::Planet {
                system,
                planet_index,
                ..
            } = std::mem::replace(&mut self.view, View::Galaxy)
            {
                self.view = View::Body {
                    body: GalacticBody::StarSystem(system),
                    planet_index,
                };
            }
        }
        Ok(())
    }
}
