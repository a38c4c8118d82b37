// cosmic_fortune_sim: procedural universe generation with sparse save state.
//
// Everything in the universe is a pure function of a sector coordinate and
// the galaxy seed. Nothing generated is stored; the only persisted state is
// the per-planet set of harvested chunks, the aggregate resource totals, and
// the seed itself. The crate has no rendering or windowing dependencies and
// can be tested, benchmarked, and driven headless.
//
// Module overview:
// - `types.rs`:       SectorCoord (and its PRNG key), Rgb/Rgba, WebColor, star palette.
// - `context.rs`:     GenContext: the galaxy seed, threaded into every generator.
// - `galaxy.rs`:      Coordinate resolver, GalacticBody enum, parallel survey.
// - `star_system.rs`: Star and planet generation.
// - `nebula.rs`:      Nebula and cloud generation.
// - `terrain.rs`:     Planet chunk grid, harvest, tile state machine, modification overlay.
// - `save.rs`:        Modification file codecs (text v0, binary v1), PlanetStore, totals, seed file.
// - `config.rs`:      GalaxyConfig: tunable, non-generative parameters.
// - `error.rs`:       GridError and SaveError.
// - `explorer.rs`:    Explorer: the Galaxy/Body/Planet navigation state machine.
// - `input.rs`:       Key, InputState, InputTracker: host-neutral key snapshots.
// - `clock.rs`:       SimClock: host-driven scaled time.
// - `prng`:           Re-exported from `cosmic_fortune_prng`.
//
// **Critical constraint: determinism.** Same seed and coordinate must always
// produce the same body, bit for bit. All randomness comes from per-generator
// `GalaxyRng` instances seeded from coordinate keys. No `HashMap`, no system
// time, no OS entropy. Use `BTreeMap` for ordered collections.

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod explorer;
pub mod galaxy;
pub mod input;
pub mod nebula;
pub use cosmic_fortune_prng as prng;
pub mod save;
pub mod star_system;
pub mod terrain;
pub mod types;
