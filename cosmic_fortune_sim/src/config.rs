// Data-driven session configuration.
//
// Everything a host may tune without changing what the universe *is* lives
// in `GalaxyConfig`, loaded from JSON at startup and never mutated at
// runtime: harvest rates, navigation feel, where saves go, and the seed used
// when no seed file exists.
//
// Generation ranges (star sizes, planet counts, nebula cloud counts, the
// palette) are deliberately NOT here. They define the universe itself and
// live as constants beside the generator that draws them; a config knob
// would let two hosts disagree about the same coordinate.
//
// `ExplorerConfig::sector_size` is layout for graphical hosts; nothing in
// this crate or the CLI reads it.
//
// See also: `explorer.rs` which owns a `GalaxyConfig`, `terrain.rs` which
// reads `TerrainConfig`, `save.rs` which reads `SaveConfig`.

use crate::error::{SaveError, SaveResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Controls harvesting and the tile state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Fraction of each resource removed from a chunk per harvest.
    pub harvest_fraction: f64,
    /// Water+foliage (vegetated → depleted) and minerals+gases
    /// (depleted → barren) must both fall below this to advance the tile.
    pub depletion_threshold: f64,
    /// A planet attribute at or above this counts as dominant when choosing
    /// the tile range for its terrain.
    pub dominance_threshold: f64,
    /// Remaining quantities below this are zeroed after a harvest, so
    /// repeated harvesting reaches exactly zero.
    pub depletion_floor: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            harvest_fraction: 0.1,
            depletion_threshold: 0.25,
            dominance_threshold: 0.5,
            depletion_floor: 1e-9,
        }
    }
}

/// Controls galaxy navigation in the explorer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Screen size of one sector in pixels. Hosts use it to lay out the
    /// galaxy view; the core only uses `view_sectors`.
    pub sector_size: u32,
    /// Visible window in sectors (columns, rows). The cursor is clamped to it.
    pub view_sectors: (u32, u32),
    /// Pan speed in sectors per (scaled) second.
    pub pan_speed: f32,
    /// Seconds between discrete cursor/selection steps while a key is held.
    pub step_cooldown: f32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            sector_size: 16,
            view_sectors: (80, 45),
            pan_speed: 30.0,
            step_cooldown: 0.15,
        }
    }
}

/// On-disk encoding for per-planet modification files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveFormat {
    /// Pipe-joined parenthesized tuples (format version 0).
    Text,
    /// Magic + version byte + bincode records (format version 1).
    Binary,
}

/// Controls where and how saves are written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveConfig {
    /// Root directory for all save files.
    pub dir: PathBuf,
    /// Encoding used when writing modification files. Both are always
    /// readable.
    pub format: SaveFormat,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("saves"),
            format: SaveFormat::Binary,
        }
    }
}

impl SaveConfig {
    pub fn seed_file(&self) -> PathBuf {
        self.dir.join("seed.txt")
    }

    /// Aggregate resource totals, shared by every galaxy.
    pub fn totals_file(&self) -> PathBuf {
        self.dir.join("resources.txt")
    }

    /// Planet modification files for one galaxy seed. Terrain seeds only
    /// encode the planet's coordinate, so each galaxy needs its own directory.
    pub fn planet_dir(&self, galaxy_seed: u32) -> PathBuf {
        self.dir.join(format!("galaxy_{galaxy_seed}"))
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level session configuration. Loaded from JSON, never mutated at
/// runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GalaxyConfig {
    /// Seed used when no seed file exists.
    pub default_seed: u32,
    pub terrain: TerrainConfig,
    pub explorer: ExplorerConfig,
    pub save: SaveConfig,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            default_seed: 44,
            terrain: TerrainConfig::default(),
            explorer: ExplorerConfig::default(),
            save: SaveConfig::default(),
        }
    }
}

impl GalaxyConfig {
    pub fn from_json(json: &str) -> SaveResult<Self> {
        serde_json::from_str(json).map_err(|source| SaveError::Config { source })
    }

    pub fn to_json(&self) -> SaveResult<String> {
        serde_json::to_string_pretty(self).map_err(|source| SaveError::Config { source })
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> SaveResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), "loaded galaxy config");
        Ok(config)
    }
}
