// Save files: per-planet modification sets, aggregate resource totals, and
// the galaxy seed.
//
// Only three things are ever written to disk. The universe itself is
// regenerated from `(coordinate, seed)` on demand; a planet's terrain is
// regenerated on landing and then overlaid with its modification file.
//
// ## Modification file formats
//
// Version 0 (legacy text), no header:
//
//   (index,tile,water,foliage,minerals,gases,total)|(index,...)|...
//
// Floats are written in Rust's shortest round-trip form, so text saves
// reload bit-exactly.
//
// Version 1 (binary):
//
//   b"CFMS" | version: u8 = 1 | bincode(Vec<ChunkRecord>)
//
// The reader sniffs the magic and accepts both; the writer uses whichever
// `SaveFormat` the config selects. New fields go into a new version number,
// never into an existing one.
//
// ## Other files
//
// - totals: `(water, foliage, minerals, gases)` as text.
// - seed: a single decimal `u32`.
//
// A missing file always means "no prior state". Malformed content is a
// `SaveError`, and the caller keeps its baseline.
//
// See also: `terrain.rs` for `ChunkGrid::apply_records()`, which validates
// every index before writing any cell.

use crate::config::SaveFormat;
use crate::error::{SaveError, SaveResult};
use crate::terrain::{ChunkGrid, PlanetChunk, ResourceDelta, TILE_MAX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Magic header of binary modification files.
pub const MODS_MAGIC: &[u8; 4] = b"CFMS";
/// Current binary modification format version.
pub const MODS_VERSION: u8 = 1;
/// Extension of per-planet modification files.
pub const MODS_EXTENSION: &str = "mods";

const RECORD_FIELDS: usize = 7;
const TOTALS_FIELDS: usize = 4;

// ---------------------------------------------------------------------------
// Modification records
// ---------------------------------------------------------------------------

/// One saved chunk, in the fixed field order shared by both formats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub index: u32,
    pub tile: u8,
    pub water: f64,
    pub foliage: f64,
    pub minerals: f64,
    pub gases: f64,
    pub total: f64,
}

impl ChunkRecord {
    fn from_chunk(index: usize, chunk: &PlanetChunk) -> Self {
        Self {
            index: index as u32,
            tile: chunk.tile,
            water: chunk.water,
            foliage: chunk.foliage,
            minerals: chunk.minerals,
            gases: chunk.gases,
            total: chunk.total,
        }
    }

    fn into_entry(self) -> (usize, PlanetChunk) {
        (
            self.index as usize,
            PlanetChunk {
                tile: self.tile,
                water: self.water,
                foliage: self.foliage,
                minerals: self.minerals,
                gases: self.gases,
                total: self.total,
            },
        )
    }

    fn validate(&self, record: usize) -> SaveResult<()> {
        if self.tile > TILE_MAX {
            return Err(SaveError::parse(
                record,
                format!("tile index {} above {TILE_MAX}", self.tile),
            ));
        }
        for (name, value) in [
            ("water", self.water),
            ("foliage", self.foliage),
            ("minerals", self.minerals),
            ("gases", self.gases),
            ("total", self.total),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SaveError::parse(record, format!("{name} is {value}")));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ChunkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{},{},{},{},{})",
            self.index, self.tile, self.water, self.foliage, self.minerals, self.gases, self.total
        )
    }
}

/// The grid's modification overlay as records, in index order.
pub fn records_of(grid: &ChunkGrid) -> Vec<ChunkRecord> {
    grid.modifications()
        .iter()
        .map(|(index, chunk)| ChunkRecord::from_chunk(index, chunk))
        .collect()
}

/// Encode records as a version 0 text body.
pub fn encode_text(records: &[ChunkRecord]) -> String {
    records
        .iter()
        .map(ChunkRecord::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// Decode a version 0 text body. Empty input is an empty set.
pub fn decode_text(text: &str) -> SaveResult<Vec<ChunkRecord>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split('|')
        .enumerate()
        .map(|(record, tuple)| parse_record(record, tuple.trim()))
        .collect()
}

fn parse_record(record: usize, tuple: &str) -> SaveResult<ChunkRecord> {
    let fields = parenthesized_fields(record, tuple, ",", RECORD_FIELDS)?;
    let parsed = ChunkRecord {
        index: parse_field(record, "index", fields[0])?,
        tile: parse_field(record, "tile", fields[1])?,
        water: parse_field(record, "water", fields[2])?,
        foliage: parse_field(record, "foliage", fields[3])?,
        minerals: parse_field(record, "minerals", fields[4])?,
        gases: parse_field(record, "gases", fields[5])?,
        total: parse_field(record, "total", fields[6])?,
    };
    parsed.validate(record)?;
    Ok(parsed)
}

/// Strip `( ... )` and split on `separator`, requiring exactly `expected`
/// fields.
fn parenthesized_fields<'a>(
    record: usize,
    tuple: &'a str,
    separator: &str,
    expected: usize,
) -> SaveResult<Vec<&'a str>> {
    let inner = tuple
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| SaveError::parse(record, format!("expected a parenthesized tuple, got {tuple:?}")))?;
    let fields: Vec<&str> = inner.split(separator).map(str::trim).collect();
    if fields.len() != expected {
        return Err(SaveError::parse(
            record,
            format!("expected {expected} fields, found {}", fields.len()),
        ));
    }
    Ok(fields)
}

fn parse_field<T: std::str::FromStr>(record: usize, name: &str, field: &str) -> SaveResult<T> {
    field
        .parse()
        .map_err(|_| SaveError::parse(record, format!("{name} is not a number: {field:?}")))
}

/// Encode records as a version 1 binary body.
pub fn encode_binary(records: &[ChunkRecord]) -> SaveResult<Vec<u8>> {
    let payload = bincode::serialize(records).map_err(|source| SaveError::Codec { source })?;
    let mut out = Vec::with_capacity(MODS_MAGIC.len() + 1 + payload.len());
    out.extend_from_slice(MODS_MAGIC);
    out.push(MODS_VERSION);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a modification file body of either version.
pub fn decode_modifications(bytes: &[u8]) -> SaveResult<Vec<ChunkRecord>> {
    let Some(rest) = bytes.strip_prefix(MODS_MAGIC.as_slice()) else {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| SaveError::parse(0, "legacy modification file is not UTF-8"))?;
        return decode_text(text);
    };
    let (&version, payload) = rest
        .split_first()
        .ok_or_else(|| SaveError::parse(0, "truncated header: missing format version"))?;
    if version != MODS_VERSION {
        return Err(SaveError::UnsupportedVersion { version });
    }
    let records: Vec<ChunkRecord> =
        bincode::deserialize(payload).map_err(|source| SaveError::Codec { source })?;
    for (record, r) in records.iter().enumerate() {
        r.validate(record)?;
    }
    Ok(records)
}

pub fn encode_modifications(records: &[ChunkRecord], format: SaveFormat) -> SaveResult<Vec<u8>> {
    match format {
        SaveFormat::Text => Ok(encode_text(records).into_bytes()),
        SaveFormat::Binary => encode_binary(records),
    }
}

// ---------------------------------------------------------------------------
// Per-planet store
// ---------------------------------------------------------------------------

/// Directory of per-planet modification files, one file per terrain seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanetStore {
    dir: PathBuf,
    format: SaveFormat,
}

impl PlanetStore {
    pub fn new(dir: impl Into<PathBuf>, format: SaveFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file holding modifications for the planet with `terrain_seed`.
    pub fn path_for(&self, terrain_seed: u32) -> PathBuf {
        self.dir
            .join(format!("planet_{terrain_seed:08x}.{MODS_EXTENSION}"))
    }

    /// Write the grid's modification overlay, replacing any previous file.
    pub fn save(&self, grid: &ChunkGrid) -> SaveResult<PathBuf> {
        let path = self.path_for(grid.terrain_seed());
        let bytes = encode_modifications(&records_of(grid), self.format)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| SaveError::Io {
            path: self.dir.clone(),
            source,
        })?;
        write_replacing(&path, &bytes)?;
        tracing::info!(
            path = %path.display(),
            chunks = grid.modifications().len(),
            "saved planet modifications"
        );
        Ok(path)
    }

    /// Overlay the saved modifications onto a freshly generated grid and
    /// return how many chunks were restored. A missing file restores none.
    /// On error the grid is left exactly as it was.
    pub fn load(&self, grid: &mut ChunkGrid) -> SaveResult<usize> {
        let path = self.path_for(grid.terrain_seed());
        let Some(bytes) = read_optional(&path)? else {
            tracing::debug!(path = %path.display(), "no saved modifications");
            return Ok(0);
        };
        let entries: Vec<(usize, PlanetChunk)> = decode_modifications(&bytes)?
            .into_iter()
            .map(ChunkRecord::into_entry)
            .collect();
        grid.apply_records(&entries)?;
        tracing::info!(path = %path.display(), chunks = entries.len(), "loaded planet modifications");
        Ok(entries.len())
    }
}

// ---------------------------------------------------------------------------
// Aggregate resource totals
// ---------------------------------------------------------------------------

/// Everything the player has harvested, across all planets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceTotals {
    pub water: f64,
    pub foliage: f64,
    pub minerals: f64,
    pub gases: f64,
}

impl ResourceTotals {
    pub fn absorb(&mut self, delta: &ResourceDelta) {
        self.water += delta.water;
        self.foliage += delta.foliage;
        self.minerals += delta.minerals;
        self.gases += delta.gases;
    }

    pub fn to_text(&self) -> String {
        format!(
            "({}, {}, {}, {})",
            self.water, self.foliage, self.minerals, self.gases
        )
    }

    pub fn from_text(text: &str) -> SaveResult<Self> {
        let fields = parenthesized_fields(0, text.trim(), ", ", TOTALS_FIELDS)?;
        Ok(Self {
            water: parse_field(0, "water", fields[0])?,
            foliage: parse_field(0, "foliage", fields[1])?,
            minerals: parse_field(0, "minerals", fields[2])?,
            gases: parse_field(0, "gases", fields[3])?,
        })
    }

    /// Read totals from `path`; a missing file is all zeros.
    pub fn load(path: &Path) -> SaveResult<Self> {
        match read_optional(path)? {
            None => Ok(Self::default()),
            Some(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let totals = Self::from_text(&text)?;
                tracing::debug!(path = %path.display(), "loaded resource totals");
                Ok(totals)
            }
        }
    }

    pub fn save(&self, path: &Path) -> SaveResult<()> {
        create_parent_dir(path)?;
        write_replacing(path, self.to_text().as_bytes())?;
        tracing::debug!(path = %path.display(), "saved resource totals");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Seed file
// ---------------------------------------------------------------------------

/// Read the galaxy seed from `path`, or `default` if the file is missing.
pub fn load_seed(path: &Path, default: u32) -> SaveResult<u32> {
    let Some(bytes) = read_optional(path)? else {
        tracing::info!(seed = default, "no seed file, using default seed");
        return Ok(default);
    };
    let text = String::from_utf8_lossy(&bytes);
    let seed: u32 = parse_field(0, "seed", text.trim())?;
    tracing::info!(seed, path = %path.display(), "loaded galaxy seed");
    Ok(seed)
}

pub fn save_seed(path: &Path, seed: u32) -> SaveResult<()> {
    create_parent_dir(path)?;
    write_replacing(path, seed.to_string().as_bytes())?;
    tracing::debug!(seed, path = %path.display(), "saved galaxy seed");
    Ok(())
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Read a whole file; `Ok(None)` if it does not exist.
fn read_optional(path: &Path) -> SaveResult<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SaveError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn create_parent_dir(path: &Path) -> SaveResult<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent).map_err(|source| SaveError::Io {
            path: parent.to_path_buf(),
            source,
        }),
        None => Ok(()),
    }
}

/// Write via a sibling temp file and rename, so a crash mid-write never
/// leaves a truncated save behind. A failed rename removes the temp file.
fn write_replacing(path: &Path, bytes: &[u8]) -> SaveResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let io_err = |source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp, bytes).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        io_err(source)
    })
}
