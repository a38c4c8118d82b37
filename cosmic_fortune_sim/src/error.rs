// Error types for terrain access and save/load.
//
// Generation itself cannot fail: every generator draws from non-empty
// constant ranges, and an empty range is a programming error that panics
// inside the PRNG. What can fail is indexing into a chunk grid and anything
// touching disk. Missing files are never errors (they mean "no prior
// state"); malformed content is, and the caller falls back to baseline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from chunk-grid access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Chunk index outside `0..len`. Callers clamp cursor coordinates
    /// before indexing; this means a bad record or a bug upstream.
    #[error("chunk index {index} out of range for grid of {len} chunks")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors from reading or writing save files and config.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed text content: wrong field count, non-numeric field,
    /// missing parentheses. `record` is the zero-based tuple/line number.
    #[error("parse error in record {record}: {reason}")]
    Parse { record: usize, reason: String },

    /// Malformed binary record payload.
    #[error("corrupt modification payload: {source}")]
    Codec {
        #[source]
        source: bincode::Error,
    },

    #[error("unsupported modification format version {version}")]
    UnsupportedVersion { version: u8 },

    #[error("invalid config: {source}")]
    Config {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl SaveError {
    pub(crate) fn parse(record: usize, reason: impl Into<String>) -> Self {
        SaveError::Parse {
            record,
            reason: reason.into(),
        }
    }
}

/// Result type for save/load and config operations.
pub type SaveResult<T> = Result<T, SaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_error_converts_into_save_error() {
        let err: SaveError = GridError::IndexOutOfRange { index: 5, len: 4 }.into();
        assert!(matches!(
            err,
            SaveError::Grid(GridError::IndexOutOfRange { index: 5, len: 4 })
        ));
        assert_eq!(
            err.to_string(),
            "chunk index 5 out of range for grid of 4 chunks"
        );
    }

    #[test]
    fn parse_error_message_names_record() {
        let err = SaveError::parse(3, "expected 7 fields, found 6");
        assert_eq!(
            err.to_string(),
            "parse error in record 3: expected 7 fields, found 6"
        );
    }
}
