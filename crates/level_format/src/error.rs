// ---------------------------------------------------------------------------
// LevelFileError: typed errors for level file I/O
// ---------------------------------------------------------------------------

use std::fmt;

/// Hard failures of `load_level`/`save_level`.
///
/// Everything recoverable (bad syntax, out-of-range coordinates, unknown
/// keys) is reported per line through the `LoadReport` instead; only the
/// file itself being unreadable or unwritable surfaces here.
#[derive(Debug)]
pub enum LevelFileError {
    /// The level file could not be opened or read.
    Read {
        path: String,
        source: std::io::Error,
    },
    /// The output file could not be created or written.
    Write {
        path: String,
        source: std::io::Error,
    },
}

impl fmt::Display for LevelFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFileError::Read { path, source } => {
                write!(f, "failed to read level file {path}: {source}")
            }
            LevelFileError::Write { path, source } => {
                write!(f, "failed to write level file {path}: {source}")
            }
        }
    }
}

impl std::error::Error for LevelFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelFileError::Read { source, .. } | LevelFileError::Write { source, .. } => {
                Some(source)
            }
        }
    }
}
