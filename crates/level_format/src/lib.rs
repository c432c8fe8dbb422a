//! Persistence for the tile world: a human-authorable, line-oriented text
//! format covering grid shape, texture aliases, per-tile wall/top state, and
//! vehicle spawns.
//!
//! Loading is tolerant by design: bad lines degrade to line-numbered
//! diagnostics instead of aborting. Saving emits only non-default state
//! so files stay small enough to edit by hand.

pub mod diagnostics;
pub mod error;
pub mod parser;
pub mod writer;

pub use diagnostics::{Diagnostic, LoadReport, Severity};
pub use error::LevelFileError;
pub use parser::{load_level, parse_level_str};
pub use writer::{save_level, write_level_string};
