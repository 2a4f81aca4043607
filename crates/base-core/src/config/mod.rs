//! Layered key-value configuration sources.
//!
//! Sources are merged left to right; a key set by a later source replaces
//! the same key from an earlier one. Keys are case-insensitive.

mod de;
mod source;

pub use de::{json_list, lenient_bool};
pub use source::{ConfigSource, EnvFileSource, MapSource, ProcessEnvSource, merge_sources};
