//! Log input sources.
//!
//! This module provides the inputs of a conversion:
//! - [`LogSource`] for one JSONL log on disk
//! - Project directory discovery for batch conversion

pub mod discovery;
pub mod file;

pub use discovery::{discover_sessions, encode_project_path, SessionFilter, SUBAGENT_LOG_PREFIX};
pub use file::LogSource;
