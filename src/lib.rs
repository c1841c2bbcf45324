//! ccbook
//!
//! Converts Claude Code JSONL session logs into self-contained HTML
//! transcripts.
//!
//! Pipeline: [`parser`] → [`reconstruct`] → [`resolver`] → [`render`],
//! wired together by [`pipeline::convert`]. The pure core keeps no state
//! between sessions; [`config`], [`logging`] and [`source`] form the shell
//! used by the binary.

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod reconstruct;
pub mod render;
pub mod resolver;
pub mod source;
