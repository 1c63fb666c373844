//! tagdog library interface
//!
//! Scans a directory of audio files, reads their ID3 tags, fills in missing genres
//! from artist terms, and writes the result back.
//!
//! Exposes public APIs for the binary and for integration testing.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod types;

pub use crate::error::{TagError, TermSourceError};
pub use crate::pipeline::{ScanSummary, TagPipeline};
pub use crate::types::{Populator, Record, TagField, TagWriter, Term, TermSource};
