//! # tagdog common library
//!
//! Shared code for the tagdog workspace:
//! - Error type used by configuration loading
//! - TOML bootstrap configuration and config file discovery

pub mod config;
pub mod error;

pub use error::{Error, Result};
