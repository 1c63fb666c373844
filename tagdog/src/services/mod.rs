//! Pipeline components
//!
//! Populators: [`Id3Reader`], [`TermFetcher`], [`GenreCaseFixer`].
//! Writers: [`Id3Writer`].
//! Supporting pieces: genre case normalization, rate limiting, the Echo Nest
//! client and the directory scanner.

pub mod echonest_client;
pub mod file_scanner;
pub mod genre_case;
mod id3_frames;
pub mod id3_reader;
pub mod id3_writer;
pub mod rate_limiter;
pub mod term_fetcher;

pub use echonest_client::EchoNestClient;
pub use file_scanner::{FileScanner, ScanError};
pub use genre_case::{normalize as normalize_genre, GenreCaseFixer};
pub use id3_reader::Id3Reader;
pub use id3_writer::Id3Writer;
pub use rate_limiter::RateLimiter;
pub use term_fetcher::TermFetcher;
