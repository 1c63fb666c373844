//! Core types and trait definitions
//!
//! - [`Record`]: one file's tag state while it moves through the pipeline
//! - [`Populator`] / [`TagWriter`]: the two stage capabilities the pipeline chains
//! - [`Term`] / [`TermSource`]: weighted artist terms from an external service

use crate::error::{TagResult, TermSourceError};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Record
// ============================================================================

/// Known tag fields, in canonical order
///
/// The set is closed: a [`Record`] carries exactly one value list per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    Artist,
    Author,
    Title,
    Album,
    Genre,
    Date,
    Performer,
    Composer,
    Conductor,
    Lyricist,
    Arranger,
    TrackNumber,
    DiscNumber,
    DiscSubtitle,
    Language,
}

impl TagField {
    /// All fields, in canonical order
    pub const ALL: [TagField; 15] = [
        TagField::Artist,
        TagField::Author,
        TagField::Title,
        TagField::Album,
        TagField::Genre,
        TagField::Date,
        TagField::Performer,
        TagField::Composer,
        TagField::Conductor,
        TagField::Lyricist,
        TagField::Arranger,
        TagField::TrackNumber,
        TagField::DiscNumber,
        TagField::DiscSubtitle,
        TagField::Language,
    ];

    /// Lowercase key name as used in logs
    pub fn key(self) -> &'static str {
        match self {
            TagField::Artist => "artist",
            TagField::Author => "author",
            TagField::Title => "title",
            TagField::Album => "album",
            TagField::Genre => "genre",
            TagField::Date => "date",
            TagField::Performer => "performer",
            TagField::Composer => "composer",
            TagField::Conductor => "conductor",
            TagField::Lyricist => "lyricist",
            TagField::Arranger => "arranger",
            TagField::TrackNumber => "tracknumber",
            TagField::DiscNumber => "discnumber",
            TagField::DiscSubtitle => "discsubtitle",
            TagField::Language => "language",
        }
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Tag state of one audio file during processing
///
/// Created fresh per file, mutated in place by each populator, read by each
/// writer, then dropped. An empty `Vec` means the field is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub path: PathBuf,
    pub artist: Vec<String>,
    /// Original lyricist or text writer
    pub author: Vec<String>,
    pub title: Vec<String>,
    pub album: Vec<String>,
    pub genre: Vec<String>,
    pub date: Vec<String>,
    pub performer: Vec<String>,
    pub composer: Vec<String>,
    pub conductor: Vec<String>,
    pub lyricist: Vec<String>,
    pub arranger: Vec<String>,
    pub track_number: Vec<String>,
    pub disc_number: Vec<String>,
    pub disc_subtitle: Vec<String>,
    pub language: Vec<String>,
}

impl Record {
    /// Create an empty record for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Values of a field (empty slice when unset)
    pub fn get(&self, field: TagField) -> &[String] {
        match field {
            TagField::Artist => &self.artist,
            TagField::Author => &self.author,
            TagField::Title => &self.title,
            TagField::Album => &self.album,
            TagField::Genre => &self.genre,
            TagField::Date => &self.date,
            TagField::Performer => &self.performer,
            TagField::Composer => &self.composer,
            TagField::Conductor => &self.conductor,
            TagField::Lyricist => &self.lyricist,
            TagField::Arranger => &self.arranger,
            TagField::TrackNumber => &self.track_number,
            TagField::DiscNumber => &self.disc_number,
            TagField::DiscSubtitle => &self.disc_subtitle,
            TagField::Language => &self.language,
        }
    }

    fn get_mut(&mut self, field: TagField) -> &mut Vec<String> {
        match field {
            TagField::Artist => &mut self.artist,
            TagField::Author => &mut self.author,
            TagField::Title => &mut self.title,
            TagField::Album => &mut self.album,
            TagField::Genre => &mut self.genre,
            TagField::Date => &mut self.date,
            TagField::Performer => &mut self.performer,
            TagField::Composer => &mut self.composer,
            TagField::Conductor => &mut self.conductor,
            TagField::Lyricist => &mut self.lyricist,
            TagField::Arranger => &mut self.arranger,
            TagField::TrackNumber => &mut self.track_number,
            TagField::DiscNumber => &mut self.disc_number,
            TagField::DiscSubtitle => &mut self.disc_subtitle,
            TagField::Language => &mut self.language,
        }
    }

    /// Replace the values of a field
    pub fn set(&mut self, field: TagField, values: Vec<String>) {
        *self.get_mut(field) = values;
    }

    /// Fields that currently hold at least one value
    pub fn populated_fields(&self) -> impl Iterator<Item = TagField> + '_ {
        TagField::ALL
            .into_iter()
            .filter(|field| !self.get(*field).is_empty())
    }
}

// ============================================================================
// Pipeline stage traits
// ============================================================================

/// Reads or derives tag values into a [`Record`]
///
/// Populators run in list order; each sees the writes of the ones before it.
#[async_trait]
pub trait Populator: Send + Sync {
    /// Populator name for logging
    fn name(&self) -> &'static str;

    /// Fill in or overwrite fields of `record`
    async fn populate(&self, record: &mut Record) -> TagResult<()>;
}

/// Persists a [`Record`] into a file's embedded tag store
#[async_trait]
pub trait TagWriter: Send + Sync {
    /// Writer name for logging
    fn name(&self) -> &'static str;

    /// Write the non-empty fields of `record` into the file at `path`
    async fn write(&self, path: &Path, record: &Record) -> TagResult<()>;
}

// ============================================================================
// Artist terms
// ============================================================================

/// Weighted descriptive label for an artist
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Term {
    pub name: String,
    /// Relevance in 0.0..=1.0
    pub weight: f64,
}

impl Term {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// External service returning an artist's terms, sorted by descending weight
#[async_trait]
pub trait TermSource: Send + Sync {
    async fn artist_terms(&self, artist: &str) -> Result<Vec<Term>, TermSourceError>;
}
