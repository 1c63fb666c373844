//! ID3 tag reader
//!
//! Populator that copies every known field present in a file's ID3v2 tag into the
//! record. Fields missing from the file are left unset.

use super::id3_frames::{read_field, read_tag};
use crate::error::{TagError, TagResult};
use crate::types::{Populator, Record, TagField};
use async_trait::async_trait;
use tracing::debug;

/// Reads artist, title and the other known fields from ID3 tags
#[derive(Debug, Default)]
pub struct Id3Reader;

impl Id3Reader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Populator for Id3Reader {
    fn name(&self) -> &'static str {
        "ID3Reader"
    }

    async fn populate(&self, record: &mut Record) -> TagResult<()> {
        let tag = read_tag(record.path()).map_err(|e| TagError::Read {
            path: record.path().to_path_buf(),
            message: e.to_string(),
        })?;

        for field in TagField::ALL {
            let values = read_field(&tag, field);
            if !values.is_empty() {
                record.set(field, values);
            }
        }

        debug!(
            file = %record.path().display(),
            field_count = record.populated_fields().count(),
            "ID3 read complete"
        );

        Ok(())
    }
}
