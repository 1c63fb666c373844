//! ID3 tag writer
//!
//! Writes every non-empty field of a record into the file's ID3v2 tag. Empty
//! fields are never cleared, and frames this tool does not manage (artwork,
//! comments, ...) are carried over untouched.
//!
//! ID3v2.3 tags are upgraded on the way through: their date frames are folded
//! into TDRC before the tag is written as ID3v2.4.
//!
//! The write is atomic per file: the tag is written into a copy of the file in
//! the same directory, and the copy is renamed over the original only when that
//! succeeded.

use super::id3_frames::{read_tag, upgrade_legacy_frames, write_field};
use crate::error::{TagError, TagResult};
use crate::types::{Record, TagWriter};
use async_trait::async_trait;
use id3::Version;
use std::path::Path;
use tracing::debug;

/// Persists records as ID3v2.4 tags
#[derive(Debug, Default)]
pub struct Id3Writer;

impl Id3Writer {
    pub fn new() -> Self {
        Self
    }

    fn write_tags(&self, path: &Path, record: &Record) -> TagResult<()> {
        let write_error = |message: String| TagError::Write {
            path: path.to_path_buf(),
            message,
        };

        let mut tag = read_tag(path).map_err(|e| write_error(e.to_string()))?;
        upgrade_legacy_frames(&mut tag);

        let mut written = 0usize;
        for field in record.populated_fields() {
            write_field(&mut tag, field, record.get(field));
            written += 1;
        }

        if written == 0 {
            debug!(file = %path.display(), "No fields to write, leaving file untouched");
            return Ok(());
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let staged = tempfile::Builder::new()
            .prefix(".tagdog-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| write_error(format!("create temporary file: {}", e)))?;

        std::fs::copy(path, staged.path())
            .map_err(|e| write_error(format!("stage copy: {}", e)))?;

        tag.write_to_path(staged.path(), Version::Id3v24)
            .map_err(|e| write_error(format!("encode tag: {}", e)))?;

        staged
            .persist(path)
            .map_err(|e| write_error(format!("replace original: {}", e.error)))?;

        debug!(file = %path.display(), fields = written, "ID3 write complete");
        Ok(())
    }
}

#[async_trait]
impl TagWriter for Id3Writer {
    fn name(&self) -> &'static str {
        "ID3Writer"
    }

    async fn write(&self, path: &Path, record: &Record) -> TagResult<()> {
        self.write_tags(path, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Id3Reader;
    use crate::types::Populator;
    use id3::frame::Comment;
    use id3::{Tag, TagLike};

    const AUDIO: [u8; 8] = [0xFF, 0xFB, 0x90, 0x00, 0x11, 0x22, 0x33, 0x44];

    fn tagged_file(dir: &Path, tag: &Tag) -> std::path::PathBuf {
        let path = dir.join("song.mp3");
        std::fs::write(&path, AUDIO).unwrap();
        tag.write_to_path(&path, Version::Id3v24).unwrap();
        path
    }

    #[tokio::test]
    async fn test_writes_non_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut tag = Tag::new();
        tag.set_artist("Nirvana");
        let path = tagged_file(dir.path(), &tag);

        let mut record = Record::new(&path);
        record.artist = vec!["Nirvana".to_string()];
        record.genre = vec!["Grunge".to_string(), "Rock".to_string()];
        Id3Writer::new().write(&path, &record).await.unwrap();

        let written = Tag::read_from_path(&path).unwrap();
        assert_eq!(written.artist(), Some("Nirvana"));
        assert_eq!(
            written.get("TCON").unwrap().content().text(),
            Some("Grunge\0Rock")
        );
    }

    #[tokio::test]
    async fn test_empty_fields_not_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let mut tag = Tag::new();
        tag.set_artist("Nirvana");
        tag.set_title("Lithium");
        let path = tagged_file(dir.path(), &tag);

        let mut record = Record::new(&path);
        record.genre = vec!["Grunge".to_string()];
        Id3Writer::new().write(&path, &record).await.unwrap();

        let written = Tag::read_from_path(&path).unwrap();
        assert_eq!(written.title(), Some("Lithium"));
        assert_eq!(written.artist(), Some("Nirvana"));
    }

    #[tokio::test]
    async fn test_unmanaged_frames_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let mut tag = Tag::new();
        tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: String::new(),
            text: "keep me".to_string(),
        });
        let path = tagged_file(dir.path(), &tag);

        let mut record = Record::new(&path);
        record.genre = vec!["Grunge".to_string()];
        Id3Writer::new().write(&path, &record).await.unwrap();

        let written = Tag::read_from_path(&path).unwrap();
        assert_eq!(written.comments().next().map(|c| c.text.as_str()), Some("keep me"));
    }

    #[tokio::test]
    async fn test_audio_data_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = tagged_file(dir.path(), &Tag::new());

        let mut record = Record::new(&path);
        record.genre = vec!["Grunge".to_string()];
        Id3Writer::new().write(&path, &record).await.unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.ends_with(&AUDIO));
    }

    #[tokio::test]
    async fn test_empty_record_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut tag = Tag::new();
        tag.set_artist("Nirvana");
        let path = tagged_file(dir.path(), &tag);
        let before = std::fs::read(&path).unwrap();

        Id3Writer::new()
            .write(&path, &Record::new(&path))
            .await
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_v23_tag_upgraded_with_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        std::fs::write(&path, AUDIO).unwrap();
        let mut tag = Tag::new();
        tag.set_artist("Nirvana");
        tag.set_year(1991);
        tag.write_to_path(&path, Version::Id3v23).unwrap();

        let mut record = Record::new(&path);
        record.genre = vec!["Grunge".to_string()];
        Id3Writer::new().write(&path, &record).await.unwrap();

        let written = Tag::read_from_path(&path).unwrap();
        assert_eq!(written.version(), Version::Id3v24);
        assert!(written.get("TYER").is_none());
        assert_eq!(written.get("TDRC").unwrap().content().text(), Some("1991"));
        assert_eq!(written.artist(), Some("Nirvana"));
    }

    #[tokio::test]
    async fn test_read_then_write_keeps_values_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let mut tag = Tag::new();
        tag.set_artist("Nirvana ");
        tag.set_title(" Lithium");
        let path = tagged_file(dir.path(), &tag);

        let mut record = Record::new(&path);
        Id3Reader::new().populate(&mut record).await.unwrap();
        record.genre = vec!["Grunge".to_string()];
        Id3Writer::new().write(&path, &record).await.unwrap();

        let written = Tag::read_from_path(&path).unwrap();
        assert_eq!(written.artist(), Some("Nirvana "));
        assert_eq!(written.title(), Some(" Lithium"));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_original_and_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.mp3");
        let original = b"ID3\x09\x00\x00\x00\x00\x00\x10garbagegarbage!!".to_vec();
        std::fs::write(&path, &original).unwrap();

        let mut record = Record::new(&path);
        record.genre = vec!["Grunge".to_string()];
        let result = Id3Writer::new().write(&path, &record).await;

        assert!(matches!(result, Err(TagError::Write { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), original);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
