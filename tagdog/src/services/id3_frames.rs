//! Mapping between [`TagField`] and ID3v2 frames
//!
//! Multi-valued text frames use the ID3v2.4 NUL separator. Values are kept
//! verbatim, so a field read and written back is unchanged.
//!
//! ID3v2.3 stores the recording date across TYER, TDAT and TIME. Reads fall back
//! to those when TDRC is absent, and [`upgrade_legacy_frames`] folds them into
//! TDRC before a tag is written as ID3v2.4.

use crate::types::TagField;
use id3::frame::ExtendedText;
use id3::{ErrorKind, Tag, TagLike};
use std::path::Path;

/// ID3v2.3 frames that ID3v2.4 replaces with TDRC and TDOR
const LEGACY_FRAMES: [&str; 5] = ["TYER", "TDAT", "TIME", "TRDA", "TORY"];

/// Where a field lives inside an ID3v2 tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum FrameKey {
    /// Standard text frame (TPE1, TIT2, ...)
    Text(&'static str),
    /// User-defined TXXX frame with this description
    UserText(&'static str),
}

pub(crate) fn frame_key(field: TagField) -> FrameKey {
    match field {
        TagField::Artist => FrameKey::Text("TPE1"),
        TagField::Author => FrameKey::Text("TOLY"),
        TagField::Title => FrameKey::Text("TIT2"),
        TagField::Album => FrameKey::Text("TALB"),
        TagField::Genre => FrameKey::Text("TCON"),
        TagField::Date => FrameKey::Text("TDRC"),
        TagField::Performer => FrameKey::UserText("PERFORMER"),
        TagField::Composer => FrameKey::Text("TCOM"),
        TagField::Conductor => FrameKey::Text("TPE3"),
        TagField::Lyricist => FrameKey::Text("TEXT"),
        TagField::Arranger => FrameKey::Text("TPE4"),
        TagField::TrackNumber => FrameKey::Text("TRCK"),
        TagField::DiscNumber => FrameKey::Text("TPOS"),
        TagField::DiscSubtitle => FrameKey::Text("TSST"),
        TagField::Language => FrameKey::Text("TLAN"),
    }
}

/// Read the ID3 tag at `path`; a file without one yields an empty tag
pub(crate) fn read_tag(path: &Path) -> Result<Tag, id3::Error> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(tag),
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => Ok(Tag::new()),
        Err(e) => Err(e),
    }
}

/// Values stored for `field`, empty when the frame is absent
pub(crate) fn read_field(tag: &Tag, field: TagField) -> Vec<String> {
    let raw = match frame_key(field) {
        FrameKey::Text(id) => tag
            .get(id)
            .and_then(|frame| frame.content().text())
            .map(str::to_string),
        FrameKey::UserText(description) => tag
            .extended_texts()
            .find(|ext| ext.description == description)
            .map(|ext| ext.value.clone()),
    };

    let raw = match (raw, field) {
        (None, TagField::Date) => legacy_date(tag),
        (raw, _) => raw,
    };

    raw.map(|text| split_values(&text)).unwrap_or_default()
}

/// Move ID3v2.3-only date frames into their ID3v2.4 equivalents
///
/// Existing TDRC/TDOR frames win over the legacy values.
pub(crate) fn upgrade_legacy_frames(tag: &mut Tag) {
    if tag.get("TDRC").is_none() {
        if let Some(date) = legacy_date(tag) {
            tag.set_text("TDRC", date);
        }
    }
    if tag.get("TDOR").is_none() {
        if let Some(year) = frame_text(tag, "TORY").map(str::to_string) {
            tag.set_text("TDOR", year);
        }
    }

    for id in LEGACY_FRAMES {
        tag.remove(id);
    }
}

/// TYER with optional TDAT (DDMM) and TIME (HHMM), as "YYYY[-MM-DD[THH:MM]]"
fn legacy_date(tag: &Tag) -> Option<String> {
    let mut date = frame_text(tag, "TYER")?.to_string();

    if let Some(ddmm) = frame_text(tag, "TDAT").filter(|d| is_digits(d, 4)) {
        date.push_str(&format!("-{}-{}", &ddmm[2..], &ddmm[..2]));

        if let Some(hhmm) = frame_text(tag, "TIME").filter(|t| is_digits(t, 4)) {
            date.push_str(&format!("T{}:{}", &hhmm[..2], &hhmm[2..]));
        }
    }

    Some(date)
}

fn frame_text<'a>(tag: &'a Tag, id: &str) -> Option<&'a str> {
    tag.get(id)
        .and_then(|frame| frame.content().text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn is_digits(text: &str, len: usize) -> bool {
    text.len() == len && text.bytes().all(|b| b.is_ascii_digit())
}

/// Replace the frame for `field` with `values`
pub(crate) fn write_field(tag: &mut Tag, field: TagField, values: &[String]) {
    let joined = values.join("\0");
    match frame_key(field) {
        FrameKey::Text(id) => tag.set_text(id, joined),
        FrameKey::UserText(description) => {
            tag.remove_extended_text(Some(description), None);
            tag.add_frame(ExtendedText {
                description: description.to_string(),
                value: joined,
            });
        }
    }
}

fn split_values(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\0').map(str::to_string).collect()
}
