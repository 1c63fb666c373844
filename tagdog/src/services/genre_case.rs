//! Genre name case normalization
//!
//! Title-cases free-form genre labels ("post-hardcore" → "Post-Hardcore") with a
//! small override table for words standard title-casing gets wrong ("r&b" → "R&B").
//!
//! Rules, applied per whitespace-separated word:
//! 1. Override table match (case-insensitive) → canonical form
//! 2. Hyphen or slash compounds → each segment cased on its own
//! 3. Inline period ("r.e.m.") or inner capital ("McCoy") → kept as-is
//! 4. Small word ("and", "of", ...) not at a boundary → lowercase
//! 5. Otherwise the first letter is upper-cased, unless the word starts with a
//!    digit ("80s" stays "80s")
//!
//! If that leaves the whole result upper case ("HEAVY METAL", "uk DRILL"), the
//! input is lowered and cased again.

use crate::error::TagResult;
use crate::types::{Populator, Record};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical spellings keyed by lowercase word
static GENRE_CASE_OVERRIDES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("r&b", "R&B"),
        ("edm", "EDM"),
        ("idm", "IDM"),
        ("uk", "UK"),
        ("dj", "DJ"),
        ("mpb", "MPB"),
    ])
});

const SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "en", "for", "if", "in", "n", "nor", "of",
    "on", "or", "per", "the", "to", "v", "v.", "via", "vs", "vs.",
];

/// Normalize the capitalization of a genre name
///
/// When per-word casing leaves the whole result upper case, the input is lowered
/// and cased again. Testing the cased result, not the input, keeps
/// `normalize(normalize(g)) == normalize(g)`.
pub fn normalize(genre: &str) -> String {
    let cased = case_words(genre);
    if is_all_caps(&cased) {
        case_words(&genre.to_lowercase())
    } else {
        cased
    }
}

fn case_words(genre: &str) -> String {
    let words: Vec<&str> = genre.split_whitespace().collect();
    let last = words.len().saturating_sub(1);

    words
        .iter()
        .enumerate()
        .map(|(i, word)| case_word(word, i == 0 || i == last))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

fn case_word(word: &str, boundary: bool) -> String {
    if let Some(canonical) = GENRE_CASE_OVERRIDES.get(word.to_lowercase().as_str()) {
        return (*canonical).to_string();
    }

    for separator in ['-', '/'] {
        if word.contains(separator) {
            return case_compound(word, separator);
        }
    }

    if has_inline_period(word) || has_inner_capital(word) {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if !boundary && SMALL_WORDS.iter().any(|small| *small == lower) {
        return lower;
    }

    capitalize_first(word)
}

/// Only the outer segments of a compound count as boundaries ("Drum-and-Bass")
fn case_compound(word: &str, separator: char) -> String {
    let segments: Vec<&str> = word.split(separator).collect();
    let last = segments.len() - 1;
    let separator = separator.to_string();

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| case_word(segment, i == 0 || i == last))
        .collect::<Vec<_>>()
        .join(separator.as_str())
}

fn has_inline_period(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    chars
        .windows(3)
        .any(|w| w[0].is_alphanumeric() && w[1] == '.' && w[2].is_alphanumeric())
}

/// Upper-case letter after the first one in the leading run of letters
fn has_inner_capital(word: &str) -> bool {
    word.trim_start_matches(|c: char| c.is_ascii_punctuation())
        .chars()
        .take_while(|c| c.is_alphabetic())
        .skip(1)
        .any(char::is_uppercase)
}

fn capitalize_first(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut chars = word.chars();

    for c in chars.by_ref() {
        if c.is_ascii_punctuation() {
            out.push(c);
            continue;
        }
        if c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        break;
    }

    out.push_str(chars.as_str());
    out
}

/// Populator that re-cases genres already present on the record
pub struct GenreCaseFixer;

#[async_trait]
impl Populator for GenreCaseFixer {
    fn name(&self) -> &'static str {
        "GenreCaseFixer"
    }

    async fn populate(&self, record: &mut Record) -> TagResult<()> {
        if !record.genre.is_empty() {
            record.genre = record.genre.iter().map(|g| normalize(g)).collect();
        }
        Ok(())
    }
}
