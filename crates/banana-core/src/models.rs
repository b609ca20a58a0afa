//! Data models for Banana Book
//!
//! Both entity types share one shape: a store-assigned integer id and a
//! single text payload. [`Record`] describes that shape so the store and the
//! view cache can be written once for notes and images alike.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum note length, in characters
pub const MAX_NOTE_CHARS: usize = 4000;

/// A row of an entity table: an immutable id plus one mutable payload
pub trait Record: Clone + fmt::Debug + Send + 'static {
    /// Table holding this entity
    const TABLE: &'static str;
    /// Column holding the payload
    const PAYLOAD_COLUMN: &'static str;

    /// Build a record from a stored row
    fn from_row(id: i64, payload: String) -> Self;

    fn id(&self) -> i64;

    fn payload(&self) -> &str;

    fn set_payload(&mut self, payload: String);
}

/// A text note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    /// Store-assigned identifier
    pub id: i64,
    /// Note body
    pub text: String,
}

impl Note {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

impl Record for Note {
    const TABLE: &'static str = "notes";
    const PAYLOAD_COLUMN: &'static str = "note";

    fn from_row(id: i64, payload: String) -> Self {
        Self { id, text: payload }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn payload(&self) -> &str {
        &self.text
    }

    fn set_payload(&mut self, payload: String) {
        self.text = payload;
    }
}

/// A captured or imported image
///
/// Only a reference to the image bytes is stored, never the pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    /// Store-assigned identifier
    pub id: i64,
    /// Filesystem path or content URI of the image
    pub uri: String,
}

impl Image {
    pub fn new(id: i64, uri: impl Into<String>) -> Self {
        Self {
            id,
            uri: uri.into(),
        }
    }
}

impl Record for Image {
    const TABLE: &'static str = "images";
    const PAYLOAD_COLUMN: &'static str = "image";

    fn from_row(id: i64, payload: String) -> Self {
        Self { id, uri: payload }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn payload(&self) -> &str {
        &self.uri
    }

    fn set_payload(&mut self, payload: String) {
        self.uri = payload;
    }
}

/// Rejected note input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Note text cannot be empty")]
    Empty,

    #[error("Note text is {len} characters; the limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Note text that passed the input checks
///
/// The store itself accepts any payload; this type is how the input layer
/// proves the length limit was respected before a write is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteText(String);

impl NoteText {
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        validate_note_text(&text)?;
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NoteText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NoteText {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Check note text against the input constraints
pub fn validate_note_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let len = text.chars().count();
    if len > MAX_NOTE_CHARS {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_NOTE_CHARS,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_text_at_limit_is_accepted() {
        let text = "a".repeat(MAX_NOTE_CHARS);
        let note_text = NoteText::new(text.clone()).unwrap();
        assert_eq!(note_text.as_str().len(), MAX_NOTE_CHARS);
        assert_eq!(note_text.into_inner(), text);
    }

    #[test]
    fn test_note_text_over_limit_is_rejected() {
        let err = NoteText::new("a".repeat(MAX_NOTE_CHARS + 1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                len: MAX_NOTE_CHARS + 1,
                max: MAX_NOTE_CHARS
            }
        );
        assert!(err.to_string().contains("4000"));
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        // 4000 three-byte characters is 12000 bytes but still within the limit
        let text = "€".repeat(MAX_NOTE_CHARS);
        assert!(validate_note_text(&text).is_ok());

        let text = "€".repeat(MAX_NOTE_CHARS + 1);
        assert!(validate_note_text(&text).is_err());
    }

    #[test]
    fn test_blank_note_text_is_rejected() {
        assert_eq!(NoteText::new(""), Err(ValidationError::Empty));
        assert_eq!(NoteText::new("  \n\t"), Err(ValidationError::Empty));
        assert!(NoteText::try_from("Buy milk".to_string()).is_ok());
    }

    #[test]
    fn test_record_payload_accessors() {
        let mut note = Note::from_row(7, "Call Sam".to_string());
        assert_eq!(note.id(), 7);
        assert_eq!(note.payload(), "Call Sam");
        note.set_payload("Call Sam at 5pm".to_string());
        assert_eq!(note.text, "Call Sam at 5pm");

        let mut image = Image::from_row(3, "file:///tmp/a.jpg".to_string());
        assert_eq!(image.payload(), "file:///tmp/a.jpg");
        image.set_payload("file:///tmp/b.jpg".to_string());
        assert_eq!(image.uri, "file:///tmp/b.jpg");
    }

    #[test]
    fn test_note_serialization() {
        let note = Note::new(1, "Buy milk");
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(json, r#"{"id":1,"text":"Buy milk"}"#);

        let parsed: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, note);
    }
}
