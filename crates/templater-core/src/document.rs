//! Documents being annotated
//!
//! A document is either a configuration file (identified by its path) or a
//! directive, a single command line identified by the command itself.
//! Document text is immutable once loaded; every offset handed around the
//! crate is a character index into it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::models::Interval;

/// Which parameter namespace a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentMode {
    /// A model configuration file
    Config,
    /// A single-line run command
    Directive,
}

impl DocumentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentMode::Config => "config",
            DocumentMode::Directive => "directive",
        }
    }
}

impl fmt::Display for DocumentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded document snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    mode: DocumentMode,
    /// File path for configs, the command for directives
    id: String,
    /// Working directory a directive runs in
    cwd: Option<String>,
    content: String,
}

impl Document {
    /// A configuration file at `path` with the given contents
    pub fn config(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            mode: DocumentMode::Config,
            id: path.into(),
            cwd: None,
            content: content.into(),
        }
    }

    /// A directive; the command line is both identifier and content
    pub fn directive(command: impl Into<String>, cwd: Option<String>) -> Self {
        let command = command.into();
        Self {
            mode: DocumentMode::Directive,
            id: command.clone(),
            cwd,
            content: command,
        }
    }

    pub fn mode(&self) -> DocumentMode {
        self.mode
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cwd(&self) -> Option<&str> {
        self.cwd.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length of the content in characters
    pub fn char_len(&self) -> usize {
        char_len(&self.content)
    }

    /// Text covered by `interval`, clamped to the document
    pub fn slice(&self, interval: Interval) -> &str {
        char_slice(&self.content, interval.start, interval.end)
    }

    /// Text from the start of the line containing `offset` up to `offset`
    pub fn line_prefix(&self, offset: usize) -> &str {
        let before = char_slice(&self.content, 0, offset);
        match before.rfind('\n') {
            Some(pos) => &before[pos + 1..],
            None => before,
        }
    }

    /// Hex SHA-256 of the content
    ///
    /// Stored alongside saved parameters so a later load can tell whether
    /// the underlying file changed.
    pub fn content_hash(&self) -> String {
        hash_hex(&self.content)
    }
}

/// Hex SHA-256 of an arbitrary string
pub fn hash_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the `char_idx`-th character, or `text.len()` past the end
fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Slice `text` by character offsets, clamping both ends
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let from = byte_index(text, start);
    let to = byte_index(text, end);
    &text[from..to.max(from)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_document() {
        let doc = Document::config("/model/params.yaml", "rate: 0.5\n");
        assert_eq!(doc.mode(), DocumentMode::Config);
        assert_eq!(doc.id(), "/model/params.yaml");
        assert_eq!(doc.content(), "rate: 0.5\n");
        assert!(doc.cwd().is_none());
    }

    #[test]
    fn test_directive_document_uses_command_as_id() {
        let doc = Document::directive("python run.py --rate 0.5", Some("/home/clouseau".into()));
        assert_eq!(doc.mode(), DocumentMode::Directive);
        assert_eq!(doc.id(), doc.content());
        assert_eq!(doc.cwd(), Some("/home/clouseau"));
    }

    #[test]
    fn test_char_slice_multibyte() {
        let text = "größe = 10";
        assert_eq!(char_len(text), 10);
        assert_eq!(char_slice(text, 0, 5), "größe");
        assert_eq!(char_slice(text, 8, 10), "10");
    }

    #[test]
    fn test_char_slice_clamps() {
        assert_eq!(char_slice("abc", 1, 99), "bc");
        assert_eq!(char_slice("abc", 5, 9), "");
        assert_eq!(char_slice("abc", 2, 1), "");
    }

    #[test]
    fn test_line_prefix() {
        let doc = Document::config("a.cfg", "first line\nsecond --rate 3");
        assert_eq!(doc.line_prefix(25), "second --rate ");
        assert_eq!(doc.line_prefix(5), "first");
    }

    #[test]
    fn test_content_hash_changes_with_content() {
        let a = Document::config("a.cfg", "x = 1");
        let b = Document::config("a.cfg", "x = 2");
        assert_eq!(a.content_hash().len(), 64);
        assert_ne!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash(), hash_hex("x = 1"));
    }
}
