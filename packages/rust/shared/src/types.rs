//! Persisted data types for lessondex indexes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current schema version for the index manifest format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// IndexId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for built index identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexId(pub Uuid);

impl IndexId {
    /// Generate a new time-sortable index identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for IndexId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IndexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for IndexId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// IndexManifest
// ---------------------------------------------------------------------------

/// The `manifest.json` structure stored at the root of each index directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Unique identifier for this index build.
    pub id: IndexId,
    /// Human-readable name.
    pub name: String,
    /// Directory (or first path) the lessons were read from.
    pub source_root: String,
    /// Tool version that created this index.
    pub tool_version: String,
    /// When the index was built.
    pub created_at: DateTime<Utc>,
    /// Number of lesson documents indexed.
    pub document_count: usize,
    /// Number of question/answer pairs across all documents.
    pub question_count: usize,
    /// Per-document metadata, in index order.
    #[serde(default)]
    pub documents: Vec<DocumentMeta>,
}

/// Metadata for one indexed lesson document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Root-relative path of the source file.
    pub path: String,
    /// Document title (first H1, or derived from the file name).
    pub title: String,
    /// SHA-256 of the raw document text.
    pub sha256: String,
    pub section_count: usize,
    pub question_count: usize,
}

// ---------------------------------------------------------------------------
// Toc
// ---------------------------------------------------------------------------

/// A single entry in the table of contents (`toc.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Display title.
    pub title: String,
    /// Root-relative path without extension (e.g., `testing/mocking`).
    pub path: String,
    /// Ordered outline of the document's headings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<TocSection>,
    /// Number of Knowledge Check questions in the document.
    #[serde(default)]
    pub question_count: usize,
    /// Nested child entries (documents inside a directory group).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

/// One heading in a document outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocSection {
    pub level: u8,
    pub heading: String,
}

/// Root structure for `toc.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toc {
    /// Top-level entries.
    pub sections: Vec<TocEntry>,
}

// ---------------------------------------------------------------------------
// StudySet
// ---------------------------------------------------------------------------

/// One flattened question/answer card, tagged with its source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyCard {
    /// Path of the document the card came from.
    pub path: String,
    /// Title of that document.
    pub document_title: String,
    /// Question number from the `**Q<N>.**` marker.
    pub number: u32,
    pub question: String,
    pub answer: String,
}

/// Root structure for `study-set.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySet {
    pub cards: Vec<StudyCard>,
}
