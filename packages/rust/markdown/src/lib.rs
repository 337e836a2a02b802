//! Lesson document parsing and Knowledge Check extraction.
//!
//! A lesson is a Markdown file made of heading-delimited sections, usually
//! closed by a "Knowledge Check" block of `**Q<N>.**` / `**A<N>.**` pairs.
//! Code fences are opaque text throughout: never interpreted, always kept
//! verbatim.

mod fence;
pub mod knowledge_check;
pub mod parser;

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use lessondex_shared::{LessondexError, Result};

pub use knowledge_check::{KnowledgeCheck, QaPair, QaPairs};
pub use parser::{Section, parse_sections};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// LessonDocument
// ---------------------------------------------------------------------------

/// One parsed lesson file. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonDocument {
    path: PathBuf,
    title: Option<String>,
    sections: Vec<Section>,
    content_hash: String,
    #[serde(skip)]
    source: String,
}

impl LessonDocument {
    /// Parse document text that is already known to be valid.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Self {
        let sections = parse_sections(text);
        let title = sections
            .iter()
            .find(|s| s.level == 1 && !s.heading.is_empty())
            .map(|s| s.heading.clone());

        Self {
            path: path.into(),
            title,
            sections,
            content_hash: sha256_hex(text),
            source: text.to_string(),
        }
    }

    /// Decode raw file bytes and parse them.
    ///
    /// Fails with [`LessondexError::Encoding`] on invalid UTF-8 or NUL bytes
    /// (binary content). A leading UTF-8 BOM is dropped.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Result<Self> {
        let path = path.into();
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        if bytes.contains(&0) {
            return Err(LessondexError::encoding(path, "contains NUL bytes (binary content)"));
        }
        let text = std::str::from_utf8(bytes)
            .map_err(|e| LessondexError::encoding(&path, e.to_string()))?;

        Ok(Self::parse(path, text))
    }

    /// Read and parse the file at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| LessondexError::read(path, e))?;
        let doc = Self::from_bytes(path, &bytes)?;
        debug!(
            title = doc.title.as_deref().unwrap_or("<untitled>"),
            sections = doc.sections.len(),
            "parsed lesson"
        );
        Ok(doc)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Text of the first level-1 heading.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The raw document text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Hex SHA-256 of the document text.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// The document's question/answer pairs, extracted lazily.
    pub fn knowledge_check(&self) -> KnowledgeCheck<'_> {
        KnowledgeCheck::new(&self.source)
    }

    /// The last section headed `heading` (case-insensitive).
    pub fn knowledge_check_section(&self, heading: &str) -> Option<&Section> {
        let wanted = heading.trim().to_lowercase();
        self.sections
            .iter()
            .rev()
            .find(|s| s.heading.to_lowercase() == wanted)
    }

    /// Approximate prose word count, skipping fenced code and heading markers.
    pub fn word_count(&self) -> usize {
        let mut fence = fence::FenceState::default();
        self.source
            .lines()
            .filter(|line| !fence.observe(line))
            .flat_map(str::split_whitespace)
            .filter(|w| !w.chars().all(|c| c == '#'))
            .count()
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/lessons")
            .join(name)
    }

    fn load_fixture(name: &str) -> LessonDocument {
        LessonDocument::load(&fixture_path(name))
            .unwrap_or_else(|e| panic!("failed to load fixture {name}: {e}"))
    }

    #[test]
    fn introduction_fixture_structure() {
        let doc = load_fixture("01-introduction.md");

        assert_eq!(doc.title(), Some("Introduction to React"));
        let headings: Vec<&str> = doc.sections().iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec!["Introduction to React", "Why React?", "Your First Component", "Knowledge Check"]
        );
        // The fenced `# not a heading` line stays in the body.
        assert!(doc.sections()[2].body.contains("# not a heading"));
    }

    #[test]
    fn introduction_fixture_knowledge_check() {
        let doc = load_fixture("01-introduction.md");
        let pairs = doc.knowledge_check().pairs();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].question, "What is React?");
        assert_eq!(
            pairs[0].answer,
            "React is a JavaScript library for building user interfaces."
        );
        assert!(pairs[1].answer.starts_with("Write a function that returns JSX:"));
        assert!(pairs[1].answer.contains("**Q9.** this marker lives inside a fence"));
        assert!(pairs[1].answer.ends_with("```"));
    }

    #[test]
    fn testing_fixture_strips_separators() {
        let doc = load_fixture("testing/01-testing.md");
        let pairs = doc.knowledge_check().pairs();

        let numbers: Vec<u32> = pairs.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(pairs[0].answer, "React Testing Library.");
        assert_eq!(
            pairs[1].answer,
            "Queries that mirror how users find elements make tests resilient to\nimplementation changes."
        );
    }

    #[test]
    fn knowledge_check_section_lookup() {
        let doc = load_fixture("testing/02-mocking.md");
        let section = doc.knowledge_check_section("knowledge check").expect("section");
        assert_eq!(section.level, 2);
        assert!(std::ptr::eq(section, doc.sections().last().unwrap()));
        assert!(doc.knowledge_check_section("Quiz").is_none());
    }

    #[test]
    fn title_and_paragraphs_only() {
        let doc = LessonDocument::parse("plain.md", "# Plain\n\nOne paragraph.\n\nTwo.\n");
        assert_eq!(doc.sections().len(), 1);
        assert!(doc.knowledge_check().pairs().is_empty());
    }

    #[test]
    fn untitled_document() {
        let doc = LessonDocument::parse("notes.md", "## Only a subsection\n\ntext\n");
        assert_eq!(doc.title(), None);
    }

    #[test]
    fn from_bytes_rejects_binary() {
        let result = LessonDocument::from_bytes("image.png", b"\x89PNG\r\n\x1a\n\0\0\0");
        assert!(matches!(result, Err(LessondexError::Encoding { .. })));

        let result = LessonDocument::from_bytes("latin1.md", b"caf\xe9");
        assert!(matches!(result, Err(LessondexError::Encoding { .. })));
    }

    #[test]
    fn from_bytes_strips_bom() {
        let doc = LessonDocument::from_bytes("bom.md", b"\xEF\xBB\xBF# Title\n").unwrap();
        assert_eq!(doc.title(), Some("Title"));
        assert!(!doc.source().starts_with('\u{feff}'));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let result = LessonDocument::load(Path::new("/nonexistent/lesson.md"));
        assert!(matches!(result, Err(LessondexError::Read { .. })));
    }

    #[test]
    fn parse_is_idempotent() {
        let text = "# T\n\nbody\n\n## Knowledge Check\n\n**Q1.** a?\n\n**A1.** b.\n";
        let a = LessonDocument::parse("t.md", text);
        let b = LessonDocument::parse("t.md", text);
        assert_eq!(a, b);
        assert_eq!(a.knowledge_check().pairs(), b.knowledge_check().pairs());
        assert_eq!(a.content_hash().len(), 64);
    }

    #[test]
    fn word_count_excludes_code() {
        let doc = LessonDocument::parse(
            "wc.md",
            "# Title\n\nOne two three.\n\n```\nlots of code words that should not count\n```\n",
        );
        assert_eq!(doc.word_count(), 4);
    }

    #[test]
    fn serializes_without_source() {
        let doc = LessonDocument::parse("s.md", "# S\n\nbody\n");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["title"], "S");
        assert!(json.get("source").is_none());
        assert_eq!(json["sections"][0]["heading"], "S");
    }
}
