//! Corpus indexer.
//!
//! Loads lesson documents in the order the caller supplies and aggregates
//! them into a path → document mapping plus a flattened study set of every
//! question/answer pair. The indexer never reorders its input.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use lessondex_markdown::{LessonDocument, QaPair};
use lessondex_shared::Result;

/// Progress callback trait for long-running index builds.
pub trait ProgressReporter {
    /// Called after each document is parsed.
    fn document_loaded(&self, path: &Path, current: usize, total: usize);
    /// Called when the index is complete.
    fn done(&self, index: &CorpusIndex);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn document_loaded(&self, _path: &Path, _current: usize, _total: usize) {}
    fn done(&self, _index: &CorpusIndex) {}
}

/// One entry of the flattened study set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyItem {
    /// Path of the document the pair came from.
    pub path: PathBuf,
    pub pair: QaPair,
}

/// All indexed documents plus the flattened study set.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    documents: Vec<LessonDocument>,
    by_path: HashMap<PathBuf, usize>,
    study_set: Vec<StudyItem>,
}

impl CorpusIndex {
    /// Build an index from already-parsed documents, keeping their order.
    ///
    /// A repeated path keeps its first occurrence.
    pub fn from_documents(docs: impl IntoIterator<Item = LessonDocument>) -> Self {
        let mut index = Self::default();
        for doc in docs {
            index.insert(doc);
        }
        index
    }

    fn insert(&mut self, doc: LessonDocument) {
        if self.by_path.contains_key(doc.path()) {
            debug!(path = %doc.path().display(), "duplicate path, keeping first");
            return;
        }

        self.study_set.extend(doc.knowledge_check().iter().map(|pair| StudyItem {
            path: doc.path().to_path_buf(),
            pair,
        }));
        self.by_path.insert(doc.path().to_path_buf(), self.documents.len());
        self.documents.push(doc);
    }

    /// Look up a document by the path it was indexed under.
    pub fn get(&self, path: &Path) -> Option<&LessonDocument> {
        self.by_path.get(path).map(|&i| &self.documents[i])
    }

    /// Documents in index order.
    pub fn documents(&self) -> &[LessonDocument] {
        &self.documents
    }

    /// Every question/answer pair across all documents, in index order.
    pub fn study_set(&self) -> &[StudyItem] {
        &self.study_set
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn question_count(&self) -> usize {
        self.study_set.len()
    }
}

/// Load every path and build the index.
///
/// Stops at the first document that cannot be read or decoded.
#[instrument(skip_all, fields(count = paths.len()))]
pub fn index_paths<P: AsRef<Path>>(
    paths: &[P],
    progress: &dyn ProgressReporter,
) -> Result<CorpusIndex> {
    let total = paths
        .iter()
        .map(|p| p.as_ref())
        .collect::<HashSet<&Path>>()
        .len();
    let mut index = CorpusIndex::default();

    for path in paths {
        let path = path.as_ref();
        if index.by_path.contains_key(path) {
            debug!(path = %path.display(), "duplicate path, skipping");
            continue;
        }

        let doc = LessonDocument::load(path)?;
        index.insert(doc);
        progress.document_loaded(path, index.len(), total);
    }

    info!(
        documents = index.len(),
        questions = index.question_count(),
        "corpus indexed"
    );
    progress.done(&index);

    Ok(index)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use lessondex_shared::LessondexError;

    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/lessons")
            .join(name)
    }

    #[derive(Default)]
    struct RecordingProgress {
        loaded: RefCell<Vec<(usize, usize)>>,
        finished: RefCell<bool>,
    }

    impl ProgressReporter for RecordingProgress {
        fn document_loaded(&self, _path: &Path, current: usize, total: usize) {
            self.loaded.borrow_mut().push((current, total));
        }

        fn done(&self, _index: &CorpusIndex) {
            *self.finished.borrow_mut() = true;
        }
    }

    #[test]
    fn indexes_in_supplied_order() {
        let paths = vec![
            fixture("testing/02-mocking.md"),
            fixture("01-introduction.md"),
            fixture("testing/01-testing.md"),
        ];
        let index = index_paths(&paths, &SilentProgress).unwrap();

        assert_eq!(index.len(), 3);
        let order: Vec<&Path> = index.documents().iter().map(|d| d.path()).collect();
        assert_eq!(order, paths.iter().map(PathBuf::as_path).collect::<Vec<_>>());

        // Study set follows document order, then in-document order.
        let firsts: Vec<(&Path, u32)> = index
            .study_set()
            .iter()
            .map(|item| (item.path.as_path(), item.pair.number))
            .collect();
        assert_eq!(firsts.len(), 7);
        assert_eq!(firsts[0], (paths[0].as_path(), 1));
        assert_eq!(firsts[1], (paths[0].as_path(), 2));
        assert_eq!(firsts[2], (paths[1].as_path(), 1));
        assert_eq!(firsts[6], (paths[2].as_path(), 3));
    }

    #[test]
    fn lookup_by_path() {
        let paths = vec![fixture("01-introduction.md")];
        let index = index_paths(&paths, &SilentProgress).unwrap();

        let doc = index.get(&paths[0]).expect("indexed");
        assert_eq!(doc.title(), Some("Introduction to React"));
        assert!(index.get(Path::new("missing.md")).is_none());
    }

    #[test]
    fn reports_progress() {
        let paths = vec![fixture("01-introduction.md"), fixture("testing/02-mocking.md")];
        let progress = RecordingProgress::default();
        index_paths(&paths, &progress).unwrap();

        assert_eq!(*progress.loaded.borrow(), vec![(1, 2), (2, 2)]);
        assert!(*progress.finished.borrow());
    }

    #[test]
    fn repeated_path_is_read_once() {
        let intro = fixture("01-introduction.md");
        let mocking = fixture("testing/02-mocking.md");
        let paths = vec![intro.clone(), intro.clone(), mocking.clone(), intro];
        let progress = RecordingProgress::default();
        let index = index_paths(&paths, &progress).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.question_count(), 4);
        assert_eq!(index.documents()[1].path(), mocking.as_path());
        assert_eq!(*progress.loaded.borrow(), vec![(1, 2), (2, 2)]);
        assert!(*progress.finished.borrow());
    }

    #[test]
    fn unreadable_path_aborts() {
        let paths = vec![fixture("01-introduction.md"), fixture("does-not-exist.md")];
        let err = index_paths(&paths, &SilentProgress).unwrap_err();
        assert!(matches!(err, LessondexError::Read { .. }));
    }

    #[test]
    fn duplicates_are_indexed_once() {
        let text = "# Dup\n\n**Q1.** a?\n\n**A1.** b.\n";
        let index = CorpusIndex::from_documents([
            LessonDocument::parse("dup.md", text),
            LessonDocument::parse("dup.md", "# Other\n"),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.question_count(), 1);
        assert_eq!(index.documents()[0].title(), Some("Dup"));
    }

    #[test]
    fn documents_without_questions_contribute_nothing() {
        let index = CorpusIndex::from_documents([
            LessonDocument::parse("plain.md", "# Plain\n\nNo questions here.\n"),
        ]);
        assert_eq!(index.len(), 1);
        assert!(index.study_set().is_empty());
    }

    #[test]
    fn empty_input() {
        let paths: Vec<PathBuf> = Vec::new();
        let index = index_paths(&paths, &SilentProgress).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.question_count(), 0);
    }
}
