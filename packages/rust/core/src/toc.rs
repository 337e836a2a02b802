//! TOC (Table of Contents) builder.
//!
//! Turns a [`CorpusIndex`] into a hierarchical `Toc` that maps to `toc.json`.
//! Documents in sub-directories are grouped under one entry per directory.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, instrument};

use lessondex_markdown::LessonDocument;
use lessondex_shared::{Toc, TocEntry, TocSection};

use crate::discover::relative_slash_path;
use crate::indexer::CorpusIndex;

/// Build a TOC from an index, with paths relative to `root`.
///
/// The builder:
/// 1. Creates one entry per document (title, slug path, heading outline)
/// 2. Groups documents under their parent directory entry
/// 3. Keeps index order: groups appear where their first document does
#[instrument(skip_all, fields(documents = index.len()))]
pub fn build_toc(index: &CorpusIndex, root: Option<&Path>) -> Toc {
    let mut sections: Vec<TocEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for doc in index.documents() {
        let entry = document_entry(doc, root);

        match parent_path(&entry.path) {
            Some(parent) => {
                let pos = *positions.entry(parent.clone()).or_insert_with(|| {
                    sections.push(group_entry(&parent));
                    sections.len() - 1
                });
                sections[pos].children.push(entry);
            }
            None => match positions.get(&entry.path) {
                // A `testing.md` next to `testing/` takes over the group entry.
                Some(&pos) => {
                    let children = std::mem::take(&mut sections[pos].children);
                    sections[pos] = TocEntry { children, ..entry };
                }
                None => {
                    positions.insert(entry.path.clone(), sections.len());
                    sections.push(entry);
                }
            },
        }
    }

    debug!(entries = sections.len(), "TOC built");
    Toc { sections }
}

/// Slug for a document path: root-relative, `/`-joined, extension removed.
pub fn slug_path(path: &Path, root: Option<&Path>) -> String {
    let stem = path.with_extension("");
    relative_slash_path(&stem, root.unwrap_or(Path::new("")))
}

/// Display title: the document's H1, else one derived from its file name.
pub fn document_title(doc: &LessonDocument) -> String {
    match doc.title() {
        Some(title) => title.to_string(),
        None => {
            let stem = doc
                .path()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            title_from_path(&stem)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn document_entry(doc: &LessonDocument, root: Option<&Path>) -> TocEntry {
    TocEntry {
        title: document_title(doc),
        path: slug_path(doc.path(), root),
        sections: doc
            .sections()
            .iter()
            .filter(|s| !s.is_preamble())
            .map(|s| TocSection {
                level: s.level,
                heading: s.heading.clone(),
            })
            .collect(),
        question_count: doc.knowledge_check().iter().count(),
        children: vec![],
    }
}

fn group_entry(path: &str) -> TocEntry {
    TocEntry {
        title: title_from_path(path),
        path: path.to_string(),
        sections: vec![],
        question_count: 0,
        children: vec![],
    }
}

/// Extract a human-readable title from a path slug.
///
/// Ordering prefixes like `02-` are dropped: `02-environment-setup` becomes
/// `Environment Setup`.
fn title_from_path(path: &str) -> String {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let segment = segment.trim_start_matches(|c: char| c.is_ascii_digit());
    let segment = match segment.strip_prefix(['-', '_', '.', ' ']) {
        Some(rest) if !rest.is_empty() => rest,
        _ if segment.is_empty() => path.rsplit('/').next().unwrap_or(path),
        _ => segment,
    };

    if segment == "index" || segment == "README" {
        return "Overview".to_string();
    }

    segment
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    format!("{upper}{}", chars.collect::<String>())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Get the parent path (all but the last segment).
fn parent_path(path: &str) -> Option<String> {
    path.rsplit_once('/').map(|(parent, _)| parent.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
