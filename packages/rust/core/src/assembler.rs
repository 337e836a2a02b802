//! Index directory assembler.
//!
//! Takes a built [`CorpusIndex`] and writes the index directory to disk:
//!
//! ```text
//! <output_dir>/
//! ├── manifest.json
//! ├── toc.json
//! ├── study-set.json
//! └── study-set.md
//! ```

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, instrument};

use lessondex_shared::{
    CURRENT_SCHEMA_VERSION, DocumentMeta, IndexId, IndexManifest, LessondexError, Result,
    StudyCard, StudySet, Toc,
};

use crate::discover::relative_slash_path;
use crate::indexer::CorpusIndex;
use crate::toc::{build_toc, document_title};

const MANIFEST_FILE: &str = "manifest.json";
const TOC_FILE: &str = "toc.json";
const STUDY_SET_FILE: &str = "study-set.json";
const STUDY_SET_MD_FILE: &str = "study-set.md";

/// Configuration for index assembly.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Human-readable name.
    pub name: String,
    /// Directory the lessons were discovered under; paths are stored relative to it.
    pub source_root: Option<PathBuf>,
    /// Directory the index files are written to.
    pub output_dir: PathBuf,
    /// Tool version string.
    pub tool_version: String,
}

/// Output from a successful assembly.
#[derive(Debug, Clone)]
pub struct AssembleResult {
    /// Directory holding the written files.
    pub index_path: PathBuf,
    /// The manifest that was written.
    pub manifest: IndexManifest,
}

/// Write the index directory for `index`.
#[instrument(skip_all, fields(name = %config.name, documents = index.len()))]
pub fn assemble(config: &AssembleConfig, index: &CorpusIndex) -> Result<AssembleResult> {
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir).map_err(|e| LessondexError::io(dir, e))?;
    info!(path = %dir.display(), "assembling index directory");

    let root = config.source_root.as_deref();
    let manifest = build_manifest(config, index);
    let toc = build_toc(index, root);
    let study_set = build_study_set(index, root);

    write_json(&dir.join(MANIFEST_FILE), &manifest)?;
    write_json(&dir.join(TOC_FILE), &toc)?;
    write_json(&dir.join(STUDY_SET_FILE), &study_set)?;
    write_atomic(
        &dir.join(STUDY_SET_MD_FILE),
        &render_study_set(&config.name, &study_set),
    )?;

    info!(
        documents = manifest.document_count,
        questions = manifest.question_count,
        "index assembly complete"
    );

    Ok(AssembleResult {
        index_path: dir.clone(),
        manifest,
    })
}

/// Flatten the index's study set into persisted cards.
pub fn build_study_set(index: &CorpusIndex, root: Option<&Path>) -> StudySet {
    let cards = index
        .study_set()
        .iter()
        .map(|item| {
            let document_title = index
                .get(&item.path)
                .map(document_title)
                .unwrap_or_default();
            StudyCard {
                path: display_path(&item.path, root),
                document_title,
                number: item.pair.number,
                question: item.pair.question.clone(),
                answer: item.pair.answer.clone(),
            }
        })
        .collect();

    StudySet { cards }
}

/// Render cards back to the `**Q<N>.**` / `**A<N>.**` lesson convention,
/// grouped under one heading per source document.
pub fn render_study_set(name: &str, study_set: &StudySet) -> String {
    let mut md = format!("# {name} study set\n");
    let mut current: Option<&str> = None;

    for card in &study_set.cards {
        if current != Some(card.path.as_str()) {
            md.push_str(&format!("\n## {}\n\n_{}_\n", card.document_title, card.path));
            current = Some(card.path.as_str());
        }
        md.push_str(&format!("\n**Q{}.** {}\n", card.number, card.question));
        md.push_str(&format!("\n**A{}.** {}\n", card.number, card.answer));
    }

    md
}

/// Verify that an index directory is well-formed and return its manifest.
pub fn validate_index(dir: &Path) -> Result<IndexManifest> {
    for file in [MANIFEST_FILE, TOC_FILE, STUDY_SET_FILE] {
        if !dir.join(file).exists() {
            return Err(LessondexError::validation(format!("missing {file}")));
        }
    }

    let manifest: IndexManifest = read_json(&dir.join(MANIFEST_FILE))?;
    if manifest.schema_version != CURRENT_SCHEMA_VERSION {
        return Err(LessondexError::validation(format!(
            "unsupported schema_version: {} (expected {})",
            manifest.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }

    let _toc: Toc = read_json(&dir.join(TOC_FILE))?;
    let study_set: StudySet = read_json(&dir.join(STUDY_SET_FILE))?;
    if study_set.cards.len() != manifest.question_count {
        return Err(LessondexError::validation(format!(
            "study set has {} cards, manifest says {}",
            study_set.cards.len(),
            manifest.question_count
        )));
    }

    Ok(manifest)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_manifest(config: &AssembleConfig, index: &CorpusIndex) -> IndexManifest {
    let root = config.source_root.as_deref();
    let documents = index
        .documents()
        .iter()
        .map(|doc| DocumentMeta {
            path: display_path(doc.path(), root),
            title: document_title(doc),
            sha256: doc.content_hash().to_string(),
            section_count: doc.sections().len(),
            question_count: doc.knowledge_check().iter().count(),
        })
        .collect();

    IndexManifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        id: IndexId::new(),
        name: config.name.clone(),
        source_root: root.map(|r| r.display().to_string()).unwrap_or_default(),
        tool_version: config.tool_version.clone(),
        created_at: Utc::now(),
        document_count: index.len(),
        question_count: index.question_count(),
        documents,
    }
}

fn display_path(path: &Path, root: Option<&Path>) -> String {
    relative_slash_path(path, root.unwrap_or(Path::new("")))
}

/// Write a JSON file (pretty-printed).
fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).map_err(|e| {
        LessondexError::validation(format!("JSON serialization failed: {e}"))
    })?;
    write_atomic(path, &json)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| LessondexError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        LessondexError::validation(format!("invalid {}: {e}", path.display()))
    })
}

/// Write to a dot-prefixed temp file, then rename over the target.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| LessondexError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| LessondexError::io(path, e))?;

    debug!(path = %path.display(), size = content.len(), "wrote file");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
