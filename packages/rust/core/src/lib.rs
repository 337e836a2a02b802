//! Corpus-level logic for lessondex.
//!
//! This crate ties lesson discovery, parsing, and indexing together and
//! turns the result into a TOC, lint reports, and an on-disk index.

pub mod assembler;
pub mod check;
pub mod discover;
pub mod indexer;
pub mod toc;

pub use indexer::{CorpusIndex, ProgressReporter, SilentProgress, StudyItem, index_paths};
