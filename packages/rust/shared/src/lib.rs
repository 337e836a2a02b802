//! Shared types, error model, and configuration for lessondex.
//!
//! This crate is the foundation depended on by all other lessondex crates.
//! It provides:
//! - [`LessondexError`] is the unified error type
//! - Persisted types ([`IndexManifest`], [`Toc`], [`StudySet`], [`IndexId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CorpusEntry, DefaultsConfig, DiscoveryConfig, LessonsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{LessondexError, Result};
pub use types::{
    CURRENT_SCHEMA_VERSION, DocumentMeta, IndexId, IndexManifest, StudyCard, StudySet, Toc,
    TocEntry, TocSection,
};
