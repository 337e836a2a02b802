//! Application configuration for lessondex.
//!
//! User config lives at `~/.lessondex/lessondex.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LessondexError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "lessondex.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".lessondex";

// ---------------------------------------------------------------------------
// Config structs (matching lessondex.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Lesson document conventions.
    #[serde(default)]
    pub lessons: LessonsConfig,

    /// Directory walking rules.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Registered lesson folders.
    #[serde(default)]
    pub corpora: Vec<CorpusEntry>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default index output directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File extensions treated as lesson documents.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            extensions: default_extensions(),
        }
    }
}

fn default_output_dir() -> String {
    "lessondex-index".into()
}
fn default_extensions() -> Vec<String> {
    vec!["md".into(), "markdown".into()]
}

/// `[lessons]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonsConfig {
    /// Heading text that opens the Q&A block (compared case-insensitively).
    #[serde(default = "default_knowledge_check_heading")]
    pub knowledge_check_heading: String,
}

impl Default for LessonsConfig {
    fn default() -> Self {
        Self {
            knowledge_check_heading: default_knowledge_check_heading(),
        }
    }
}

fn default_knowledge_check_heading() -> String {
    "Knowledge Check".into()
}

/// `[discovery]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Regexes matched against root-relative paths; matches are skipped.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// `[[corpora]]` entry: a registered lesson folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Human-readable name.
    pub name: String,
    /// Path to the lesson directory on disk.
    pub path: String,
}

impl AppConfig {
    /// Look up a registered corpus by name.
    pub fn corpus(&self, name: &str) -> Option<&CorpusEntry> {
        self.corpora.iter().find(|c| c.name == name)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.lessondex/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| LessondexError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.lessondex/lessondex.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LessondexError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LessondexError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LessondexError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LessondexError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LessondexError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
