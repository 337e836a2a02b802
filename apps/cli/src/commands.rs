//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use lessondex_core::assembler::{AssembleConfig, assemble, build_study_set, validate_index};
use lessondex_core::check::check_index;
use lessondex_core::discover::{DiscoverOptions, expand_inputs, relative_slash_path};
use lessondex_core::toc::document_title;
use lessondex_core::{CorpusIndex, ProgressReporter, index_paths};
use lessondex_markdown::LessonDocument;
use lessondex_shared::{AppConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// lessondex: turn Markdown lesson notes into a navigable study index.
#[derive(Parser)]
#[command(
    name = "lessondex",
    version,
    about = "Parse Markdown lessons, extract Knowledge Check Q&A, and build a study index.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.lessondex/lessondex.toml.
    #[arg(long, global = true, env = "LESSONDEX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where to read lessons from: explicit paths or a registered corpus.
#[derive(clap::Args, Debug)]
pub(crate) struct Inputs {
    /// Lesson files or directories (directories are walked recursively).
    pub paths: Vec<PathBuf>,

    /// Name of a corpus registered in the config file.
    #[arg(long, conflicts_with = "paths")]
    pub corpus: Option<String>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Index lessons and write manifest, TOC, and study set files.
    Index {
        #[command(flatten)]
        inputs: Inputs,

        /// Output directory (defaults to `defaults.output_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Human-readable index name (defaults to the source directory name).
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print the title and heading outline of one lesson.
    Outline {
        /// Lesson file.
        file: PathBuf,

        /// Print the parsed document as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the Knowledge Check questions of the given lessons.
    Quiz {
        #[command(flatten)]
        inputs: Inputs,

        /// Print the study set as JSON.
        #[arg(long)]
        json: bool,

        /// Only print the questions.
        #[arg(long)]
        hide_answers: bool,
    },

    /// Report lessons that break the title / Knowledge Check conventions.
    Check {
        #[command(flatten)]
        inputs: Inputs,

        /// Exit with an error if anything is reported.
        #[arg(long)]
        strict: bool,

        /// Print the reports as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate a previously built index directory.
    Validate {
        /// Index directory containing manifest.json.
        dir: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lessondex=info",
        1 => "lessondex=debug",
        _ => "lessondex=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Index { inputs, out, name } => {
            cmd_index(&config, &inputs, out.as_deref(), name.as_deref())
        }
        Command::Outline { file, json } => cmd_outline(&file, json),
        Command::Quiz {
            inputs,
            json,
            hide_answers,
        } => cmd_quiz(&config, &inputs, json, hide_answers),
        Command::Check {
            inputs,
            strict,
            json,
        } => cmd_check(&config, &inputs, strict, json),
        Command::Validate { dir } => cmd_validate(&dir),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// Input resolution
// ---------------------------------------------------------------------------

/// Resolve CLI inputs to explicit paths, substituting a registered corpus.
fn input_paths(config: &AppConfig, inputs: &Inputs) -> Result<Vec<PathBuf>> {
    if let Some(name) = &inputs.corpus {
        let entry = config
            .corpus(name)
            .ok_or_else(|| eyre!("no corpus named '{name}' in config"))?;
        return Ok(vec![PathBuf::from(&entry.path)]);
    }
    if inputs.paths.is_empty() {
        return Err(eyre!("no lesson paths given (pass files, directories, or --corpus)"));
    }
    Ok(inputs.paths.clone())
}

/// A single directory input is the root that stored paths are relative to.
fn source_root(paths: &[PathBuf]) -> Option<PathBuf> {
    match paths {
        [only] if only.is_dir() => Some(only.clone()),
        _ => None,
    }
}

/// Discover and index the lessons named by `inputs`.
///
/// The default output directory and `out` are never walked, so a built index
/// is not read back as lessons.
fn load_index(
    config: &AppConfig,
    inputs: &Inputs,
    out: Option<&Path>,
) -> Result<(CorpusIndex, Option<PathBuf>)> {
    let paths = input_paths(config, inputs)?;
    let root = source_root(&paths);

    let mut opts = DiscoverOptions::from_config(config)?.skip_dir(&config.defaults.output_dir);
    if let Some(out) = out {
        opts = opts.skip_dir(out);
    }
    let lessons = expand_inputs(&paths, &opts)?;
    info!(count = lessons.len(), "lessons discovered");

    let progress = CliProgress::new();
    let index = index_paths(&lessons, &progress)?;
    Ok((index, root))
}

fn display(path: &Path, root: Option<&Path>) -> String {
    relative_slash_path(path, root.unwrap_or(Path::new("")))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn document_loaded(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Parsing [{current}/{total}] {}", path.display()));
    }

    fn done(&self, _index: &CorpusIndex) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_index(
    config: &AppConfig,
    inputs: &Inputs,
    out: Option<&Path>,
    name: Option<&str>,
) -> Result<()> {
    let output_dir = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));
    let (index, root) = load_index(config, inputs, Some(&output_dir))?;

    let name = name
        .map(String::from)
        .or_else(|| inputs.corpus.clone())
        .or_else(|| {
            root.as_deref()
                .and_then(|r| r.canonicalize().ok())
                .and_then(|r| r.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "lessons".to_string());

    info!(name = %name, out = %output_dir.display(), "building index");

    let result = assemble(
        &AssembleConfig {
            name: name.clone(),
            source_root: root,
            output_dir,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        &index,
    )?;

    println!();
    println!("  Index built successfully!");
    println!("  ID:         {}", result.manifest.id);
    println!("  Name:       {name}");
    println!("  Documents:  {}", result.manifest.document_count);
    println!("  Questions:  {}", result.manifest.question_count);
    println!("  Path:       {}", result.index_path.display());
    println!();

    Ok(())
}

fn cmd_outline(file: &Path, json: bool) -> Result<()> {
    let doc = LessonDocument::load(file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{}", document_title(&doc));
    println!("  {} words, {} questions", doc.word_count(), doc.knowledge_check().iter().count());
    for section in doc.sections() {
        if section.is_preamble() {
            println!("  (preamble, line {})", section.line);
            continue;
        }
        let indent = "  ".repeat(section.level as usize);
        let hashes = "#".repeat(section.level as usize);
        println!("{indent}{hashes} {}  [line {}]", section.heading, section.line);
    }

    Ok(())
}

fn cmd_quiz(config: &AppConfig, inputs: &Inputs, json: bool, hide_answers: bool) -> Result<()> {
    let (index, root) = load_index(config, inputs, None)?;
    let study_set = build_study_set(&index, root.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&study_set)?);
        return Ok(());
    }

    let mut current: Option<&str> = None;
    for card in &study_set.cards {
        if current != Some(card.path.as_str()) {
            println!();
            println!("== {} ({})", card.document_title, card.path);
            current = Some(card.path.as_str());
        }
        println!();
        println!("Q{}. {}", card.number, card.question);
        if !hide_answers {
            println!("A{}. {}", card.number, card.answer);
        }
    }

    if study_set.cards.is_empty() {
        println!("No Knowledge Check questions found.");
    }

    Ok(())
}

fn cmd_check(config: &AppConfig, inputs: &Inputs, strict: bool, json: bool) -> Result<()> {
    let (index, root) = load_index(config, inputs, None)?;
    let reports = check_index(&index, &config.lessons);
    let total: usize = reports.iter().map(|r| r.findings.len()).sum();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            let path = display(&report.path, root.as_deref());
            for finding in &report.findings {
                println!("{path}: {finding}");
            }
        }
        println!(
            "{} documents checked, {} findings in {} documents",
            index.len(),
            total,
            reports.len()
        );
    }

    if strict && total > 0 {
        return Err(eyre!("{total} lint findings"));
    }
    Ok(())
}

fn cmd_validate(dir: &Path) -> Result<()> {
    let manifest = validate_index(dir)?;
    println!(
        "Index '{}' ({}) is valid: {} documents, {} questions, schema v{}",
        manifest.name,
        manifest.id,
        manifest.document_count,
        manifest.question_count,
        manifest.schema_version
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
