//! lessondex CLI: index Markdown lesson notes and their Knowledge Checks.
//!
//! Parses lesson documents into sections, extracts their question/answer
//! pairs, and builds a navigable index plus a flattened study set.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
