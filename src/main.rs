//! html-publish - rewrite HTML build blocks and bundle their assets.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use html_publish::cli::{Cli, Commands, build::build_documents, inspect::run_inspect};
use html_publish::config::PublishConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PublishConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => build_documents(&config).map(|_| ()),
        Commands::Inspect { pretty, .. } => run_inspect(&config, *pretty),
    }
}
