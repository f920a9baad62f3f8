//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Rewrite HTML build blocks and bundle the assets they reference
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: publish.toml)
    #[arg(short = 'C', long, global = true, default_value = "publish.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rewrite HTML documents and build their artifacts
    #[command(visible_alias = "b")]
    Build {
        /// HTML files or directories. If omitted, uses `[input] paths`.
        #[arg(value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Print the build blocks of HTML documents as JSON
    #[command(visible_alias = "i")]
    Inspect {
        /// HTML files or directories. If omitted, uses `[input] paths`.
        #[arg(value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
        paths: Vec<PathBuf>,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

/// Build command arguments, overriding `[publish]` and `[input]`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Bundle block sources into artifacts
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub resolve: Option<bool>,

    /// Artifact output directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub directory: Option<PathBuf>,

    /// Rewritten HTML output directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Look sources up under the fixture root
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub debug: Option<bool>,

    /// Postfix appended to rewritten URLs (`md5` hashes the sources)
    #[arg(short, long)]
    pub postfix: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }

    /// Paths given on the command line.
    pub fn paths(&self) -> &[PathBuf] {
        match &self.command {
            Commands::Build { paths, .. } | Commands::Inspect { paths, .. } => paths,
        }
    }
}
