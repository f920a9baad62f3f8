//! `command` stage: pipe bytes through an external program.
//!
//! ```toml
//! less = [{ name = "command", command = ["lessc", "-"] }]
//! ```
//!
//! The program reads the file on stdin and writes the result on stdout. It
//! runs in the project root with `PUBLISH_SOURCE` set to the source path.

use anyhow::{Context, Result, bail};

use super::expect_bool;
use crate::pipeline::stage::{StageContext, Transform};
use crate::utils::exec::Cmd;

pub struct CommandStage;

impl Transform for CommandStage {
    fn name(&self) -> &'static str {
        "command"
    }

    fn apply(&self, input: Vec<u8>, config: &toml::Table, ctx: &StageContext) -> Result<Vec<u8>> {
        let argv = command_line(config)?;
        let quiet = config.get("quiet").and_then(toml::Value::as_bool).unwrap_or(false);
        let output = Cmd::from_slice(&argv)
            .cwd(&ctx.root)
            .env("PUBLISH_SOURCE", ctx.source.to_string_lossy())
            .stdin(input)
            .quiet(quiet)
            .run()
            .with_context(|| format!("while processing {}", ctx.source.display()))?;
        Ok(output.stdout)
    }

    fn validate(&self, config: &toml::Table) -> Vec<String> {
        let mut errors = Vec::new();
        match command_line(config) {
            Ok(argv) => {
                if which::which(&argv[0]).is_err() {
                    errors.push(format!("program `{}` not found in PATH", argv[0]));
                }
            }
            Err(err) => errors.push(err.to_string()),
        }
        errors.extend(expect_bool(config, "quiet"));
        errors
    }
}

/// `command` setting as an argument vector with at least the program.
fn command_line(config: &toml::Table) -> Result<Vec<String>> {
    let Some(value) = config.get("command") else {
        bail!("`command` is required");
    };
    let Some(items) = value.as_array() else {
        bail!("`command` must be an array of strings");
    };
    let argv = items
        .iter()
        .map(|item| item.as_str().map(str::to_owned))
        .collect::<Option<Vec<_>>>()
        .context("`command` must be an array of strings")?;
    if argv.first().is_none_or(|program| program.is_empty()) {
        bail!("`command` is empty");
    }
    Ok(argv)
}
