//! Options and entries of the `shell` directive.
use serde::Deserialize;
use serde_yaml::Value;

use super::{invalid, options_from};
use crate::error::ConfigError;

const DIRECTIVE: &str = "shell";

/// Options layer for `shell`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ShellOverrides {
    /// Connect standard input.
    pub stdin: Option<bool>,
    /// Show standard output.
    pub stdout: Option<bool>,
    /// Show standard error.
    pub stderr: Option<bool>,
    /// Print only the description, not the command.
    pub quiet: Option<bool>,
}

/// One command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSpec {
    /// Command line passed to the shell.
    pub command: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Connect standard input.
    pub stdin: bool,
    /// Show standard output.
    pub stdout: bool,
    /// Show standard error.
    pub stderr: bool,
    /// Print only the description, not the command.
    pub quiet: bool,
}

/// Mapping form of a command.
#[derive(Debug, Deserialize)]
struct ShellMapping {
    command: String,
    description: Option<String>,
    #[serde(flatten)]
    overrides: ShellOverrides,
}

/// Any accepted form of a command.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ShellItem {
    /// `- git submodule update`
    Command(String),
    /// `- [git submodule update, Updating submodules]`
    Pair(Vec<String>),
    /// `- {command: ..., description: ..., stdout: true}`
    Mapping(ShellMapping),
}

/// Parse `shell` data: a list of commands in any accepted form.
///
/// # Errors
///
/// Returns an error if the data is not a list or an item has the wrong shape.
pub fn parse(data: &Value, defaults: Option<&Value>) -> Result<Vec<ShellSpec>, ConfigError> {
    let base = options_from::<ShellOverrides>(DIRECTIVE, defaults)?;
    let items = match data {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items,
        _ => return Err(invalid(DIRECTIVE, "expected a list of commands")),
    };
    items
        .iter()
        .map(|item| {
            let parsed: ShellItem = serde_yaml::from_value(item.clone())
                .map_err(|e| invalid(DIRECTIVE, e.to_string()))?;
            let (command, description, o) = match parsed {
                ShellItem::Command(command) => (command, None, ShellOverrides::default()),
                ShellItem::Pair(parts) => {
                    let mut parts = parts.into_iter();
                    let command = parts
                        .next()
                        .ok_or_else(|| invalid(DIRECTIVE, "empty command list"))?;
                    (command, parts.next(), ShellOverrides::default())
                }
                ShellItem::Mapping(m) => (m.command, m.description, m.overrides),
            };
            Ok(ShellSpec {
                command,
                description,
                stdin: o.stdin.or(base.stdin).unwrap_or(false),
                stdout: o.stdout.or(base.stdout).unwrap_or(false),
                stderr: o.stderr.or(base.stderr).unwrap_or(false),
                quiet: o.quiet.or(base.quiet).unwrap_or(false),
            })
        })
        .collect()
}
