//! Options and entries of the `create` directive.
use serde::Deserialize;
use serde_yaml::Value;

use super::{invalid, key_str, options_from};
use crate::error::ConfigError;
use crate::resources::paths::expand_user;

const DIRECTIVE: &str = "create";

/// Mode used when neither the defaults nor the entry name one.
pub const DEFAULT_MODE: u32 = 0o777;

/// Options layer for `create`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CreateOverrides {
    /// Permission bits for created directories.
    pub mode: Option<u32>,
}

/// One directory to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpec {
    /// Path with `~` and variables expanded.
    pub path: String,
    /// Permission bits applied after creation.
    pub mode: u32,
}

/// Parse `create` data: a list of paths, or a mapping of path to options.
///
/// # Errors
///
/// Returns an error if the data or an entry has the wrong shape.
pub fn parse(data: &Value, defaults: Option<&Value>) -> Result<Vec<CreateSpec>, ConfigError> {
    let default_mode = options_from::<CreateOverrides>(DIRECTIVE, defaults)?
        .mode
        .unwrap_or(DEFAULT_MODE);
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                Ok(CreateSpec {
                    path: expand_user(key_str(DIRECTIVE, item)?),
                    mode: default_mode,
                })
            })
            .collect(),
        Value::Mapping(map) => map
            .iter()
            .map(|(key, value)| {
                let overrides = options_from::<CreateOverrides>(DIRECTIVE, Some(value))?;
                Ok(CreateSpec {
                    path: expand_user(key_str(DIRECTIVE, key)?),
                    mode: overrides.mode.unwrap_or(default_mode),
                })
            })
            .collect(),
        _ => Err(invalid(DIRECTIVE, "expected a list or mapping of paths")),
    }
}
