//! Configuration loading: task lists and the typed options of each directive.
//!
//! A configuration file is an ordered list of tasks; each task maps
//! directive names to directive data. YAML and JSON are both accepted.
pub mod clean;
pub mod create;
pub mod link;
pub mod shell;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::logging::Log;

/// One task: directive name to directive data, in file order.
pub type Task = Mapping;

/// Read one configuration file into a YAML value.
///
/// Returns `None` for an empty file. Files ending in `.json` are parsed as
/// JSON (key order preserved); everything else as YAML.
fn read_file(path: &Path) -> Result<Option<Value>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let value = if is_json {
        let json: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
        serde_yaml::to_value(json).map_err(|e| parse_err(e.to_string()))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?
    };
    Ok(match value {
        Value::Null => None,
        other => Some(other),
    })
}

/// Load and concatenate the task lists of `paths`, in order.
///
/// An empty file contributes no tasks and logs a warning.
///
/// # Errors
///
/// Returns an error if no path is given, a file cannot be read or parsed, or
/// a file is not a list of task mappings.
pub fn load_tasks(paths: &[PathBuf], log: &dyn Log) -> Result<Vec<Task>, ConfigError> {
    if paths.is_empty() {
        return Err(ConfigError::NoConfigFile);
    }
    let mut tasks = Vec::new();
    for path in paths {
        let Some(value) = read_file(path)? else {
            log.warn(&format!("Configuration file {} is empty, no work to do", path.display()));
            continue;
        };
        let Value::Sequence(items) = value else {
            return Err(ConfigError::NotATaskList(path.clone()));
        };
        for item in items {
            match item {
                Value::Mapping(task) => tasks.push(task),
                // A bare `- ` entry is an empty task.
                Value::Null => tasks.push(Mapping::new()),
                _ => return Err(ConfigError::NotATaskList(path.clone())),
            }
        }
        log.debug(&format!("Loaded {}", path.display()));
    }
    Ok(tasks)
}

/// Deserialize the options block of `directive`, or defaults when absent.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOptions`] if the block has the wrong shape.
pub fn options_from<T: DeserializeOwned + Default>(
    directive: &str,
    value: Option<&Value>,
) -> Result<T, ConfigError> {
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(v) => serde_yaml::from_value(v.clone()).map_err(|e| invalid(directive, e.to_string())),
    }
}

/// Shorthand for [`ConfigError::InvalidOptions`].
pub(crate) fn invalid(directive: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidOptions {
        directive: directive.to_string(),
        message: message.into(),
    }
}

/// Read a mapping key as a string, rejecting other scalar types.
pub(crate) fn key_str<'a>(directive: &str, key: &'a Value) -> Result<&'a str, ConfigError> {
    key.as_str()
        .ok_or_else(|| invalid(directive, format!("expected a path, got {key:?}")))
}
