//! Options and entries of the `clean` directive.
use serde::Deserialize;
use serde_yaml::Value;

use super::{invalid, key_str, options_from};
use crate::error::ConfigError;
use crate::resources::paths::expand_user;

const DIRECTIVE: &str = "clean";

/// Options layer for `clean`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CleanOverrides {
    /// Remove dangling links even when they point outside the base directory.
    pub force: Option<bool>,
    /// Descend into subdirectories.
    pub recursive: Option<bool>,
}

/// One directory to clean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSpec {
    /// Directory with `~` and variables expanded.
    pub path: String,
    /// Remove every dangling link, not only those into the base directory.
    pub force: bool,
    /// Descend into real (non-symlink) subdirectories.
    pub recursive: bool,
}

/// Parse `clean` data: a list of directories, or a mapping of directory to options.
///
/// # Errors
///
/// Returns an error if the data or an entry has the wrong shape.
pub fn parse(data: &Value, defaults: Option<&Value>) -> Result<Vec<CleanSpec>, ConfigError> {
    let base = options_from::<CleanOverrides>(DIRECTIVE, defaults)?;
    let spec = |path: &str, o: CleanOverrides| CleanSpec {
        path: expand_user(path),
        force: o.force.or(base.force).unwrap_or(false),
        recursive: o.recursive.or(base.recursive).unwrap_or(false),
    };
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| Ok(spec(key_str(DIRECTIVE, item)?, CleanOverrides::default())))
            .collect(),
        Value::Mapping(map) => map
            .iter()
            .map(|(key, value)| {
                let overrides = options_from::<CleanOverrides>(DIRECTIVE, Some(value))?;
                Ok(spec(key_str(DIRECTIVE, key)?, overrides))
            })
            .collect(),
        _ => Err(invalid(DIRECTIVE, "expected a list or mapping of directories")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn list_inherits_defaults() {
        let defaults = yaml("recursive: true");
        let specs = parse(&yaml("['/h', '/h/.config']"), Some(&defaults)).unwrap();
        assert!(specs.iter().all(|s| s.recursive && !s.force));
    }

    #[test]
    fn mapping_entry_overrides() {
        let specs = parse(&yaml("/h:\n  force: true\n/h/.config:\n"), None).unwrap();
        assert!(specs[0].force);
        assert!(!specs[1].force);
    }
}
