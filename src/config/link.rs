//! Options and entries of the `link` directive.
use serde::Deserialize;
use serde_yaml::Value;
use std::fmt;
use std::path::MAIN_SEPARATOR;
use std::str::FromStr;

use super::{invalid, key_str, options_from};
use crate::error::ConfigError;
use crate::resources::paths::expand_user;

const DIRECTIVE: &str = "link";

/// Kind of link to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkType {
    /// A symbolic link recording the source path.
    #[default]
    Symlink,
    /// A hard link sharing the source's inode.
    Hardlink,
}

impl FromStr for LinkType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symlink" => Ok(Self::Symlink),
            "hardlink" => Ok(Self::Hardlink),
            other => Err(ConfigError::UnknownLinkType(other.to_string())),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symlink => f.write_str("symlink"),
            Self::Hardlink => f.write_str("hardlink"),
        }
    }
}

/// One layer of link options as written in configuration.
///
/// Used both for the `defaults` block and for a target's extended form;
/// unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinkOverrides {
    /// Source path (extended form only).
    pub path: Option<String>,
    /// Record a relative path instead of an absolute one.
    pub relative: Option<bool>,
    /// Resolve the base directory through symlinks.
    pub canonicalize: Option<bool>,
    /// Older spelling of `canonicalize`; `canonicalize` wins when both are set.
    pub canonicalize_path: Option<bool>,
    /// `symlink` or `hardlink`.
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    /// Remove conflicting files and directories.
    pub force: Option<bool>,
    /// Replace conflicting symlinks.
    pub relink: Option<bool>,
    /// Create missing parent directories.
    pub create: Option<bool>,
    /// Treat the source as a glob pattern.
    pub glob: Option<bool>,
    /// Prepended to glob-derived target names.
    pub prefix: Option<String>,
    /// Shell test; the target is skipped unless it exits zero.
    #[serde(rename = "if")]
    pub test: Option<String>,
    /// Link even when the source does not exist yet.
    pub ignore_missing: Option<bool>,
    /// Glob patterns removed from the glob matches.
    pub exclude: Option<Vec<String>>,
}

/// Fully resolved options for one link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// Record a relative path instead of an absolute one.
    pub relative: bool,
    /// Resolve the base directory through symlinks.
    pub canonicalize: bool,
    /// Kind of link.
    pub link_type: LinkType,
    /// Remove conflicting files and directories.
    pub force: bool,
    /// Replace conflicting symlinks.
    pub relink: bool,
    /// Create missing parent directories.
    pub create: bool,
    /// Treat the source as a glob pattern.
    pub glob: bool,
    /// Prepended to glob-derived target names.
    pub prefix: String,
    /// Shell test gating the target.
    pub test: Option<String>,
    /// Link even when the source does not exist yet.
    pub ignore_missing: bool,
    /// Glob patterns removed from the glob matches.
    pub exclude: Vec<String>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            relative: false,
            canonicalize: true,
            link_type: LinkType::Symlink,
            force: false,
            relink: false,
            create: false,
            glob: false,
            prefix: String::new(),
            test: None,
            ignore_missing: false,
            exclude: Vec::new(),
        }
    }
}

impl LinkOptions {
    /// Layer `overrides` on top of these options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownLinkType`] for a `type` other than
    /// `symlink` or `hardlink`.
    pub fn merged(&self, overrides: &LinkOverrides) -> Result<Self, ConfigError> {
        let link_type = match &overrides.link_type {
            Some(raw) => raw.parse()?,
            None => self.link_type,
        };
        Ok(Self {
            relative: overrides.relative.unwrap_or(self.relative),
            canonicalize: overrides
                .canonicalize
                .or(overrides.canonicalize_path)
                .unwrap_or(self.canonicalize),
            link_type,
            force: overrides.force.unwrap_or(self.force),
            relink: overrides.relink.unwrap_or(self.relink),
            create: overrides.create.unwrap_or(self.create),
            glob: overrides.glob.unwrap_or(self.glob),
            prefix: overrides.prefix.clone().unwrap_or_else(|| self.prefix.clone()),
            test: overrides.test.clone().or_else(|| self.test.clone()),
            ignore_missing: overrides.ignore_missing.unwrap_or(self.ignore_missing),
            exclude: overrides
                .exclude
                .clone()
                .unwrap_or_else(|| self.exclude.clone()),
        })
    }
}

/// One configured link: target, source, and resolved options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    /// Target path with `~` and variables expanded.
    pub target: String,
    /// Source path (or glob pattern) relative to the base directory, expanded.
    pub source: String,
    /// Resolved options.
    pub options: LinkOptions,
}

/// Value side of a link entry.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkValue {
    /// Plain string: `~/.vimrc: vimrc`.
    Source(String),
    /// Mapping: `~/.vimrc: {path: vimrc, relink: true}`.
    Extended(Box<LinkOverrides>),
}

/// Source implied by a target: its basename with one leading `.` removed.
#[must_use]
pub fn default_source(target: &str) -> String {
    let basename = target.rsplit(['/', MAIN_SEPARATOR]).next().unwrap_or(target);
    basename.strip_prefix('.').unwrap_or(basename).to_string()
}

/// Parse `link` directive data, layering each entry over `defaults`.
///
/// Every entry is validated before any is returned, so a bad `type` or a
/// malformed entry fails the whole directive before anything is touched.
///
/// # Errors
///
/// Returns an error if the data is not a mapping, an entry or the defaults
/// have the wrong shape, or a link type is not recognized.
pub fn parse(data: &Value, defaults: Option<&Value>) -> Result<Vec<LinkSpec>, ConfigError> {
    let base = LinkOptions::default().merged(&options_from::<LinkOverrides>(DIRECTIVE, defaults)?)?;
    let entries = match data {
        Value::Mapping(map) => map,
        Value::Null => return Ok(Vec::new()),
        _ => return Err(invalid(DIRECTIVE, "expected a mapping of targets to sources")),
    };

    let mut specs = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let target = expand_user(key_str(DIRECTIVE, key)?);
        let entry: Option<LinkValue> = serde_yaml::from_value(value.clone())
            .map_err(|e| invalid(DIRECTIVE, format!("{target}: {e}")))?;
        let (path, options) = match entry {
            None => (None, base.clone()),
            Some(LinkValue::Source(path)) => (Some(path), base.clone()),
            Some(LinkValue::Extended(overrides)) => (overrides.path.clone(), base.merged(&overrides)?),
        };
        let source = expand_user(&path.unwrap_or_else(|| default_source(&target)));
        specs.push(LinkSpec {
            target,
            source,
            options,
        });
    }
    Ok(specs)
}
