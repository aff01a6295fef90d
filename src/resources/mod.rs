//! The link reconciliation engine and the filesystem primitives around it.
//!
//! Each module covers one step a link target goes through:
//!
//! - **[`glob`]**: expand a source pattern into concrete (source, target) pairs
//! - **[`fs`]**: create missing parent directories of a target
//! - **[`state`]**: classify what currently sits at the target
//! - **[`guard`]**: remove a stale target, refusing when that would delete the source
//! - **[`link`]**: decide between create, leave alone, or fail, and act on it
pub mod fs;
pub mod glob;
pub mod guard;
pub mod link;
pub mod paths;
pub mod state;

use std::path::PathBuf;

use thiserror::Error;

/// Result of reconciling one (source, target) pair.
///
/// # Examples
///
/// ```
/// use dotlink::resources::{LinkFailure, LinkOutcome};
///
/// assert!(LinkOutcome::Created.is_success());
/// assert!(LinkOutcome::AlreadyCorrect.is_success());
/// assert!(LinkOutcome::Skipped.is_success());
/// assert!(!LinkOutcome::Failed(LinkFailure::NonexistentSource).is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The link was created (or would be, in a dry run).
    Created,
    /// The target already was the requested link.
    AlreadyCorrect,
    /// The target was not processed (its `if` test failed).
    Skipped,
    /// The target could not be reconciled.
    Failed(LinkFailure),
}

impl LinkOutcome {
    /// Whether this outcome counts towards directive success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Why a target could not be reconciled.
///
/// The matching warning has already been logged by the time a failure is
/// returned; the variant is kept for callers that aggregate results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkFailure {
    /// The source does not exist and `ignore-missing` is off.
    #[error("nonexistent source")]
    NonexistentSource,
    /// The target is a symlink to some other existing path.
    #[error("incorrect link to {}", .0.display())]
    IncorrectLink(PathBuf),
    /// The target is a broken symlink to some other path.
    #[error("invalid link to {}", .0.display())]
    InvalidLink(PathBuf),
    /// A hard link was requested but the target is a symlink.
    #[error("exists but is a symbolic link, not a hard link")]
    NotAHardLink,
    /// The target is a regular file or directory that was not replaced.
    #[error("already exists but is a regular file or directory")]
    AlreadyExists,
    /// The target resolves to the source itself through a symlinked ancestor.
    #[error("target is the same file as the source")]
    SameFile,
    /// The OS refused to create the link.
    #[error("linking failed")]
    LinkingFailed,
    /// The stale target could not be removed.
    #[error("removal failed")]
    RemovalFailed,
    /// A missing parent directory could not be created.
    #[error("parent directory creation failed")]
    ParentCreationFailed,
    /// A glob target ends in a separator but the source has no wildcards.
    #[error("ambiguous glob target")]
    Ambiguous,
    /// A glob or exclude pattern could not be parsed.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),
}
