//! Link reconciliation: inspect a target and create, accept, or reject it.
use std::path::{Path, PathBuf};

use super::paths::{absolutize, normalize, paths_equal, relative_payload};
use super::state::LinkState;
use super::{LinkFailure, LinkOutcome};
use crate::config::link::LinkType;
use crate::plugins::Context;

/// The paths involved in linking one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPaths {
    /// Absolute target path (where the link lives).
    pub target: PathBuf,
    /// Absolute source path under the base directory.
    pub absolute_source: PathBuf,
    /// What a symlink records: the absolute source, or the path to it
    /// relative to the target's directory.
    pub payload: PathBuf,
}

impl LinkPaths {
    /// Resolve `source` (relative to the base directory) and `target`.
    ///
    /// A relative `target` is taken relative to the literal base directory.
    /// With `canonicalize`, the source is composed from the base directory
    /// with symlinks resolved.
    #[must_use]
    pub fn resolve(
        ctx: &Context,
        source: &Path,
        target: &Path,
        relative: bool,
        canonicalize: bool,
    ) -> Self {
        let target = absolutize(target, &ctx.base_directory(false));
        let absolute_source = normalize(&ctx.base_directory(canonicalize).join(source));
        let payload = if relative {
            relative_payload(&absolute_source, &target)
        } else {
            absolute_source.clone()
        };
        Self {
            target,
            absolute_source,
            payload,
        }
    }
}

/// Reconcile one target with its source.
///
/// `did_delete` reports that the guard removed the target (or would have,
/// in a dry run); a dry run then treats the target as absent so the
/// reported action is the one a real run would take.
pub fn link(
    ctx: &Context,
    paths: &LinkPaths,
    link_type: LinkType,
    ignore_missing: bool,
    did_delete: bool,
) -> LinkOutcome {
    let fs = ctx.fs_ops.as_ref();
    let target = paths.target.display();
    let payload = paths.payload.display();

    let state = if ctx.dry_run && did_delete {
        LinkState::Absent
    } else {
        LinkState::classify(fs, &paths.target)
    };
    let source_exists = fs.exists(&paths.absolute_source);

    if !state.lexists() && (ignore_missing || source_exists) {
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("Would create {link_type} {target} -> {payload}"));
            return LinkOutcome::Created;
        }
        let result = match link_type {
            LinkType::Symlink => fs.symlink(&paths.payload, &paths.target),
            LinkType::Hardlink => fs.hard_link(&paths.absolute_source, &paths.target),
        };
        return match result {
            Ok(()) => {
                ctx.log
                    .info(&format!("Creating {link_type} {target} -> {payload}"));
                LinkOutcome::Created
            }
            Err(e) => {
                ctx.log
                    .warn(&format!("Linking failed {target} -> {payload}: {e}"));
                LinkOutcome::Failed(LinkFailure::LinkingFailed)
            }
        };
    }

    if !source_exists {
        if state.is_symlink() {
            ctx.log
                .warn(&format!("Nonexistent source {target} -> {payload}"));
        } else {
            ctx.log
                .warn(&format!("Nonexistent source for {target} : {payload}"));
        }
        return LinkOutcome::Failed(LinkFailure::NonexistentSource);
    }

    match (state, link_type) {
        (
            LinkState::Symlink {
                destination,
                dangling,
            },
            LinkType::Symlink,
        ) => {
            if paths_equal(&destination, &paths.payload) {
                ctx.log.debug(&format!("Link exists {target} -> {payload}"));
                LinkOutcome::AlreadyCorrect
            } else if dangling {
                ctx.log.warn(&format!(
                    "Invalid link {target} -> {}",
                    destination.display()
                ));
                LinkOutcome::Failed(LinkFailure::InvalidLink(destination))
            } else {
                ctx.log.warn(&format!(
                    "Incorrect link {target} -> {}",
                    destination.display()
                ));
                LinkOutcome::Failed(LinkFailure::IncorrectLink(destination))
            }
        }
        (LinkState::Symlink { .. }, LinkType::Hardlink) => {
            ctx.log.warn(&format!(
                "{target} already exists but is a symbolic link, not a hard link"
            ));
            LinkOutcome::Failed(LinkFailure::NotAHardLink)
        }
        (_, LinkType::Hardlink) if fs.same_file(&paths.target, &paths.absolute_source) => {
            ctx.log.debug(&format!("Link exists {target} -> {payload}"));
            LinkOutcome::AlreadyCorrect
        }
        _ => {
            ctx.log.warn(&format!(
                "{target} already exists but is a regular file or directory"
            ));
            LinkOutcome::Failed(LinkFailure::AlreadyExists)
        }
    }
}
