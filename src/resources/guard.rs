//! Removal of stale targets before linking.
use std::path::Path;

use super::link::LinkPaths;
use super::paths::paths_equal;
use super::state::LinkState;
use crate::plugins::Context;

/// What the guard did to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    /// The target was removed (or would have been, in a dry run).
    pub removed: bool,
    /// No refusal or I/O error occurred.
    pub success: bool,
}

impl Removal {
    const UNTOUCHED: Self = Self {
        removed: false,
        success: true,
    };
    const REFUSED: Self = Self {
        removed: false,
        success: false,
    };
    const REMOVED: Self = Self {
        removed: true,
        success: true,
    };
}

/// Whether a target in `state` stands in the way of a link recording `payload`.
#[must_use]
pub fn should_delete(state: &LinkState, payload: &Path) -> bool {
    match state {
        LinkState::Symlink { destination, .. } => !paths_equal(destination, payload),
        LinkState::Other { .. } => true,
        LinkState::Absent => false,
    }
}

/// Whether the target is not a symlink yet resolves to the source itself.
///
/// This happens when an ancestor directory of the target is a symlink into
/// the source tree; deleting the target would delete the source.
#[must_use]
pub fn aliases_source(ctx: &Context, paths: &LinkPaths) -> bool {
    let fs = ctx.fs_ops.as_ref();
    if !fs.exists(&paths.target) || fs.is_symlink(&paths.target) {
        return false;
    }
    match (
        fs.canonicalize(&paths.target),
        fs.canonicalize(&paths.absolute_source),
    ) {
        (Ok(target), Ok(source)) => paths_equal(&target, &source),
        _ => false,
    }
}

/// Remove whatever stands at the target so that a link can be created.
///
/// Symlinks are always removed; regular files and directories only with
/// `force`. Nothing is mutated in a dry run, but the removal that would
/// happen is still reported as `removed`.
pub fn delete(ctx: &Context, paths: &LinkPaths, force: bool) -> Removal {
    let fs = ctx.fs_ops.as_ref();
    let target = paths.target.display();

    if aliases_source(ctx, paths) {
        ctx.log.warn(&format!(
            "{target} appears to be the same file as {}.",
            paths.absolute_source.display()
        ));
        return Removal::REFUSED;
    }

    let state = LinkState::classify(fs, &paths.target);
    if !should_delete(&state, &paths.payload) {
        return Removal::UNTOUCHED;
    }

    let recursive = match state {
        LinkState::Symlink { .. } => false,
        LinkState::Other { is_dir } if force => is_dir,
        _ => return Removal::UNTOUCHED,
    };

    if ctx.dry_run {
        ctx.log.dry_run(&format!("Would remove {target}"));
        return Removal::REMOVED;
    }

    let result = if recursive {
        fs.remove_dir_all(&paths.target)
    } else {
        fs.remove_file(&paths.target)
    };
    match result {
        Ok(()) => {
            ctx.log.info(&format!("Removing {target}"));
            Removal::REMOVED
        }
        Err(e) => {
            ctx.log.warn(&format!("Failed to remove {target}: {e}"));
            Removal::REFUSED
        }
    }
}
