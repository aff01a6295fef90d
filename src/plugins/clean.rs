//! The `clean` directive: remove dangling symlinks left behind by old links.
use std::path::Path;

use serde_yaml::Value;

use super::{Context, Plugin, ensure_handles};
use crate::config::clean::{CleanSpec, parse};
use crate::error::DirectiveError;
use crate::resources::paths::{absolutize, is_within, normalize, strip_verbatim};

const DIRECTIVE: &str = "clean";

/// Handles the `clean` directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clean;

impl Plugin for Clean {
    fn name(&self) -> &str {
        "Clean"
    }

    fn can_handle(&self, directive: &str) -> bool {
        directive == DIRECTIVE
    }

    fn handle(&self, directive: &str, data: &Value, ctx: &Context) -> Result<bool, DirectiveError> {
        ensure_handles(self, directive)?;
        let specs = parse(data, ctx.defaults_for(DIRECTIVE))?;

        let mut success = true;
        for spec in &specs {
            let directory = absolutize(Path::new(&spec.path), &ctx.base_directory(false));
            success &= clean(ctx, &directory, spec);
        }

        if success {
            ctx.log.info("All targets have been cleaned");
        } else {
            ctx.log.error("Some targets were not successfully cleaned");
        }
        Ok(success)
    }

    fn supports_dry_run(&self) -> bool {
        true
    }
}

/// Whether `points_at` lies inside the base directory, literal or resolved.
fn points_into_base(ctx: &Context, points_at: &Path) -> bool {
    is_within(points_at, &ctx.base_directory(false))
        || is_within(points_at, &ctx.base_directory(true))
}

/// Remove the dangling links directly inside `directory`.
fn clean(ctx: &Context, directory: &Path, spec: &CleanSpec) -> bool {
    let fs = ctx.fs_ops.as_ref();
    if !fs.is_dir(directory) {
        ctx.log.debug(&format!(
            "Ignoring nonexistent directory {}",
            directory.display()
        ));
        return true;
    }

    let entries = match fs.read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            ctx.log
                .warn(&format!("Failed to read {}: {e}", directory.display()));
            return false;
        }
    };

    let mut success = true;
    for path in entries {
        if spec.recursive && fs.is_dir(&path) && !fs.is_symlink(&path) {
            success &= clean(ctx, &path, spec);
            continue;
        }
        if fs.exists(&path) || !fs.is_symlink(&path) {
            continue;
        }
        let Ok(recorded) = fs.read_link(&path) else {
            continue;
        };
        let points_at = normalize(&directory.join(strip_verbatim(&recorded)));
        let shown = format!("{} -> {}", path.display(), points_at.display());

        if !spec.force && !points_into_base(ctx, &points_at) {
            ctx.log.info(&format!("Link {shown} not removed."));
            continue;
        }
        if ctx.dry_run {
            ctx.log.dry_run(&format!("Would remove invalid link {shown}"));
            continue;
        }
        match fs.remove_file(&path) {
            Ok(()) => ctx.log.info(&format!("Removing invalid link {shown}")),
            Err(e) => {
                ctx.log
                    .warn(&format!("Failed to remove invalid link {shown}: {e}"));
                success = false;
            }
        }
    }
    success
}
