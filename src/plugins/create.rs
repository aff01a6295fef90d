//! The `create` directive: make sure directories exist.
use std::path::Path;

use serde_yaml::Value;

use super::{Context, Plugin, ensure_handles};
use crate::config::create::{CreateSpec, parse};
use crate::error::DirectiveError;
use crate::resources::paths::absolutize;

const DIRECTIVE: &str = "create";

/// Handles the `create` directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Create;

impl Plugin for Create {
    fn name(&self) -> &str {
        "Create"
    }

    fn can_handle(&self, directive: &str) -> bool {
        directive == DIRECTIVE
    }

    fn handle(&self, directive: &str, data: &Value, ctx: &Context) -> Result<bool, DirectiveError> {
        ensure_handles(self, directive)?;
        let specs = parse(data, ctx.defaults_for(DIRECTIVE))?;

        let mut success = true;
        for spec in &specs {
            success &= create(ctx, spec);
        }

        if success {
            ctx.log.info("All paths have been set up");
        } else {
            ctx.log.error("Some paths were not successfully set up");
        }
        Ok(success)
    }

    fn supports_dry_run(&self) -> bool {
        true
    }
}

/// Create one directory with its mode, unless something already exists there.
fn create(ctx: &Context, spec: &CreateSpec) -> bool {
    let path = absolutize(Path::new(&spec.path), &ctx.base_directory(false));
    let shown = path.display();

    if ctx.fs_ops.exists(&path) {
        ctx.log.info(&format!("Path exists {shown}"));
        return true;
    }
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("Would create path {shown} with mode {:o}", spec.mode));
        return true;
    }

    ctx.log
        .debug(&format!("Trying to create path {shown} with mode {:o}", spec.mode));
    match ctx
        .fs_ops
        .create_dir_all(&path)
        .and_then(|()| ctx.fs_ops.set_mode(&path, spec.mode))
    {
        Ok(()) => {
            ctx.log.info(&format!("Creating path {shown}"));
            true
        }
        Err(e) => {
            ctx.log.warn(&format!("Failed to create path {shown}: {e}"));
            false
        }
    }
}
