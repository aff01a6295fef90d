//! Parent directory creation for link targets.
use std::path::Path;

use crate::plugins::Context;

/// Create every missing ancestor directory of `target` (not `target` itself).
///
/// Returns `false` after logging a warning if creation fails. In a dry run
/// the intent is logged and nothing is created.
pub fn ensure_parent(ctx: &Context, target: &Path) -> bool {
    let Some(parent) = target.parent() else {
        return true;
    };
    if ctx.fs_ops.exists(parent) {
        return true;
    }
    let shown = parent.display();
    if ctx.dry_run {
        ctx.log.dry_run(&format!("Would create directory {shown}"));
        return true;
    }
    ctx.log.debug(&format!("Try to create parent: {shown}"));
    match ctx.fs_ops.create_dir_all(parent) {
        Ok(()) => {
            ctx.log.info(&format!("Creating directory {shown}"));
            true
        }
        Err(e) => {
            ctx.log
                .warn(&format!("Failed to create directory {shown}: {e}"));
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;
    use crate::operations::RecordingFileSystemOps;
    use std::sync::Arc;

    #[test]
    fn creates_missing_ancestors_only() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(dir.path(), Arc::new(MemoryLog::new())).unwrap();
        let target = dir.path().join("a/b/c/file");
        assert!(ensure_parent(&ctx, &target));
        assert!(dir.path().join("a/b/c").is_dir());
        assert!(!target.exists());
    }

    #[test]
    fn existing_parent_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ops = Arc::new(RecordingFileSystemOps::new());
        let ctx = Context::new(dir.path(), Arc::new(MemoryLog::new()))
            .unwrap()
            .with_fs_ops(ops.clone());
        assert!(ensure_parent(&ctx, &dir.path().join("file")));
        assert!(ops.calls().is_empty());
    }

    #[test]
    fn dry_run_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(MemoryLog::new());
        let ops = Arc::new(RecordingFileSystemOps::new());
        let ctx = Context::new(dir.path(), log.clone())
            .unwrap()
            .with_dry_run(true)
            .with_fs_ops(ops.clone());
        assert!(ensure_parent(&ctx, &dir.path().join("x/y/file")));
        assert!(ops.calls().is_empty());
        assert!(!dir.path().join("x").exists());
        assert!(log.contains("Would create directory"));
    }

    #[test]
    fn failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(MemoryLog::new());
        let ctx = Context::new(dir.path(), log.clone())
            .unwrap()
            .with_fs_ops(Arc::new(RecordingFileSystemOps::failing()));
        assert!(!ensure_parent(&ctx, &dir.path().join("x/file")));
        assert_eq!(log.warnings().len(), 1);
    }
}
