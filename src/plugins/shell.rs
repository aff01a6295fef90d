//! The `shell` directive: run commands from the base directory.
use serde_yaml::Value;

use super::{Context, Plugin, ensure_handles};
use crate::config::shell::{ShellSpec, parse};
use crate::error::DirectiveError;
use crate::exec::Streams;

const DIRECTIVE: &str = "shell";

/// Handles the `shell` directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shell;

impl Plugin for Shell {
    fn name(&self) -> &str {
        "Shell"
    }

    fn can_handle(&self, directive: &str) -> bool {
        directive == DIRECTIVE
    }

    fn handle(&self, directive: &str, data: &Value, ctx: &Context) -> Result<bool, DirectiveError> {
        ensure_handles(self, directive)?;
        let specs = parse(data, ctx.defaults_for(DIRECTIVE))?;

        let show_output = ctx.verbose > 1;
        if show_output && !specs.is_empty() {
            ctx.log
                .debug("Shell: verbose output forces stdout and stderr on");
        }

        let mut success = true;
        for spec in &specs {
            success &= run(ctx, spec, show_output);
        }

        if success {
            ctx.log.info("All commands have been executed");
        } else {
            ctx.log.error("Some commands were not successfully executed");
        }
        Ok(success)
    }

    fn supports_dry_run(&self) -> bool {
        true
    }
}

/// Line announcing a command: the description, the command, or both.
fn announcement(spec: &ShellSpec) -> Option<String> {
    match (&spec.description, spec.quiet) {
        (Some(description), true) => Some(description.clone()),
        (None, true) => None,
        (Some(description), false) => Some(format!("{description} [{}]", spec.command)),
        (None, false) => Some(spec.command.clone()),
    }
}

fn run(ctx: &Context, spec: &ShellSpec, show_output: bool) -> bool {
    let command = &spec.command;

    if ctx.dry_run {
        ctx.log.dry_run(&format!("Would run [{command}]"));
        return true;
    }
    if let Some(line) = announcement(spec) {
        ctx.log.info(&line);
    }

    let streams = Streams {
        stdin: spec.stdin,
        stdout: spec.stdout || show_output,
        stderr: spec.stderr || show_output,
    };
    match ctx
        .executor
        .shell(command, &ctx.base_directory(true), streams)
    {
        Ok(result) if result.success => true,
        Ok(result) => {
            let code = result
                .code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            ctx.log
                .warn(&format!("Command [{command}] failed (exit {code})"));
            false
        }
        Err(e) => {
            ctx.log.warn(&format!("Command [{command}] failed: {e:#}"));
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::{ExecResult, MockExecutor};
    use crate::logging::MemoryLog;
    use std::sync::Arc;

    fn setup(executor: MockExecutor) -> (tempfile::TempDir, Arc<MemoryLog>, Context) {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(MemoryLog::new());
        let ctx = Context::new(dir.path(), log.clone())
            .unwrap()
            .with_executor(Arc::new(executor));
        (dir, log, ctx)
    }

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn exit(code: i32) -> anyhow::Result<ExecResult> {
        Ok(ExecResult {
            success: code == 0,
            code: Some(code),
        })
    }

    #[test]
    fn failure_continues_with_remaining_commands() {
        let mut mock = MockExecutor::new();
        mock.expect_shell()
            .withf(|command, _, _| command == "false")
            .times(1)
            .returning(|_, _, _| exit(1));
        mock.expect_shell()
            .withf(|command, _, _| command == "true")
            .times(1)
            .returning(|_, _, _| exit(0));
        let (_dir, log, ctx) = setup(mock);
        assert!(!Shell.handle(DIRECTIVE, &yaml("[\"false\", \"true\"]"), &ctx).unwrap());
        assert!(log.warnings().contains(&"Command [false] failed (exit 1)".to_string()));
        assert!(log.contains("Some commands were not successfully executed"));
    }

    #[test]
    fn streams_follow_options() {
        let mut mock = MockExecutor::new();
        mock.expect_shell()
            .withf(|_, _, streams| *streams == Streams { stdin: false, stdout: true, stderr: false })
            .times(1)
            .returning(|_, _, _| exit(0));
        let (_dir, _log, ctx) = setup(mock);
        let data = yaml("- {command: make, stdout: true}");
        assert!(Shell.handle(DIRECTIVE, &data, &ctx).unwrap());
    }

    #[test]
    fn very_verbose_forces_output() {
        let mut mock = MockExecutor::new();
        mock.expect_shell()
            .withf(|_, _, streams| streams.stdout && streams.stderr && !streams.stdin)
            .times(1)
            .returning(|_, _, _| exit(0));
        let (_dir, _log, ctx) = setup(mock);
        let ctx = ctx.with_verbose(2);
        assert!(Shell.handle(DIRECTIVE, &yaml("[make]"), &ctx).unwrap());
    }

    #[test]
    fn dry_run_runs_nothing() {
        let mut mock = MockExecutor::new();
        mock.expect_shell().never();
        let (_dir, log, ctx) = setup(mock);
        let ctx = ctx.with_dry_run(true);
        assert!(Shell.handle(DIRECTIVE, &yaml("[\"rm -rf build\"]"), &ctx).unwrap());
        assert_eq!(log.dry_runs(), vec!["Would run [rm -rf build]".to_string()]);
    }

    #[test]
    fn announcement_forms() {
        let spec = |description: Option<&str>, quiet| ShellSpec {
            command: "git pull".to_string(),
            description: description.map(String::from),
            stdin: false,
            stdout: false,
            stderr: false,
            quiet,
        };
        assert_eq!(announcement(&spec(None, false)).as_deref(), Some("git pull"));
        assert_eq!(
            announcement(&spec(Some("Updating"), false)).as_deref(),
            Some("Updating [git pull]")
        );
        assert_eq!(announcement(&spec(Some("Updating"), true)).as_deref(), Some("Updating"));
        assert_eq!(announcement(&spec(None, true)), None);
    }

    #[test]
    fn spawn_error_fails_directive() {
        let mut mock = MockExecutor::new();
        mock.expect_shell()
            .returning(|_, _, _| Err(anyhow::anyhow!("no shell")));
        let (_dir, log, ctx) = setup(mock);
        assert!(!Shell.handle(DIRECTIVE, &yaml("[ls]"), &ctx).unwrap());
        assert!(log.contains("Command [ls] failed: no shell"));
    }
}
