//! Routes each directive of a task list to the plugins that handle it.
use serde_yaml::{Mapping, Value};

use crate::config::Task;
use crate::logging::DirectiveStatus;
use crate::plugins::{Context, PluginRegistry};

/// Directive that replaces the context defaults before plugins see it.
const DEFAULTS: &str = "defaults";

/// Walks tasks in order and hands every directive to the registry.
#[derive(Debug)]
pub struct Dispatcher {
    registry: PluginRegistry,
    only: Vec<String>,
    skip: Vec<String>,
    exit_on_failure: bool,
}

impl Dispatcher {
    /// Create a dispatcher over `registry` with no filters.
    #[must_use]
    pub const fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            only: Vec::new(),
            skip: Vec::new(),
            exit_on_failure: false,
        }
    }

    /// Run only these directives; empty means all.
    #[must_use]
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    /// Skip these directives.
    #[must_use]
    pub fn with_skip(mut self, skip: Vec<String>) -> Self {
        self.skip = skip;
        self
    }

    /// Stop at the first failed directive.
    #[must_use]
    pub const fn with_exit_on_failure(mut self, exit_on_failure: bool) -> Self {
        self.exit_on_failure = exit_on_failure;
        self
    }

    /// Whether the `--only` / `--except` filters let `action` through.
    ///
    /// `defaults` is never filtered.
    fn selected(&self, action: &str) -> bool {
        if action == DEFAULTS {
            return true;
        }
        if !self.only.is_empty() && !self.only.iter().any(|o| o == action) {
            return false;
        }
        !self.skip.iter().any(|s| s == action)
    }

    /// Dispatch every directive of every task, in order.
    ///
    /// Returns `true` when no directive failed. Each directive's status is
    /// recorded on the context's log for the run summary.
    pub fn dispatch(&self, tasks: &[Task], ctx: &mut Context) -> bool {
        let mut success = true;
        for task in tasks {
            for (key, data) in task {
                let Some(action) = key.as_str() else {
                    ctx.log.error(&format!("Invalid action name {key:?}"));
                    success = false;
                    if self.exit_on_failure {
                        return false;
                    }
                    continue;
                };

                if !self.selected(action) {
                    ctx.log.info(&format!("Skipping action {action}"));
                    ctx.log
                        .record_directive(action, DirectiveStatus::Skipped, Some("filtered"));
                    continue;
                }

                let ok = if action == DEFAULTS {
                    apply_defaults(data, ctx) && self.share_defaults(data, ctx)
                } else {
                    self.run_directive(action, data, ctx)
                };

                if !ok {
                    success = false;
                    if self.exit_on_failure {
                        ctx.log
                            .error(&format!("Action {action} failed, stopping"));
                        return false;
                    }
                }
            }
        }
        success
    }

    /// Hand `data` to every plugin that claims `action`.
    fn offer(&self, action: &str, data: &Value, ctx: &Context) -> Offer {
        let mut offer = Offer {
            handled: false,
            ran: false,
            ok: true,
            error: None,
        };

        for plugin in self.registry.iter() {
            if !plugin.can_handle(action) {
                continue;
            }
            if ctx.dry_run && !plugin.supports_dry_run() {
                ctx.log.info(&format!(
                    "Skipping dry-run-unaware plugin {}",
                    plugin.name()
                ));
                offer.handled = true;
                continue;
            }
            match plugin.handle(action, data, ctx) {
                Ok(result) => {
                    offer.handled = true;
                    offer.ran = true;
                    offer.ok &= result;
                }
                Err(e) if e.is_not_applicable() => {
                    ctx.log.debug(&e.to_string());
                }
                Err(e) => {
                    offer.handled = true;
                    offer.ran = true;
                    offer.ok = false;
                    ctx.log.error(&format!(
                        "An error was encountered while executing action {action}: {e}"
                    ));
                    offer.error = Some(e.to_string());
                }
            }
        }
        offer
    }

    /// Run one directive and record its status.
    fn run_directive(&self, action: &str, data: &Value, ctx: &Context) -> bool {
        ctx.log.stage(action);
        let offer = self.offer(action, data, ctx);

        let (status, message) = if !offer.handled {
            ctx.log.error(&format!("Action {action} not handled"));
            (DirectiveStatus::Failed, Some("not handled".to_string()))
        } else if !offer.ok {
            (DirectiveStatus::Failed, offer.error)
        } else if !offer.ran {
            (
                DirectiveStatus::Skipped,
                Some("no plugin supports dry run".to_string()),
            )
        } else if ctx.dry_run {
            (DirectiveStatus::DryRun, None)
        } else {
            (DirectiveStatus::Ok, None)
        };
        ctx.log
            .record_directive(action, status, message.as_deref());
        status != DirectiveStatus::Failed
    }

    /// Pass an accepted `defaults` block on to plugins that claim it.
    ///
    /// Nothing is reported when no plugin takes it; only a failing plugin is
    /// recorded.
    fn share_defaults(&self, data: &Value, ctx: &Context) -> bool {
        let offer = self.offer(DEFAULTS, data, ctx);
        if !offer.ok {
            ctx.log
                .record_directive(DEFAULTS, DirectiveStatus::Failed, offer.error.as_deref());
        }
        offer.ok
    }
}

/// What the registry did with one directive.
struct Offer {
    /// Some plugin claimed it (including dry-run skips).
    handled: bool,
    /// Some plugin actually ran.
    ran: bool,
    /// No plugin that ran failed.
    ok: bool,
    /// Last plugin error, for the summary.
    error: Option<String>,
}

/// Replace the context defaults with a `defaults` block.
fn apply_defaults(data: &Value, ctx: &mut Context) -> bool {
    match data {
        Value::Mapping(defaults) => {
            ctx.set_defaults(defaults.clone());
            true
        }
        Value::Null => {
            ctx.set_defaults(Mapping::new());
            true
        }
        _ => {
            ctx.log.error("Defaults must be a mapping of directive names to options");
            ctx.log.record_directive(
                DEFAULTS,
                DirectiveStatus::Failed,
                Some("not a mapping"),
            );
            false
        }
    }
}
