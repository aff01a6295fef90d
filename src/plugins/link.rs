//! The `link` directive: reconcile declared links with the filesystem.
use std::path::{MAIN_SEPARATOR, Path};

use serde_yaml::Value;

use super::{Context, Plugin, ensure_handles};
use crate::config::link::{LinkOptions, LinkSpec, parse};
use crate::error::DirectiveError;
use crate::exec::Streams;
use crate::resources::fs::ensure_parent;
use crate::resources::glob::{derive_target, expand, has_glob_chars};
use crate::resources::guard;
use crate::resources::link::{LinkPaths, link};
use crate::resources::{LinkFailure, LinkOutcome};

const DIRECTIVE: &str = "link";

/// Counters for the outcomes of one `link` directive.
///
/// # Examples
///
/// ```
/// use dotlink::plugins::link::LinkStats;
/// use dotlink::resources::LinkOutcome;
///
/// let mut stats = LinkStats::default();
/// stats.record(&LinkOutcome::Created);
/// stats.record(&LinkOutcome::AlreadyCorrect);
/// stats.record(&LinkOutcome::AlreadyCorrect);
///
/// assert_eq!(stats.summary(false), "1 created, 2 already ok");
/// assert_eq!(stats.summary(true), "1 would create, 2 already ok");
/// assert!(stats.is_success());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    /// Links created (or that would be, in a dry run).
    pub created: u32,
    /// Targets that already were the requested link.
    pub already_ok: u32,
    /// Targets whose `if` test failed.
    pub skipped: u32,
    /// Targets that could not be reconciled.
    pub failed: u32,
}

impl LinkStats {
    /// Count one outcome.
    pub const fn record(&mut self, outcome: &LinkOutcome) {
        match outcome {
            LinkOutcome::Created => self.created += 1,
            LinkOutcome::AlreadyCorrect => self.already_ok += 1,
            LinkOutcome::Skipped => self.skipped += 1,
            LinkOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Whether no target failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Human-readable summary; zero skipped and failed counts are omitted.
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would create" } else { "created" };
        let mut out = format!("{} {verb}, {} already ok", self.created, self.already_ok);
        if self.skipped > 0 {
            out.push_str(&format!(", {} skipped", self.skipped));
        }
        if self.failed > 0 {
            out.push_str(&format!(", {} failed", self.failed));
        }
        out
    }
}

/// Handles the `link` directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Link;

impl Plugin for Link {
    fn name(&self) -> &str {
        "Link"
    }

    fn can_handle(&self, directive: &str) -> bool {
        directive == DIRECTIVE
    }

    fn handle(&self, directive: &str, data: &Value, ctx: &Context) -> Result<bool, DirectiveError> {
        ensure_handles(self, directive)?;
        let specs = parse(data, ctx.defaults_for(DIRECTIVE))?;

        let mut stats = LinkStats::default();
        for spec in &specs {
            for outcome in reconcile_spec(ctx, spec) {
                stats.record(&outcome);
            }
        }

        ctx.log.debug(&format!("link: {}", stats.summary(ctx.dry_run)));
        if stats.is_success() {
            ctx.log.info("All links have been set up");
        } else {
            ctx.log.error("Some links were not successfully set up");
        }
        Ok(stats.is_success())
    }

    fn supports_dry_run(&self) -> bool {
        true
    }
}

/// Reconcile one configured entry, expanding it into pairs when globbing.
///
/// Returns one outcome per (source, target) pair; a glob that matches
/// nothing yields no outcomes.
pub fn reconcile_spec(ctx: &Context, spec: &LinkSpec) -> Vec<LinkOutcome> {
    let options = &spec.options;

    if let Some(test) = &options.test
        && !test_passes(ctx, test)
    {
        ctx.log.info(&format!("Skipping {}", spec.target));
        return vec![LinkOutcome::Skipped];
    }

    if options.glob {
        if has_glob_chars(&spec.source) {
            return reconcile_glob(ctx, spec);
        }
        if spec.target.ends_with(['/', MAIN_SEPARATOR]) {
            ctx.log.warn(&format!(
                "Ambiguous glob target {} for '{}': link the directory or into it?",
                spec.target, spec.source
            ));
            return vec![LinkOutcome::Failed(LinkFailure::Ambiguous)];
        }
    }

    vec![reconcile_pair(
        ctx,
        Path::new(&spec.source),
        Path::new(&spec.target),
        options,
        true,
    )]
}

/// Run an `if` test in the base directory with every stream suppressed.
///
/// A test that cannot be spawned counts as failed.
fn test_passes(ctx: &Context, command: &str) -> bool {
    match ctx
        .executor
        .shell(command, &ctx.base_directory(true), Streams::QUIET)
    {
        Ok(result) if result.success => true,
        Ok(_) => {
            ctx.log.debug(&format!("Test '{command}' returned false"));
            false
        }
        Err(e) => {
            ctx.log.warn(&format!("Test '{command}' could not be run: {e:#}"));
            false
        }
    }
}

fn reconcile_glob(ctx: &Context, spec: &LinkSpec) -> Vec<LinkOutcome> {
    let options = &spec.options;
    let matches = match expand(&spec.source, &options.exclude, &ctx.base_directory(false)) {
        Ok(matches) => matches,
        Err(e) => {
            ctx.log
                .warn(&format!("Invalid glob pattern '{}': {e}", spec.source));
            return vec![LinkOutcome::Failed(LinkFailure::InvalidGlob(e.to_string()))];
        }
    };

    if matches.is_empty() {
        ctx.log
            .info(&format!("Globs from '{}' matched nothing", spec.source));
        return Vec::new();
    }
    ctx.log.debug(&format!(
        "Globs from '{}': {} matches",
        spec.source,
        matches.len()
    ));

    let destination = Path::new(&spec.target);
    matches
        .iter()
        .map(|matched| {
            let target = derive_target(&spec.source, matched, destination, &options.prefix);
            reconcile_pair(ctx, matched, &target, options, false)
        })
        .collect()
}

/// Take one pair through parent creation, removal, and linking.
///
/// With `check_source`, a missing source fails the pair before the guard
/// gets a chance to remove the target.
fn reconcile_pair(
    ctx: &Context,
    source: &Path,
    target: &Path,
    options: &LinkOptions,
    check_source: bool,
) -> LinkOutcome {
    let paths = LinkPaths::resolve(ctx, source, target, options.relative, options.canonicalize);

    if options.create && !ensure_parent(ctx, &paths.target) {
        return LinkOutcome::Failed(LinkFailure::ParentCreationFailed);
    }

    if check_source && !options.ignore_missing && !ctx.fs_ops.exists(&paths.absolute_source) {
        ctx.log.warn(&format!(
            "Nonexistent source {} -> {}",
            paths.target.display(),
            paths.absolute_source.display()
        ));
        return LinkOutcome::Failed(LinkFailure::NonexistentSource);
    }

    let mut did_delete = false;
    if options.force || options.relink {
        let removal = guard::delete(ctx, &paths, options.force);
        if !removal.success {
            let failure = if guard::aliases_source(ctx, &paths) {
                LinkFailure::SameFile
            } else {
                LinkFailure::RemovalFailed
            };
            return LinkOutcome::Failed(failure);
        }
        did_delete = removal.removed;
    }

    link(
        ctx,
        &paths,
        options.link_type,
        options.ignore_missing,
        did_delete,
    )
}
