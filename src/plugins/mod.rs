//! Directive handlers and the registry the dispatcher consults.
//!
//! Each built-in directive (`link`, `create`, `clean`, `shell`) is a
//! [`Plugin`]. Embedders add their own by implementing the trait and calling
//! [`PluginRegistry::register`]; there is no dynamic discovery.
pub mod clean;
mod context;
pub mod create;
pub mod link;
pub mod shell;

pub use context::Context;

use serde_yaml::Value;

use crate::error::DirectiveError;

/// A handler for one or more directive names.
pub trait Plugin: Send + Sync {
    /// Human-readable plugin name.
    fn name(&self) -> &str;

    /// Whether this plugin handles `directive`.
    fn can_handle(&self, directive: &str) -> bool;

    /// Process the data of `directive`.
    ///
    /// Returns `Ok(true)` when every item succeeded and `Ok(false)` when at
    /// least one failed after the rest were still attempted.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::NotApplicable`] for a directive this plugin
    /// does not own, and other variants when the data cannot be processed at
    /// all. Nothing is mutated when an error is returned.
    fn handle(&self, directive: &str, data: &Value, ctx: &Context) -> Result<bool, DirectiveError>;

    /// Whether the plugin honors [`Context::dry_run`].
    ///
    /// Plugins that do not are skipped entirely during a dry run.
    fn supports_dry_run(&self) -> bool {
        false
    }
}

/// Return [`DirectiveError::NotApplicable`] unless `plugin` handles `directive`.
pub(crate) fn ensure_handles(plugin: &dyn Plugin, directive: &str) -> Result<(), DirectiveError> {
    if plugin.can_handle(directive) {
        Ok(())
    } else {
        Err(DirectiveError::NotApplicable {
            plugin: plugin.name().to_string(),
            directive: directive.to_string(),
        })
    }
}

/// The built-in plugins, in dispatch order.
#[must_use]
pub fn builtin_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(clean::Clean),
        Box::new(create::Create),
        Box::new(link::Link),
        Box::new(shell::Shell),
    ]
}

/// Ordered set of plugins offered every directive.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

impl PluginRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in plugins.
    #[must_use]
    pub fn builtins() -> Self {
        Self {
            plugins: builtin_plugins(),
        }
    }

    /// Append a plugin; it is offered directives after those already registered.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Registered plugins in order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(AsRef::as_ref)
    }

    /// Names of the registered plugins in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Whether no plugin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
