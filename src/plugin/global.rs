//! Process-wide Registry
//!
//! `global()` hands out the single registry shared by the whole process,
//! created on first use and never torn down. `PluginLoader` is the
//! handler a repeatable `--load` option feeds, one call per occurrence.

use super::registry::PluginRegistry;

/// The process-wide plugin registry
#[cfg(feature = "threads")]
pub fn global() -> &'static PluginRegistry {
    use std::sync::OnceLock;

    static REGISTRY: OnceLock<PluginRegistry> = OnceLock::new();
    REGISTRY.get_or_init(PluginRegistry::new)
}

/// Single-threaded builds have no `Sync` lock, so the one registry lives
/// with the one thread.
#[cfg(not(feature = "threads"))]
pub fn global() -> &'static PluginRegistry {
    thread_local! {
        static REGISTRY: &'static PluginRegistry = Box::leak(Box::new(PluginRegistry::new()));
    }
    REGISTRY.with(|registry| *registry)
}

/// Option handler that loads plugins into a registry
#[derive(Debug, Clone, Copy)]
pub struct PluginLoader<'a> {
    registry: &'a PluginRegistry,
}

impl PluginLoader<'static> {
    /// Handler bound to the process-wide registry
    pub fn process() -> Self {
        Self { registry: global() }
    }
}

impl<'a> PluginLoader<'a> {
    /// Handler bound to an explicit registry
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    /// Handle one occurrence of the load option
    pub fn assign(&self, filename: &str) {
        self.registry.record_and_load(filename);
    }

    pub fn num_plugins(&self) -> usize {
        self.registry.count()
    }

    /// # Panics
    ///
    /// Panics if `index >= self.num_plugins()`.
    pub fn plugin(&self, index: usize) -> String {
        self.registry.get(index)
    }

    pub fn registry(&self) -> &'a PluginRegistry {
        self.registry
    }
}

impl Default for PluginLoader<'static> {
    fn default() -> Self {
        Self::process()
    }
}
