//! Plugin Registry
//!
//! Ordered, append-only record of the shared libraries loaded so far.
//! Every read and write goes through one lock, and the loader call itself
//! runs inside that lock, so plugin loading is serialized across threads.
//! The lock is re-entrant: a library initialiser may query the registry
//! from the loading thread while its own load is in progress.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use log::{debug, warn};
use super::diagnostics::{format_load_failure, DiagnosticSink, StderrSink};
use super::error::{PluginError, PluginResult};
use super::loader::{DynamicLoader, SystemLoader};
use super::sync::SmartMutex;

/// Registry of successfully loaded plugin paths
pub struct PluginRegistry {
    /// Loaded paths in load order; duplicates allowed
    entries: SmartMutex<RefCell<Vec<String>>>,

    /// Loader invoked before a path is recorded
    loader: Arc<dyn DynamicLoader>,

    /// Destination for load failure reports
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl PluginRegistry {
    /// Create a registry that loads through the platform linker and reports
    /// failures on stderr
    pub fn new() -> Self {
        Self::with_loader(Arc::new(SystemLoader::new()), Arc::new(StderrSink))
    }

    /// Create a registry with an explicit loader and diagnostic sink
    pub fn with_loader(loader: Arc<dyn DynamicLoader>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            entries: SmartMutex::new(RefCell::new(Vec::new())),
            loader,
            diagnostics,
        }
    }

    /// Load `path` and record it on success.
    ///
    /// A failure is written to the diagnostic sink and otherwise ignored;
    /// nothing is appended and the caller carries on. The report is made
    /// before the lock is released.
    pub fn record_and_load(&self, path: &str) {
        let entries = self.entries.lock();

        if let Err(e) = self.load_into(&entries, path) {
            warn!("{}; -load request ignored", e);
            self.diagnostics.report(&format_load_failure(path, e.message()));
        }
    }

    /// Load `path` and record it on success, returning the loader error
    /// instead of reporting it
    pub fn try_record_and_load(&self, path: &str) -> PluginResult<()> {
        let entries = self.entries.lock();
        self.load_into(&entries, path)
    }

    /// Caller holds the lock. No borrow of `entries` is live across the
    /// loader call so re-entrant queries see the list as it was.
    fn load_into(&self, entries: &RefCell<Vec<String>>, path: &str) -> PluginResult<()> {
        match self.loader.load_library_permanently(path) {
            Ok(()) => {
                let mut entries = entries.borrow_mut();
                entries.push(path.to_string());
                debug!("Loaded plugin #{}: {}", entries.len() - 1, path);
                Ok(())
            }
            Err(PluginError::LoadFailed { message, .. }) => {
                Err(PluginError::load_failed(path, message))
            }
            Err(e) => Err(PluginError::load_failed(path, e.to_string())),
        }
    }

    /// Number of plugins recorded so far
    pub fn count(&self) -> usize {
        self.entries.lock().borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().borrow().is_empty()
    }

    /// Path of the plugin recorded at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.count()`.
    pub fn get(&self, index: usize) -> String {
        let guard = self.entries.lock();
        let entries = guard.borrow();
        assert!(index < entries.len(), "Asking for an out of bounds plugin");
        entries[index].clone()
    }

    /// Snapshot of all recorded paths in load order
    pub fn plugins(&self) -> Vec<String> {
        self.entries.lock().borrow().clone()
    }

    /// Check whether `path` has been recorded at least once
    pub fn contains(&self, path: &str) -> bool {
        self.entries.lock().borrow().iter().any(|p| p == path)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("entries", &*self.entries.lock().borrow())
            .finish_non_exhaustive()
    }
}
