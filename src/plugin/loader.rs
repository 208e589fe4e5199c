//! Dynamic Library Loading
//!
//! The registry never talks to the OS loader directly; it goes through
//! `DynamicLoader` so tests and embedders can substitute their own.

use log::trace;
use super::error::{PluginError, PluginResult};

/// Loads a shared library into the running process for good
pub trait DynamicLoader: Send + Sync {
    /// Load the library at `path`. On success the library stays resident
    /// until the process exits; there is no matching unload.
    fn load_library_permanently(&self, path: &str) -> PluginResult<()>;
}

/// Loader backed by the platform dynamic linker
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLoader;

impl SystemLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DynamicLoader for SystemLoader {
    fn load_library_permanently(&self, path: &str) -> PluginResult<()> {
        if path.is_empty() {
            return Err(PluginError::load_failed(path, "empty library path"));
        }

        trace!("Opening shared library: {}", path);

        // SAFETY: loading a library runs its initialisers. Callers asked for
        // this library explicitly, which is the whole purpose of the option.
        let library = unsafe { libloading::Library::new(path) }
            .map_err(|e| PluginError::load_failed(path, e.to_string()))?;

        // Dropping the handle would dlclose it
        std::mem::forget(library);
        Ok(())
    }
}
