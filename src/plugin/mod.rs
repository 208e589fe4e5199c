//! Plugin Loading Module
//!
//! Loads shared-library plugins into the running process and keeps an
//! ordered record of every library that loaded successfully.
//!
//! # Example Usage
//!
//! ```no_run
//! use plugload::plugin::PluginLoader;
//!
//! let loader = PluginLoader::process();
//! loader.assign("./libmyplugin.so");
//!
//! for index in 0..loader.num_plugins() {
//!     println!("{}", loader.plugin(index));
//! }
//! ```

pub mod diagnostics;
pub mod error;
pub mod global;
pub mod loader;
pub mod registry;
pub mod sync;

#[cfg(test)]
pub mod tests;

pub use diagnostics::{BufferSink, DiagnosticSink, StderrSink};
pub use error::{PluginError, PluginResult};
pub use global::{global, PluginLoader};
pub use loader::{DynamicLoader, SystemLoader};
pub use registry::PluginRegistry;
