//! Load shared-library plugins into the running process and keep an
//! ordered record of the libraries that loaded.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod plugin;

pub use plugin::{PluginError, PluginLoader, PluginRegistry, PluginResult};
