//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{load_configuration, configure_logging};
pub use execution::{apply_plugin_loads, render_plugin_list, run, LoadSummary};
