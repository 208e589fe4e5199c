//! Application execution: plugin loading and listing

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use crate::cli::{self, OutputFormat};
use crate::config::ConfigManager;
use crate::plugin::{sync, PluginLoader, PluginRegistry};

/// Outcome of processing every load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub requested: usize,
    pub loaded: usize,
}

impl LoadSummary {
    pub fn failed(&self) -> usize {
        self.requested - self.loaded
    }
}

#[derive(Serialize)]
struct PluginListing<'a> {
    count: usize,
    plugins: Vec<PluginEntry<'a>>,
}

#[derive(Serialize)]
struct PluginEntry<'a> {
    index: usize,
    path: &'a str,
}

/// Feed configured preloads, then each `--load` value in command-line
/// order, to the option handler. Failed loads are reported by the
/// registry and do not stop the remaining requests.
pub fn apply_plugin_loads(args: &cli::Args, config: &ConfigManager, loader: &PluginLoader<'_>) -> Result<LoadSummary> {
    let preloads = if args.no_preload {
        Vec::new()
    } else {
        config.preload_plugins().context("Invalid [plugins] preload setting")?
    };

    let before = loader.num_plugins();
    let requests: Vec<&String> = preloads.iter().chain(args.load.iter()).collect();
    debug!("Processing {} plugin load request(s) ({} from configuration)", requests.len(), preloads.len());

    for path in &requests {
        loader.assign(path);
    }

    let summary = LoadSummary {
        requested: requests.len(),
        loaded: loader.num_plugins() - before,
    };

    if summary.failed() > 0 {
        warn!("{} of {} plugin(s) could not be loaded", summary.failed(), summary.requested);
    } else if summary.requested > 0 {
        info!("Loaded {} plugin(s)", summary.loaded);
    }

    Ok(summary)
}

/// Render the registry contents for display
pub fn render_plugin_list(registry: &PluginRegistry, format: OutputFormat) -> Result<String> {
    let plugins = registry.plugins();

    match format {
        OutputFormat::Text => {
            let mut output = format!("Loaded plugins ({}):\n", plugins.len());
            for (index, path) in plugins.iter().enumerate() {
                output.push_str(&format!("  {:>3}  {}\n", index, path));
            }
            Ok(output)
        }
        OutputFormat::Json => {
            let listing = PluginListing {
                count: plugins.len(),
                plugins: plugins
                    .iter()
                    .enumerate()
                    .map(|(index, path)| PluginEntry { index, path })
                    .collect(),
            };
            let mut json = serde_json::to_string_pretty(&listing)
                .context("Failed to serialize plugin list")?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Process load requests against `loader` and print the listing if asked
pub fn run(args: &cli::Args, config: &ConfigManager, loader: &PluginLoader<'_>) -> Result<LoadSummary> {
    debug!(
        "Plugin registry lock: {}",
        if sync::threads_enabled() { "mutex" } else { "single-threaded" }
    );
    let summary = apply_plugin_loads(args, config, loader)?;

    if args.list {
        print!("{}", render_plugin_list(loader.registry(), args.format)?);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::plugin::tests::mock_loaders::{scripted_registry, ScriptedLoader};
    use clap::Parser;

    fn args(argv: &[&str]) -> cli::Args {
        cli::Args::try_parse_from(std::iter::once("plugload").chain(argv.iter().copied())).unwrap()
    }

    fn preload_config(list: &str) -> ConfigManager {
        ConfigManager::from_toml_str(&format!("[plugins]\npreload = {}\n", list)).unwrap()
    }

    #[test]
    fn test_loads_follow_command_line_order() {
        let (registry, loader, _sink) = scripted_registry(ScriptedLoader::new());
        let handler = PluginLoader::new(&registry);

        let summary = apply_plugin_loads(
            &args(&["--load", "b.so", "--load", "a.so"]),
            &ConfigManager::from_config(Configuration::new()),
            &handler,
        ).unwrap();

        assert_eq!(summary, LoadSummary { requested: 2, loaded: 2 });
        assert_eq!(loader.calls(), vec!["b.so", "a.so"]);
        assert_eq!(registry.plugins(), vec!["b.so", "a.so"]);
    }

    #[test]
    fn test_preloads_come_first() {
        let (registry, _loader, _sink) = scripted_registry(ScriptedLoader::new());
        let handler = PluginLoader::new(&registry);

        apply_plugin_loads(
            &args(&["--load", "cli.so"]),
            &preload_config(r#"["first.so", "second.so"]"#),
            &handler,
        ).unwrap();

        assert_eq!(registry.plugins(), vec!["first.so", "second.so", "cli.so"]);
    }

    #[test]
    fn test_no_preload_skips_configuration() {
        let (registry, _loader, _sink) = scripted_registry(ScriptedLoader::new());
        let handler = PluginLoader::new(&registry);

        apply_plugin_loads(
            &args(&["--no-preload", "--load", "cli.so"]),
            &preload_config(r#"["first.so"]"#),
            &handler,
        ).unwrap();

        assert_eq!(registry.plugins(), vec!["cli.so"]);
    }

    #[test]
    fn test_failures_do_not_stop_later_loads() {
        let (registry, _loader, sink) = scripted_registry(
            ScriptedLoader::new().failing("libb.so", "symbol not found"),
        );
        let handler = PluginLoader::new(&registry);

        let summary = apply_plugin_loads(
            &args(&["--load", "liba.so", "--load", "libb.so", "--load", "libc.so"]),
            &ConfigManager::from_config(Configuration::new()),
            &handler,
        ).unwrap();

        assert_eq!(summary.failed(), 1);
        assert_eq!(registry.plugins(), vec!["liba.so", "libc.so"]);
        assert!(sink.contents().contains("symbol not found"));
    }

    #[test]
    fn test_empty_load_value_reported_and_skipped() {
        let (registry, _loader, sink) = scripted_registry(
            ScriptedLoader::new().failing("", "empty library path"),
        );
        let handler = PluginLoader::new(&registry);

        let summary = apply_plugin_loads(
            &args(&["--load", "liba.so", "--load", "", "--load", "libb.so"]),
            &ConfigManager::from_config(Configuration::new()),
            &handler,
        ).unwrap();

        assert_eq!(summary, LoadSummary { requested: 3, loaded: 2 });
        assert_eq!(registry.plugins(), vec!["liba.so", "libb.so"]);
        assert!(sink.contents().contains("Error opening '': empty library path"));
    }

    #[test]
    fn test_bad_preload_setting_is_an_error() {
        let (registry, _loader, _sink) = scripted_registry(ScriptedLoader::new());
        let handler = PluginLoader::new(&registry);

        let result = apply_plugin_loads(&args(&[]), &preload_config("[1, 2]"), &handler);
        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_render_text_listing() {
        let (registry, _loader, _sink) = scripted_registry(ScriptedLoader::new());
        registry.record_and_load("liba.so");
        registry.record_and_load("libb.so");

        let text = render_plugin_list(&registry, OutputFormat::Text).unwrap();
        assert_eq!(text, "Loaded plugins (2):\n    0  liba.so\n    1  libb.so\n");
    }

    #[test]
    fn test_render_json_listing() {
        let (registry, _loader, _sink) = scripted_registry(ScriptedLoader::new());
        registry.record_and_load("liba.so");

        let json = render_plugin_list(&registry, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["plugins"][0]["index"], 0);
        assert_eq!(value["plugins"][0]["path"], "liba.so");
    }

    #[test]
    fn test_render_empty_listing() {
        let (registry, _loader, _sink) = scripted_registry(ScriptedLoader::new());
        let text = render_plugin_list(&registry, OutputFormat::Text).unwrap();
        assert_eq!(text, "Loaded plugins (0):\n");
    }
}
