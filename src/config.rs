use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};
use crate::plugin::PluginError;

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Typed values as parsed, keyed like `Configuration`
type ValueTable = HashMap<String, HashMap<String, Value>>;

/// Section holding plugin settings
pub const PLUGINS_SECTION: &str = "plugins";

/// Configuration manager
#[derive(Debug)]
pub struct ConfigManager {
    config: Configuration,
    values: ValueTable,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing).
    /// Every value is taken as a plain string.
    pub fn from_config(config: Configuration) -> Self {
        let values = config
            .iter()
            .map(|(section, entries)| {
                let entries = entries
                    .iter()
                    .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                    .collect();
                (section.clone(), entries)
            })
            .collect();

        Self {
            config,
            values,
            config_file_path: None,
            selected_section: None,
        }
    }

    fn from_values(values: ValueTable) -> Self {
        let config = values
            .iter()
            .map(|(section, entries)| {
                let entries = entries
                    .iter()
                    .map(|(key, value)| (key.clone(), toml_value_to_string(value)))
                    .collect();
                (section.clone(), entries)
            })
            .collect();

        Self {
            config,
            values,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(Self::from_values(parse_toml_config(content)?))
    }

    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                return Self::load_from_file(path);
            }
        }

        debug!("No configuration file found, using empty configuration");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut manager = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        manager.config_file_path = Some(path);

        Ok(manager)
    }

    /// File the configuration came from, if any
    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    /// Look a key up with section fallback
    fn lookup<'a, V>(&self, table: &'a HashMap<String, HashMap<String, V>>, section: &str, key: &str) -> Option<&'a V> {
        // Priority: selected_section -> specified section -> base
        if let Some(selected) = &self.selected_section {
            if let Some(value) = table.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = table.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        table.get("base").and_then(|s| s.get(key))
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        self.lookup(&self.config, section, key)
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Get a list of strings; accepts a TOML array or a single string
    pub fn get_list(&self, section: &str, key: &str) -> Result<Vec<String>, PluginError> {
        match self.lookup(&self.values, section, key) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(PluginError::configuration_error(format!(
                        "{}.{} must contain only strings, found {}", section, key, other
                    ))),
                })
                .collect(),
            Some(other) => Err(PluginError::configuration_error(format!(
                "{}.{} must be a string or a list of strings, found {}", section, key, other
            ))),
        }
    }

    /// Plugin libraries to load before any `--load` option, in file order
    pub fn preload_plugins(&self) -> Result<Vec<String>, PluginError> {
        self.get_list(PLUGINS_SECTION, "preload")
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $PLUGLOAD_CONFIG
    if let Ok(env_path) = env::var("PLUGLOAD_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("plugload").join("config.toml"));
    }

    // 3. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".plugload.toml"));
    }

    // 4. Project local
    paths.push(PathBuf::from("./.plugload.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content into sections of typed values
fn parse_toml_config(content: &str) -> Result<ValueTable> {
    let table: toml::Table = content.parse()
        .context("Failed to parse TOML content")?;

    let mut values = ValueTable::new();
    flatten_toml_table(&table, String::new(), &mut values);

    debug!("Parsed configuration: {:?}", values);
    Ok(values)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, values: &mut ValueTable) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) if subtable.values().any(|v| v.is_table()) => {
                flatten_toml_table(subtable, section_name, values);
            }
            Value::Table(subtable) => {
                values
                    .entry(section_name)
                    .or_default()
                    .extend(subtable.iter().map(|(subkey, subvalue)| (subkey.clone(), subvalue.clone())));
            }
            _ => {
                // Keys outside any section belong to base
                let owner = if prefix.is_empty() { "base".to_string() } else { prefix.clone() };
                values
                    .entry(owner)
                    .or_default()
                    .insert(key.clone(), value.clone());
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_toml_value_to_string_conversion() {
        assert_eq!(toml_value_to_string(&Value::String("libfoo.so".to_string())), "libfoo.so");
        assert_eq!(toml_value_to_string(&Value::Integer(42)), "42");
        assert_eq!(toml_value_to_string(&Value::Boolean(false)), "false");
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_content = r#"
log-format = "json"

[base]
console-level = "debug"
log-file = "/tmp/plugload.log"

[plugins]
preload = ["./liba.so", "/opt/plugins/libb.so"]

[profile.ci]
console-level = "warn"
"#;

        let manager = ConfigManager::from_toml_str(toml_content).unwrap();

        assert_eq!(manager.get_value("base", "log-format").unwrap(), "json");
        assert_eq!(manager.get_value("base", "console-level").unwrap(), "debug");
        assert_eq!(manager.get_value("base", "log-file").unwrap(), "/tmp/plugload.log");
        assert!(manager.get_value("plugins", "preload").is_some());
        assert_eq!(manager.get_value("profile.ci", "console-level").unwrap(), "warn");
    }

    #[test]
    fn test_section_selection_overrides_base() {
        let mut config = Configuration::new();
        config.insert(
            "base".to_string(),
            HashMap::from([("console-level".to_string(), "info".to_string())]),
        );
        config.insert(
            "quiet".to_string(),
            HashMap::from([("console-level".to_string(), "error".to_string())]),
        );

        let mut manager = ConfigManager::from_config(config);
        assert_eq!(manager.get_value("base", "console-level").unwrap(), "info");

        manager.select_section("quiet".to_string());
        assert_eq!(manager.get_value("base", "console-level").unwrap(), "error");
    }

    #[test]
    fn test_type_conversion() {
        let mut config = Configuration::new();
        config.insert(
            "base".to_string(),
            HashMap::from([
                ("console-level".to_string(), "warn".to_string()),
                ("log-file".to_string(), "/tmp/plugload.log".to_string()),
            ]),
        );
        let manager = ConfigManager::from_config(config);

        assert_eq!(manager.get_log_level("base", "console-level").unwrap(), Some(log::LevelFilter::Warn));
        assert_eq!(manager.get_path("base", "log-file").unwrap(), PathBuf::from("/tmp/plugload.log"));
        assert!(manager.get_path("base", "missing").is_none());
    }

    #[test]
    fn test_preload_plugins_from_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[plugins]\npreload = [\"./liba.so\", \"./libb.so\"]\n").unwrap();

        let manager = ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(manager.preload_plugins().unwrap(), vec!["./liba.so", "./libb.so"]);
        assert_eq!(manager.config_file_path().unwrap(), temp_file.path());
    }

    #[test]
    fn test_preload_single_string() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[plugins]\npreload = \"./only.so\"\n").unwrap();

        let manager = ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap();
        assert_eq!(manager.preload_plugins().unwrap(), vec!["./only.so"]);
    }

    #[test]
    fn test_preload_string_with_brackets_is_one_path() {
        let manager = ConfigManager::from_toml_str("[plugins]\npreload = \"[x].so\"\n").unwrap();
        assert_eq!(manager.preload_plugins().unwrap(), vec!["[x].so"]);

        // Strings set directly are never read as arrays either
        let mut config = Configuration::new();
        config.insert(
            PLUGINS_SECTION.to_string(),
            HashMap::from([("preload".to_string(), "[\"a.so\"]".to_string())]),
        );
        let manager = ConfigManager::from_config(config);
        assert_eq!(manager.preload_plugins().unwrap(), vec!["[\"a.so\"]"]);
    }

    #[test]
    fn test_preload_rejects_other_types() {
        let manager = ConfigManager::from_toml_str("[plugins]\npreload = 7\n").unwrap();
        assert!(matches!(
            manager.preload_plugins().unwrap_err(),
            PluginError::ConfigurationError { .. }
        ));
    }

    #[test]
    fn test_preload_rejects_non_strings() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[plugins]\npreload = [\"./a.so\", 3]\n").unwrap();

        let manager = ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap();
        let error = manager.preload_plugins().unwrap_err();
        assert!(matches!(error, PluginError::ConfigurationError { .. }));
    }

    #[test]
    fn test_missing_preload_is_empty() {
        let manager = ConfigManager::from_config(Configuration::new());
        assert!(manager.preload_plugins().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_toml_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[plugins\npreload = ").unwrap();

        assert!(ConfigManager::load_from_file(temp_file.path().to_path_buf()).is_err());
    }
}
