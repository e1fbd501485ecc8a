//! # Configuration File Loading
//!
//! Loads configuration from TOML or YAML files.
//!
//! Supports automatic format detection based on file extension. Loading only
//! parses; call [`Config::validate_all`] before trusting the result.

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::debug;

/// Load configuration from TOML file.
///
/// ## Error Handling
/// Returns `ConfigError` for:
/// - File not found
/// - Invalid TOML syntax
pub fn load_from_toml(path: &Path) -> ConfigResult<Config> {
    let contents = read(path)?;
    toml::from_str(&contents).map_err(|e| ConfigError::TomlParse(e.to_string()))
}

/// Load configuration from YAML file.
///
/// ## Usage
/// ```rust,no_run
/// use sync_config::load_from_yaml;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_yaml(Path::new("pipeline.yaml"))?;
///     config.validate_all()?;
///     Ok(())
/// }
/// ```
pub fn load_from_yaml(path: &Path) -> ConfigResult<Config> {
    let contents = read(path)?;
    from_yaml_str(&contents)
}

/// Parse configuration from an in-memory YAML document.
pub fn from_yaml_str(contents: &str) -> ConfigResult<Config> {
    serde_yaml::from_str(contents).map_err(|e| ConfigError::YamlParse(e.to_string()))
}

/// Load configuration from file with auto-detection.
///
/// ## Supported Formats
/// - `.toml`: TOML format
/// - `.yaml`: YAML format
/// - `.yml`: YAML format
pub fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(ConfigError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(ConfigError::UnsupportedFormat(other.to_string()))
    }
}

fn read(path: &Path) -> ConfigResult<String> {
    debug!(path = %path.display(), "Loading configuration file");
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
        _ => ConfigError::Io(e)
    })
}
