use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("circular dependency detected: {target} -> {target} (self-reference)")]
    SelfReference { target: String },

    #[error("circular dependency detected in target inheritance: {}", .path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    #[error("Invalid {kind} {name}: {errors}")]
    Validation {
        kind: &'static str,
        name: String,
        errors: validator::ValidationErrors
    },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(String),

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String)
}

impl ConfigError {
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::SelfReference { .. } | Self::CycleDetected { .. })
    }

    /// Target names forming the reported cycle, first node repeated at the end.
    pub fn cycle_path(&self) -> Option<Vec<String>> {
        match self {
            Self::SelfReference { target } => Some(vec![target.clone(), target.clone()]),
            Self::CycleDetected { path } => Some(path.clone()),
            _ => None
        }
    }
}
