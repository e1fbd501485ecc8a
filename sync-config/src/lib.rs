//! # Sync Configuration
//!
//! Configuration model and target resolution for multi-account secrets sync.
//!
//! This crate provides:
//! - Configuration structures for sources, targets and the merge store
//! - Configuration file loading (TOML/YAML)
//! - Field validation and target inheritance (cycle) validation
//! - Storage path resolution with warn-once diagnostics
//! - Execution role ARN resolution

pub mod config;
pub mod error;
pub mod file_loader;
pub mod inheritance;
pub mod resolver;
pub mod validator;
pub mod warn_once;

pub use config::{
    AwsConfig, Config, ControlTowerConfig, ExecutionContextConfig, ExecutionRoleConfig,
    IdentityCenterDiscovery, MergeStore, Source, Target, TargetDiscovery, VaultMount
};
pub use error::{ConfigError, ConfigResult};
pub use file_loader::{from_yaml_str, load_from_file, load_from_toml, load_from_yaml};
pub use resolver::{PathResolver, RoleResolver, normalize_role_path};
pub use crate::validator::validate_fields;
pub use warn_once::WarnOnce;
