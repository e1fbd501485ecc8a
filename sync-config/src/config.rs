//! # Configuration Structures
//!
//! This module defines the configuration model for secrets synchronization:
//! named sources, named targets (which may inherit from each other through
//! `imports`), the merge store, and the AWS execution-context settings used to
//! derive execution roles.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization
//! - Use `validator` for field-level input validation
//! - Keep declaration order (`IndexMap`) so traversal is deterministic

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Role name used when neither an explicit ARN nor a role name is configured.
pub const DEFAULT_EXECUTION_ROLE_NAME: &str = "AWSControlTowerExecution";

/// Placeholder substituted with the account id in a custom role pattern.
pub const ACCOUNT_ID_PLACEHOLDER: &str = "{{.AccountID}}";

/// Root configuration for a synchronization run.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Aggregates every source and target declared for a run together with the
/// merge store and the AWS execution-context settings. Loaded once per run and
/// treated as immutable afterwards.
///
/// ## Usage
/// ```rust,no_run
/// use sync_config::Config;
///
/// let config = sync_config::from_yaml_str("targets: {}").unwrap();
/// config.validate_all().unwrap();
/// ```
///
/// ## Fields
/// - `sources`: named synchronization origins
/// - `targets`: named synchronization destinations
/// - `merge_store`: storage mount under which inherited targets are merged
/// - `aws`: execution-role settings (Control Tower mode, custom role pattern)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Synchronization origins keyed by name
    #[serde(default)]
    pub sources: IndexMap<String, Source>,

    /// Synchronization destinations keyed by name
    #[serde(default)]
    pub targets: IndexMap<String, Target>,

    /// Merge store used as the base path of inherited targets
    #[serde(default)]
    pub merge_store: MergeStore,

    /// AWS execution context settings
    #[serde(default)]
    pub aws: AwsConfig
}

/// A named synchronization origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Source {
    /// Vault mount holding the source secrets
    #[serde(default)]
    #[validate(nested)]
    pub vault: Option<VaultMount>
}

/// A named synchronization destination.
///
/// A target whose `imports` name another target is an inherited target.
/// Imports that name a source, or nothing declared at all, are not
/// inheritance edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Target {
    /// Ordered references to sources or other targets
    #[serde(default)]
    pub imports: Vec<String>,

    /// AWS account the target writes into
    #[serde(default)]
    #[validate(custom(function = "validate_account_id"))]
    pub account_id: Option<String>,

    /// Explicit execution role override for `account_id`
    #[serde(default)]
    #[validate(custom(function = "validate_role_arn"))]
    pub role_arn: Option<String>,

    /// Dynamic account discovery for this target
    #[serde(default)]
    pub discovery: Option<TargetDiscovery>
}

impl Target {
    /// Explicit role override, ignoring empty strings.
    pub fn explicit_role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref().filter(|arn| !arn.is_empty())
    }
}

/// Discovery settings attached to a target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetDiscovery {
    #[serde(default)]
    pub identity_center: Option<IdentityCenterDiscovery>
}

/// Identity Center discovery specification.
///
/// Either field, or both, may be set. When both are set the accounts found by
/// each strategy are unioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCenterDiscovery {
    /// Identity store group display name (exact, case-sensitive)
    #[serde(default)]
    pub group: Option<String>,

    /// Permission set name (exact, case-sensitive)
    #[serde(default)]
    pub permission_set: Option<String>
}

impl IdentityCenterDiscovery {
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref().filter(|g| !g.is_empty())
    }

    pub fn permission_set(&self) -> Option<&str> {
        self.permission_set.as_deref().filter(|p| !p.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.group().is_none() && self.permission_set().is_none()
    }
}

/// Vault KV mount descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VaultMount {
    #[validate(length(min = 1))]
    pub mount: String
}

/// Merge store configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct MergeStore {
    #[serde(default)]
    #[validate(nested)]
    pub vault: Option<VaultMount>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default)]
    pub control_tower: ControlTowerConfig,

    #[serde(default)]
    pub execution_context: ExecutionContextConfig
}

/// Control Tower (managed landing zone) mode.
///
/// ## Fields
/// - `enabled`: derive role ARNs from `execution_role`
/// - `execution_role.name`: role name (default: `AWSControlTowerExecution`)
/// - `execution_role.path`: IAM path, normalized to `/.../` (default: `/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlTowerConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub execution_role: ExecutionRoleConfig
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRoleConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub path: String
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContextConfig {
    /// Role ARN template; `{{.AccountID}}` is replaced with the account id
    #[serde(default)]
    pub custom_role_pattern: Option<String>
}

fn validate_account_id(value: &str) -> Result<(), ValidationError> {
    if value.len() == 12 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("Account id must be 12 digits"))
    }
}

fn validate_role_arn(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.starts_with("arn:") {
        Ok(())
    } else {
        Err(ValidationError::new("Role ARN must start with arn:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_account_id_validation() {
        let mut target = Target {
            account_id: Some("123456789012".to_string()),
            ..Default::default()
        };
        assert!(target.validate().is_ok());

        target.account_id = Some("12345".to_string());
        assert!(target.validate().is_err());

        target.account_id = Some("12345678901a".to_string());
        assert!(target.validate().is_err());

        target.account_id = None;
        assert!(target.validate().is_ok());
    }

    #[test]
    fn test_target_role_arn_validation() {
        let mut target = Target {
            role_arn: Some("arn:aws:iam::123456789012:role/Deploy".to_string()),
            ..Default::default()
        };
        assert!(target.validate().is_ok());

        target.role_arn = Some(String::new());
        assert!(target.validate().is_ok());

        target.role_arn = Some("role/Deploy".to_string());
        assert!(target.validate().is_err());
    }

    #[test]
    fn test_explicit_role_arn_ignores_empty() {
        let target = Target {
            role_arn: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(target.explicit_role_arn(), None);
    }

    #[test]
    fn test_empty_vault_mount_rejected() {
        let source = Source {
            vault: Some(VaultMount {
                mount: String::new()
            })
        };
        assert!(source.validate().is_err());
    }

    #[test]
    fn test_identity_center_discovery_blank_fields() {
        let spec = IdentityCenterDiscovery {
            group: Some(String::new()),
            permission_set: None
        };
        assert!(spec.is_empty());
        assert_eq!(spec.group(), None);
    }
}
