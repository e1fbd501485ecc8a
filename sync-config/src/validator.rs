//! # Configuration Validation
//!
//! Field-level checks use the `validator` crate; structural checks (target
//! inheritance) live in [`crate::inheritance`].

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use validator::Validate;

impl Config {
    /// Validate every source, target and the merge store, then the target
    /// inheritance graph.
    ///
    /// ## Validation Rules
    /// - `targets.*.account_id`: exactly 12 digits when present
    /// - `targets.*.role_arn`: starts with `arn:` when present and non-empty
    /// - `sources.*.vault.mount`, `merge_store.vault.mount`: non-empty
    /// - Target inheritance must be acyclic
    pub fn validate_all(&self) -> ConfigResult<()> {
        validate_fields(self)?;
        self.validate_target_inheritance()
    }
}

/// Field-level validation only.
pub fn validate_fields(config: &Config) -> ConfigResult<()> {
    for (name, source) in &config.sources {
        source.validate().map_err(|errors| ConfigError::Validation {
            kind: "source",
            name: name.clone(),
            errors
        })?;
    }

    for (name, target) in &config.targets {
        target.validate().map_err(|errors| ConfigError::Validation {
            kind: "target",
            name: name.clone(),
            errors
        })?;
    }

    config
        .merge_store
        .validate()
        .map_err(|errors| ConfigError::Validation {
            kind: "merge store",
            name: "merge_store".to_string(),
            errors
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Target, VaultMount};

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate_all().is_ok());
    }

    #[test]
    fn test_validate_invalid_account_id() {
        let mut config = Config::default();
        config.targets.insert(
            "prod".to_string(),
            Target {
                account_id: Some("prod-account".to_string()),
                ..Default::default()
            }
        );
        let err = config.validate_all().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { kind: "target", ref name, .. } if name == "prod"));
    }

    #[test]
    fn test_validate_empty_merge_store_mount() {
        let mut config = Config::default();
        config.merge_store.vault = Some(VaultMount {
            mount: String::new()
        });
        assert!(matches!(
            validate_fields(&config),
            Err(ConfigError::Validation {
                kind: "merge store",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_reports_cycles_after_fields() {
        let mut config = Config::default();
        config.targets.insert(
            "a".to_string(),
            Target {
                imports: vec!["a".to_string()],
                ..Default::default()
            }
        );
        assert!(validate_fields(&config).is_ok());
        assert!(config.validate_all().unwrap_err().is_cycle());
    }
}
