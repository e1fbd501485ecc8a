//! # Path and Role Resolution
//!
//! Derives the storage path used to read a source or inherited target, and
//! the execution role ARN used to reach a target account. Both resolvers are
//! total: every input yields a string.
//!
//! Results for inherited targets are only meaningful once
//! [`Config::validate_target_inheritance`] has passed.

use crate::config::{ACCOUNT_ID_PLACEHOLDER, Config, DEFAULT_EXECUTION_ROLE_NAME};
use crate::warn_once::WarnOnce;
use std::sync::Arc;
use tracing::warn;

/// Resolves import names to storage paths.
///
/// Unknown names resolve to themselves and are reported once per name for the
/// lifetime of the attached [`WarnOnce`] set. Share one set between resolvers
/// (see [`PathResolver::with_warn_once`]) to keep that guarantee process-wide.
pub struct PathResolver<'a> {
    config: &'a Config,
    warned: Arc<WarnOnce>
}

impl<'a> PathResolver<'a> {
    /// Creates a resolver with its own private [`WarnOnce`] set.
    ///
    /// Unknown names are reported once per resolver only. Callers that build
    /// a resolver per lookup must use [`PathResolver::with_warn_once`] with a
    /// shared set to report each name once per process.
    pub fn new(config: &'a Config) -> Self {
        Self::with_warn_once(config, Arc::new(WarnOnce::new()))
    }

    pub fn with_warn_once(config: &'a Config, warned: Arc<WarnOnce>) -> Self {
        Self { config, warned }
    }

    pub fn warned(&self) -> &Arc<WarnOnce> {
        &self.warned
    }

    pub fn resolve_path(&self, name: &str) -> String {
        if let Some(vault) = self
            .config
            .sources
            .get(name)
            .and_then(|source| source.vault.as_ref())
        {
            return vault.mount.clone();
        }

        if self.config.targets.contains_key(name) {
            if let Some(merge) = self.config.merge_store.vault.as_ref() {
                return format!("{}/{}", merge.mount, name);
            }
        }

        if self.warned.first_seen(name) {
            warn!(
                import = %name,
                "Unknown import - not found in sources or targets, using import name as path"
            );
        }
        name.to_string()
    }
}

/// Resolves the execution role ARN for a target account.
///
/// ## Precedence
/// 1. Explicit `role_arn` of a target declaring this `account_id`
/// 2. Control Tower mode: `arn:aws:iam::<id>:role<path><name>`
/// 3. Custom role pattern with `{{.AccountID}}` substituted
/// 4. `arn:aws:iam::<id>:role/AWSControlTowerExecution`
pub struct RoleResolver<'a> {
    config: &'a Config
}

impl<'a> RoleResolver<'a> {
    /// Creates a resolver with its own private [`WarnOnce`] set.
    ///
    /// Unknown names are reported once per resolver only. Callers that build
    /// a resolver per lookup must use [`PathResolver::with_warn_once`] with a
    /// shared set to report each name once per process.
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn resolve_role(&self, account_id: &str) -> String {
        let explicit = self.config.targets.values().find_map(|target| {
            (target.account_id.as_deref() == Some(account_id))
                .then(|| target.explicit_role_arn())
                .flatten()
        });
        if let Some(arn) = explicit {
            return arn.to_string();
        }

        let control_tower = &self.config.aws.control_tower;
        if control_tower.enabled {
            let role = &control_tower.execution_role;
            let name = if role.name.is_empty() {
                DEFAULT_EXECUTION_ROLE_NAME
            } else {
                role.name.as_str()
            };
            return format!(
                "arn:aws:iam::{}:role{}{}",
                account_id,
                normalize_role_path(&role.path),
                name
            );
        }

        if let Some(pattern) = self
            .config
            .aws
            .execution_context
            .custom_role_pattern
            .as_deref()
            .filter(|p| !p.is_empty())
        {
            return pattern.replace(ACCOUNT_ID_PLACEHOLDER, account_id);
        }

        format!("arn:aws:iam::{account_id}:role/{DEFAULT_EXECUTION_ROLE_NAME}")
    }
}

/// IAM paths always begin and end with `/`; an empty path is `/`.
pub fn normalize_role_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    let mut normalized = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(path);
    if !path.ends_with('/') {
        normalized.push('/');
    }
    normalized
}
