use crate::error::DiscoveryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A discovered AWS account. Two records are the same account iff their ids
/// are equal; `name` is filled by enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>
}

impl AccountInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryInstance {
    pub instance_arn: String,
    pub identity_store_id: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryGroup {
    pub group_id: String,
    pub display_name: Option<String>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAssignment {
    pub account_id: String,
    pub principal_id: String,
    pub permission_set_arn: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSetDetails {
    pub permission_set_arn: String,
    pub name: Option<String>
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None
        }
    }
}

/// Identity store access (groups and principals).
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn list_groups(
        &self,
        identity_store_id: &str,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<DirectoryGroup>>;
}

/// SSO admin access (instances, permission sets, assignments).
#[async_trait]
pub trait AdminClient: Send + Sync {
    async fn list_instances(
        &self,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<DirectoryInstance>>;

    async fn list_permission_sets(
        &self,
        instance_arn: &str,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<String>>;

    async fn list_account_assignments(
        &self,
        instance_arn: &str,
        permission_set_arn: &str,
        account_id: Option<&str>,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<AccountAssignment>>;

    async fn describe_permission_set(
        &self,
        instance_arn: &str,
        permission_set_arn: &str
    ) -> DiscoveryResult<PermissionSetDetails>;

    async fn list_accounts_for_provisioned_permission_set(
        &self,
        instance_arn: &str,
        permission_set_arn: &str,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<String>>;
}

/// Organization-wide account listing, used for name enrichment.
#[async_trait]
pub trait OrganizationsClient: Send + Sync {
    async fn list_accounts(&self) -> DiscoveryResult<Vec<AccountInfo>>;
}

/// The authenticated cloud session discovery runs under.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    fn can_access_identity_center(&self) -> bool;

    fn can_access_organizations(&self) -> bool;

    async fn admin_client(&self) -> DiscoveryResult<Arc<dyn AdminClient>>;

    fn directory_client(&self) -> Arc<dyn DirectoryClient>;

    async fn organizations_client(&self) -> DiscoveryResult<Arc<dyn OrganizationsClient>>;
}
