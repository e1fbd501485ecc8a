//! AWS SDK implementations of the discovery collaborators.

use crate::client::{
    AccountAssignment, AccountInfo, AdminClient, DirectoryClient, DirectoryGroup,
    DirectoryInstance, ExecutionContext, OrganizationsClient, Page, PermissionSetDetails
};
use crate::error::{DiscoveryError, DiscoveryResult};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use std::sync::Arc;
use tracing::debug;

/// Identity store (groups) client.
pub struct AwsIdentityStore {
    client: aws_sdk_identitystore::Client
}

impl AwsIdentityStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_identitystore::Client::new(config)
        }
    }
}

#[async_trait]
impl DirectoryClient for AwsIdentityStore {
    async fn list_groups(
        &self,
        identity_store_id: &str,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<DirectoryGroup>> {
        let output = self
            .client
            .list_groups()
            .identity_store_id(identity_store_id)
            .set_next_token(page_token.map(String::from))
            .send()
            .await
            .map_err(|e| {
                DiscoveryError::external(
                    "ListGroups",
                    aws_sdk_identitystore::error::DisplayErrorContext(&e)
                )
            })?;

        Ok(Page {
            items: output
                .groups()
                .iter()
                .map(|group| DirectoryGroup {
                    group_id: group.group_id().to_string(),
                    display_name: group.display_name().map(String::from)
                })
                .collect(),
            next_page_token: output.next_token().map(String::from)
        })
    }
}

/// SSO admin (Identity Center) client.
pub struct AwsSsoAdmin {
    client: aws_sdk_ssoadmin::Client
}

impl AwsSsoAdmin {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssoadmin::Client::new(config)
        }
    }
}

fn sso_error<E>(operation: &'static str, e: &E) -> DiscoveryError
where
    E: std::error::Error
{
    DiscoveryError::external(operation, aws_sdk_ssoadmin::error::DisplayErrorContext(e))
}

#[async_trait]
impl AdminClient for AwsSsoAdmin {
    async fn list_instances(
        &self,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<DirectoryInstance>> {
        let output = self
            .client
            .list_instances()
            .set_next_token(page_token.map(String::from))
            .send()
            .await
            .map_err(|e| sso_error("ListInstances", &e))?;

        Ok(Page {
            items: output
                .instances()
                .iter()
                .filter_map(|instance| {
                    Some(DirectoryInstance {
                        instance_arn: instance.instance_arn()?.to_string(),
                        identity_store_id: instance.identity_store_id()?.to_string()
                    })
                })
                .collect(),
            next_page_token: output.next_token().map(String::from)
        })
    }

    async fn list_permission_sets(
        &self,
        instance_arn: &str,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<String>> {
        let output = self
            .client
            .list_permission_sets()
            .instance_arn(instance_arn)
            .set_next_token(page_token.map(String::from))
            .send()
            .await
            .map_err(|e| sso_error("ListPermissionSets", &e))?;

        Ok(Page {
            items: output.permission_sets().to_vec(),
            next_page_token: output.next_token().map(String::from)
        })
    }

    async fn list_account_assignments(
        &self,
        instance_arn: &str,
        permission_set_arn: &str,
        account_id: Option<&str>,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<AccountAssignment>> {
        let output = self
            .client
            .list_account_assignments()
            .instance_arn(instance_arn)
            .permission_set_arn(permission_set_arn)
            .set_account_id(account_id.map(String::from))
            .set_next_token(page_token.map(String::from))
            .send()
            .await
            .map_err(|e| sso_error("ListAccountAssignments", &e))?;

        Ok(Page {
            items: output
                .account_assignments()
                .iter()
                .filter_map(|assignment| {
                    Some(AccountAssignment {
                        account_id: assignment.account_id()?.to_string(),
                        principal_id: assignment.principal_id()?.to_string(),
                        permission_set_arn: assignment
                            .permission_set_arn()
                            .unwrap_or(permission_set_arn)
                            .to_string()
                    })
                })
                .collect(),
            next_page_token: output.next_token().map(String::from)
        })
    }

    async fn describe_permission_set(
        &self,
        instance_arn: &str,
        permission_set_arn: &str
    ) -> DiscoveryResult<PermissionSetDetails> {
        let output = self
            .client
            .describe_permission_set()
            .instance_arn(instance_arn)
            .permission_set_arn(permission_set_arn)
            .send()
            .await
            .map_err(|e| sso_error("DescribePermissionSet", &e))?;

        Ok(PermissionSetDetails {
            permission_set_arn: permission_set_arn.to_string(),
            name: output
                .permission_set()
                .and_then(|permission_set| permission_set.name())
                .map(String::from)
        })
    }

    async fn list_accounts_for_provisioned_permission_set(
        &self,
        instance_arn: &str,
        permission_set_arn: &str,
        page_token: Option<&str>
    ) -> DiscoveryResult<Page<String>> {
        let output = self
            .client
            .list_accounts_for_provisioned_permission_set()
            .instance_arn(instance_arn)
            .permission_set_arn(permission_set_arn)
            .set_next_token(page_token.map(String::from))
            .send()
            .await
            .map_err(|e| sso_error("ListAccountsForProvisionedPermissionSet", &e))?;

        Ok(Page {
            items: output.account_ids().to_vec(),
            next_page_token: output.next_token().map(String::from)
        })
    }
}

/// Organizations account listing.
pub struct AwsOrganizations {
    client: aws_sdk_organizations::Client
}

impl AwsOrganizations {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_organizations::Client::new(config)
        }
    }
}

#[async_trait]
impl OrganizationsClient for AwsOrganizations {
    async fn list_accounts(&self) -> DiscoveryResult<Vec<AccountInfo>> {
        let mut accounts = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_accounts()
                .set_next_token(page_token.take())
                .send()
                .await
                .map_err(|e| {
                    DiscoveryError::external(
                        "ListAccounts",
                        aws_sdk_organizations::error::DisplayErrorContext(&e)
                    )
                })?;

            accounts.extend(output.accounts().iter().filter_map(|account| {
                Some(AccountInfo {
                    id: account.id()?.to_string(),
                    name: account.name().map(String::from)
                })
            }));

            page_token = output.next_token().map(String::from);
            if page_token.is_none() {
                break;
            }
        }

        debug!(count = accounts.len(), "Listed organization accounts");
        Ok(accounts)
    }
}

/// Execution context backed by a loaded AWS SDK configuration.
///
/// Access flags are decided by the caller (for example after probing the
/// delegated-administrator status of the current account).
pub struct AwsExecutionContext {
    config: SdkConfig,
    identity_center_access: bool,
    organizations_access: bool
}

impl AwsExecutionContext {
    pub fn new(config: SdkConfig) -> Self {
        Self {
            config,
            identity_center_access: true,
            organizations_access: false
        }
    }

    /// Loads credentials and region from the default provider chain.
    pub async fn from_env() -> Self {
        Self::new(aws_config::defaults(BehaviorVersion::latest()).load().await)
    }

    pub fn with_identity_center_access(mut self, allowed: bool) -> Self {
        self.identity_center_access = allowed;
        self
    }

    pub fn with_organizations_access(mut self, allowed: bool) -> Self {
        self.organizations_access = allowed;
        self
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }
}

#[async_trait]
impl ExecutionContext for AwsExecutionContext {
    fn can_access_identity_center(&self) -> bool {
        self.identity_center_access
    }

    fn can_access_organizations(&self) -> bool {
        self.organizations_access
    }

    async fn admin_client(&self) -> DiscoveryResult<Arc<dyn AdminClient>> {
        if self.config.region().is_none() {
            return Err(DiscoveryError::ConfigError(
                "no AWS region configured for Identity Center".to_string()
            ));
        }
        Ok(Arc::new(AwsSsoAdmin::new(&self.config)))
    }

    fn directory_client(&self) -> Arc<dyn DirectoryClient> {
        Arc::new(AwsIdentityStore::new(&self.config))
    }

    async fn organizations_client(&self) -> DiscoveryResult<Arc<dyn OrganizationsClient>> {
        Ok(Arc::new(AwsOrganizations::new(&self.config)))
    }
}
