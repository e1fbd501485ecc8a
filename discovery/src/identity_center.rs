use crate::client::{
    AccountInfo, AdminClient, DirectoryClient, DirectoryInstance, ExecutionContext,
    PermissionSetDetails
};
use crate::error::{DiscoveryError, DiscoveryResult, ResourceKind};
use crate::finalize::finalize;
use crate::report::{DiscoveryReport, ItemOutcome, SkipStage};
use crate::telemetry::DiscoveryTelemetry;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use sync_config::IdentityCenterDiscovery;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const IDENTITY_CENTER: &str = "Identity Center";

/// Discovers the AWS accounts an Identity Center specification refers to.
///
/// Runs the group strategy and/or the permission-set strategy, concatenates
/// their results (group first), deduplicates by account id and enriches with
/// organization account names when available. Holds no mutable state, so one
/// engine can serve concurrent discoveries.
pub struct DiscoveryEngine {
    context: Arc<dyn ExecutionContext>,
    cancel: CancellationToken
}

impl DiscoveryEngine {
    pub fn new(context: Arc<dyn ExecutionContext>) -> Self {
        Self {
            context,
            cancel: CancellationToken::new()
        }
    }

    /// Every collaborator call races against `cancel`; a cancelled token turns
    /// the in-flight call into [`DiscoveryError::Cancelled`].
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub async fn discover(&self, spec: &IdentityCenterDiscovery) -> DiscoveryResult<Vec<AccountInfo>> {
        self.discover_with_report(spec)
            .await
            .map(|report| report.accounts)
    }

    pub async fn discover_with_report(
        &self,
        spec: &IdentityCenterDiscovery
    ) -> DiscoveryResult<DiscoveryReport> {
        let mut report = DiscoveryReport::new();
        debug!(
            group = ?spec.group(),
            permission_set = ?spec.permission_set(),
            "Discovering accounts from Identity Center"
        );

        if !self.context.can_access_identity_center() {
            return Err(DiscoveryError::AccessDenied {
                service: IDENTITY_CENTER
            });
        }

        if spec.is_empty() {
            debug!("Discovery names neither a group nor a permission set");
            report.complete();
            return Ok(report);
        }

        let admin = self
            .guarded("GetAdminClient", self.context.admin_client())
            .await?;
        let instance = self.resolve_instance(admin.as_ref()).await?;

        let mut accounts = Vec::new();

        if let Some(group) = spec.group() {
            let directory = self.context.directory_client();
            let group_id = self
                .find_group_id(directory.as_ref(), &instance.identity_store_id, group)
                .await?;
            let found = self
                .accounts_for_group(admin.as_ref(), &instance.instance_arn, &group_id, &mut report)
                .await?;
            DiscoveryTelemetry::record_accounts("group", found.len());
            accounts.extend(found);
        }

        if let Some(permission_set) = spec.permission_set() {
            let found = self
                .accounts_with_permission_set(
                    admin.as_ref(),
                    &instance.instance_arn,
                    permission_set,
                    &mut report
                )
                .await?;
            DiscoveryTelemetry::record_accounts("permission_set", found.len());
            accounts.extend(found);
        }

        report.accounts = self.finalize(accounts).await?;
        report.complete();

        info!(
            count = report.accounts.len(),
            skipped = report.skipped.len(),
            "Discovered accounts from Identity Center"
        );
        Ok(report)
    }

    async fn guarded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = DiscoveryResult<T>>
    ) -> DiscoveryResult<T> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(DiscoveryError::Cancelled { operation }),
            result = call => result
        }
    }

    /// First instance wins; multiple instances are not disambiguated.
    async fn resolve_instance(&self, admin: &dyn AdminClient) -> DiscoveryResult<DirectoryInstance> {
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .guarded("ListInstances", admin.list_instances(page_token.as_deref()))
                .await?;

            if let Some(instance) = page.items.into_iter().next() {
                debug!(instance_arn = %instance.instance_arn, "Using Identity Center instance");
                return Ok(instance);
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                return Err(DiscoveryError::NoInstances);
            }
        }
    }

    async fn find_group_id(
        &self,
        directory: &dyn DirectoryClient,
        identity_store_id: &str,
        group_name: &str
    ) -> DiscoveryResult<String> {
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .guarded(
                    "ListGroups",
                    directory.list_groups(identity_store_id, page_token.as_deref())
                )
                .await?;

            if let Some(group) = page
                .items
                .into_iter()
                .find(|group| group.display_name.as_deref() == Some(group_name))
            {
                return Ok(group.group_id);
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                return Err(DiscoveryError::NotFound {
                    kind: ResourceKind::Group,
                    name: group_name.to_string()
                });
            }
        }
    }

    async fn accounts_for_group(
        &self,
        admin: &dyn AdminClient,
        instance_arn: &str,
        group_id: &str,
        report: &mut DiscoveryReport
    ) -> DiscoveryResult<Vec<AccountInfo>> {
        let mut accounts = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .guarded(
                    "ListPermissionSets",
                    admin.list_permission_sets(instance_arn, page_token.as_deref())
                )
                .await?;

            for permission_set_arn in &page.items {
                match self
                    .group_assignments(admin, instance_arn, permission_set_arn, group_id)
                    .await?
                {
                    ItemOutcome::Collected(account_ids) => {
                        for account_id in account_ids {
                            if seen.insert(account_id.clone()) {
                                accounts.push(AccountInfo::new(account_id));
                            }
                        }
                    }
                    ItemOutcome::Skipped { reason } => {
                        warn!(
                            permission_set = %permission_set_arn,
                            error = %reason,
                            "Skipping permission set, failed to list account assignments"
                        );
                        DiscoveryTelemetry::record_skipped(SkipStage::AccountAssignments);
                        report.add_skipped(SkipStage::AccountAssignments, permission_set_arn, reason);
                    }
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(accounts)
    }

    /// Account ids assigned to `group_id` through one permission set. Any
    /// listing failure other than cancellation skips the whole permission set.
    async fn group_assignments(
        &self,
        admin: &dyn AdminClient,
        instance_arn: &str,
        permission_set_arn: &str,
        group_id: &str
    ) -> DiscoveryResult<ItemOutcome<Vec<String>>> {
        let mut account_ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let result = self
                .guarded(
                    "ListAccountAssignments",
                    admin.list_account_assignments(
                        instance_arn,
                        permission_set_arn,
                        None,
                        page_token.as_deref()
                    )
                )
                .await;

            let page = match result {
                Ok(page) => page,
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    return Ok(ItemOutcome::Skipped {
                        reason: e.to_string()
                    });
                }
            };

            account_ids.extend(
                page.items
                    .into_iter()
                    .filter(|assignment| assignment.principal_id == group_id)
                    .map(|assignment| assignment.account_id)
            );

            page_token = page.next_page_token;
            if page_token.is_none() {
                return Ok(ItemOutcome::Collected(account_ids));
            }
        }
    }

    async fn accounts_with_permission_set(
        &self,
        admin: &dyn AdminClient,
        instance_arn: &str,
        permission_set_name: &str,
        report: &mut DiscoveryReport
    ) -> DiscoveryResult<Vec<AccountInfo>> {
        let permission_set_arn = self
            .find_permission_set_arn(admin, instance_arn, permission_set_name, report)
            .await?;

        let mut accounts = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .guarded(
                    "ListAccountsForProvisionedPermissionSet",
                    admin.list_accounts_for_provisioned_permission_set(
                        instance_arn,
                        &permission_set_arn,
                        page_token.as_deref()
                    )
                )
                .await?;

            accounts.extend(page.items.into_iter().map(AccountInfo::new));

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(accounts)
    }

    async fn find_permission_set_arn(
        &self,
        admin: &dyn AdminClient,
        instance_arn: &str,
        permission_set_name: &str,
        report: &mut DiscoveryReport
    ) -> DiscoveryResult<String> {
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .guarded(
                    "ListPermissionSets",
                    admin.list_permission_sets(instance_arn, page_token.as_deref())
                )
                .await?;

            for permission_set_arn in page.items {
                match self
                    .describe_permission_set(admin, instance_arn, &permission_set_arn)
                    .await?
                {
                    ItemOutcome::Collected(details)
                        if details.name.as_deref() == Some(permission_set_name) =>
                    {
                        return Ok(permission_set_arn);
                    }
                    ItemOutcome::Collected(_) => {}
                    ItemOutcome::Skipped { reason } => {
                        warn!(
                            permission_set = %permission_set_arn,
                            error = %reason,
                            "Skipping permission set, failed to describe it"
                        );
                        DiscoveryTelemetry::record_skipped(SkipStage::PermissionSetDetails);
                        report.add_skipped(SkipStage::PermissionSetDetails, &permission_set_arn, reason);
                    }
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                return Err(DiscoveryError::NotFound {
                    kind: ResourceKind::PermissionSet,
                    name: permission_set_name.to_string()
                });
            }
        }
    }

    async fn describe_permission_set(
        &self,
        admin: &dyn AdminClient,
        instance_arn: &str,
        permission_set_arn: &str
    ) -> DiscoveryResult<ItemOutcome<PermissionSetDetails>> {
        match self
            .guarded(
                "DescribePermissionSet",
                admin.describe_permission_set(instance_arn, permission_set_arn)
            )
            .await
        {
            Ok(details) => Ok(ItemOutcome::Collected(details)),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => Ok(ItemOutcome::Skipped {
                reason: e.to_string()
            })
        }
    }

    /// Deduplicates and enriches. Enrichment is best-effort: any failure other
    /// than cancellation leaves the records unenriched.
    async fn finalize(&self, accounts: Vec<AccountInfo>) -> DiscoveryResult<Vec<AccountInfo>> {
        let directory = self.organization_accounts().await?;
        Ok(finalize(accounts, directory.as_deref()))
    }

    async fn organization_accounts(&self) -> DiscoveryResult<Option<Vec<AccountInfo>>> {
        if !self.context.can_access_organizations() {
            return Ok(None);
        }

        let result = match self
            .guarded("GetOrganizationsClient", self.context.organizations_client())
            .await
        {
            Ok(client) => self.guarded("ListAccounts", client.list_accounts()).await,
            Err(e) => Err(e)
        };

        match result {
            Ok(accounts) => Ok(Some(accounts)),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!(error = %e, "Organization account listing failed, skipping enrichment");
                DiscoveryTelemetry::record_enrichment_failure();
                Ok(None)
            }
        }
    }
}
