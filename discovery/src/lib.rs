//! Account discovery for secrets sync targets.
//!
//! Expands an Identity Center discovery specification (group and/or
//! permission set) into the concrete, deduplicated list of AWS accounts it
//! refers to.

pub mod aws;
pub mod client;
pub mod error;
pub mod finalize;
pub mod identity_center;
pub mod report;
pub mod telemetry;

pub use aws::{AwsExecutionContext, AwsIdentityStore, AwsOrganizations, AwsSsoAdmin};
pub use client::{
    AccountAssignment, AccountInfo, AdminClient, DirectoryClient, DirectoryGroup,
    DirectoryInstance, ExecutionContext, OrganizationsClient, Page, PermissionSetDetails
};
pub use error::{DiscoveryError, DiscoveryResult, ResourceKind};
pub use identity_center::DiscoveryEngine;
pub use report::{DiscoveryReport, ItemOutcome, SkipStage, SkippedItem};
pub use sync_config::IdentityCenterDiscovery;
