use crate::client::AccountInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one best-effort step inside a larger enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome<T> {
    Collected(T),
    Skipped { reason: String }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipStage {
    AccountAssignments,
    PermissionSetDetails
}

impl SkipStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountAssignments => "account_assignments",
            Self::PermissionSetDetails => "permission_set_details"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub stage: SkipStage,
    pub item: String,
    pub reason: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub accounts: Vec<AccountInfo>,
    pub skipped: Vec<SkippedItem>
}

impl Default for DiscoveryReport {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            completed_at: None,
            accounts: Vec::new(),
            skipped: Vec::new()
        }
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn add_skipped(&mut self, stage: SkipStage, item: &str, reason: impl ToString) {
        self.skipped.push(SkippedItem {
            stage,
            item: item.to_string(),
            reason: reason.to_string()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_report() {
        let mut report = DiscoveryReport::new();
        assert!(report.completed_at.is_none());
        assert!(!report.is_partial());

        report.add_skipped(SkipStage::AccountAssignments, "arn:ps/1", "throttled");
        assert!(report.is_partial());
        assert_eq!(report.skipped[0].stage.as_str(), "account_assignments");

        report.complete();
        assert!(report.completed_at.is_some());
    }

    #[test]
    fn test_skipped_item_serialization() {
        let item = SkippedItem {
            stage: SkipStage::PermissionSetDetails,
            item: "arn:ps/2".to_string(),
            reason: "access denied".to_string()
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("permission_set_details"));
        assert!(json.contains("arn:ps/2"));
    }
}
