//! Deduplication and name enrichment of discovered accounts.

use crate::client::AccountInfo;
use std::collections::{HashMap, HashSet};

/// Keeps the first record for each account id, preserving first-seen order.
pub fn deduplicate(accounts: Vec<AccountInfo>) -> Vec<AccountInfo> {
    let mut seen: HashSet<String> = HashSet::with_capacity(accounts.len());
    accounts
        .into_iter()
        .filter(|account| seen.insert(account.id.clone()))
        .collect()
}

/// Replaces each account found in `directory` with the directory record.
/// Accounts without a match keep their bare form.
pub fn enrich(accounts: Vec<AccountInfo>, directory: &[AccountInfo]) -> Vec<AccountInfo> {
    let lookup: HashMap<&str, &AccountInfo> = directory
        .iter()
        .map(|account| (account.id.as_str(), account))
        .collect();

    accounts
        .into_iter()
        .map(|account| match lookup.get(account.id.as_str()) {
            Some(enriched) => (*enriched).clone(),
            None => account
        })
        .collect()
}

/// Deduplicates, then enriches when an organization listing is available.
pub fn finalize(accounts: Vec<AccountInfo>, directory: Option<&[AccountInfo]>) -> Vec<AccountInfo> {
    let accounts = deduplicate(accounts);
    match directory {
        Some(directory) => enrich(accounts, directory),
        None => accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(accounts: &[AccountInfo]) -> Vec<&str> {
        accounts.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_deduplicate_keeps_first_occurrence() {
        let accounts = vec![
            AccountInfo::named("1", "first"),
            AccountInfo::new("2"),
            AccountInfo::named("1", "second"),
            AccountInfo::new("3"),
            AccountInfo::new("2")
        ];
        let result = deduplicate(accounts);
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
        assert_eq!(result[0].name.as_deref(), Some("first"));
    }

    #[test]
    fn test_enrich_replaces_matches_only() {
        let directory = vec![
            AccountInfo::named("1", "prod"),
            AccountInfo::named("9", "unrelated")
        ];
        let result = enrich(vec![AccountInfo::new("1"), AccountInfo::new("2")], &directory);
        assert_eq!(
            result,
            vec![AccountInfo::named("1", "prod"), AccountInfo::new("2")]
        );
    }

    #[test]
    fn test_finalize_without_directory_is_passthrough() {
        let accounts = vec![AccountInfo::new("1"), AccountInfo::new("1")];
        assert_eq!(finalize(accounts, None), vec![AccountInfo::new("1")]);
    }

    #[test]
    fn test_finalize_enriches_after_dedup() {
        let directory = vec![AccountInfo::named("2", "staging")];
        let accounts = vec![
            AccountInfo::new("1"),
            AccountInfo::new("2"),
            AccountInfo::new("2")
        ];
        assert_eq!(
            finalize(accounts, Some(directory.as_slice())),
            vec![AccountInfo::new("1"), AccountInfo::named("2", "staging")]
        );
    }

    proptest! {
        #[test]
        fn test_deduplicate_unique_and_ordered(raw in proptest::collection::vec(0u8..16, 0..64)) {
            let accounts: Vec<AccountInfo> = raw.iter().map(|n| AccountInfo::new(n.to_string())).collect();
            let result = deduplicate(accounts);

            let mut expected: Vec<String> = Vec::new();
            for n in &raw {
                let id = n.to_string();
                if !expected.contains(&id) {
                    expected.push(id);
                }
            }
            prop_assert_eq!(result.iter().map(|a| a.id.clone()).collect::<Vec<_>>(), expected);
        }
    }
}
