use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::config::*;
use crate::extract::split_list;

type AccountsByManager = BTreeMap<String, BTreeSet<String>>;

/// The accounts each manager appears on, per tier, as found in brand sheets.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ManagerIndex {
    tier1: AccountsByManager,
    tier2: AccountsByManager,
}

impl ManagerIndex {
    pub fn build(brand_records: &[DeploymentRecord]) -> ManagerIndex {
        let mut idx = ManagerIndex::default();
        for r in brand_records.iter() {
            if r.slm != NOT_AVAILABLE {
                idx.tier1
                    .entry(r.slm.clone())
                    .or_default()
                    .insert(r.account.clone());
            }
            if r.flm != NOT_AVAILABLE {
                idx.tier2
                    .entry(r.flm.clone())
                    .or_default()
                    .insert(r.account.clone());
            }
        }
        debug!(
            "ManagerIndex::build: {} tier-1 managers, {} tier-2 managers",
            idx.tier1.len(),
            idx.tier2.len()
        );
        idx
    }

    pub fn accounts(&self, tier: ManagerTier, name: &str) -> Option<&BTreeSet<String>> {
        match tier {
            ManagerTier::Tier1 => self.tier1.get(name),
            ManagerTier::Tier2 => self.tier2.get(name),
        }
    }
}

/// The accounts of a roster entry: from the manager hierarchy when the person
/// is a manager there, otherwise from the free text coverage list.
fn resolve_accounts(entry: &RosterEntry, index: &ManagerIndex) -> Vec<String> {
    let mut accounts: BTreeSet<String> = BTreeSet::new();
    if let Some(tier) = entry.tier {
        if let Some(found) = index.accounts(tier, &entry.person) {
            accounts.extend(found.iter().cloned());
        }
    }
    if accounts.is_empty() {
        if let Some(coverage) = entry.coverage.as_ref() {
            accounts.extend(split_list(coverage));
        }
    }
    accounts.into_iter().collect()
}

/// Attaches accounts to the roster entries. Every entry yields at least one
/// record: people without any account are put on the unassigned account.
pub fn link_roster(
    roster: &[RosterEntry],
    brand_records: &[DeploymentRecord],
    rules: &ParseRules,
) -> Vec<DeploymentRecord> {
    let index = ManagerIndex::build(brand_records);
    let mut res: Vec<DeploymentRecord> = Vec::new();
    let mut unassigned = 0;
    for entry in roster.iter() {
        let mut accounts = resolve_accounts(entry, &index);
        if accounts.is_empty() {
            debug!(
                "link_roster: no account found for {:?} ({})",
                entry.person, entry.person_type
            );
            unassigned += 1;
            accounts.push(rules.unassigned_account.clone());
        }

        let na = || NOT_AVAILABLE.to_string();
        let (slm, flm) = match entry.tier {
            Some(ManagerTier::Tier1) => (entry.person.clone(), na()),
            Some(ManagerTier::Tier2) => (
                entry.manager.clone().unwrap_or_else(na),
                entry.person.clone(),
            ),
            None => (na(), entry.manager.clone().unwrap_or_else(na)),
        };
        for account in accounts {
            res.push(DeploymentRecord {
                account,
                brand: entry.person_type.clone(),
                slm: slm.clone(),
                flm: flm.clone(),
                person: entry.person.clone(),
                role: entry
                    .title
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
                hierarchy_name: entry.person_type.clone(),
                client_type: None,
                person_type: Some(entry.person_type.clone()),
            });
        }
    }
    info!(
        "link_roster: {} roster entries linked into {} records ({} unassigned)",
        roster.len(),
        res.len(),
        unassigned
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand_record(account: &str, slm: &str, flm: &str, person: &str) -> DeploymentRecord {
        DeploymentRecord {
            account: account.to_string(),
            brand: "Data".to_string(),
            slm: slm.to_string(),
            flm: flm.to_string(),
            person: person.to_string(),
            role: "Engineer".to_string(),
            hierarchy_name: "Group 1".to_string(),
            client_type: None,
            person_type: None,
        }
    }

    fn entry(person: &str, tier: Option<ManagerTier>, coverage: Option<&str>) -> RosterEntry {
        RosterEntry {
            person: person.to_string(),
            tier,
            title: None,
            coverage: coverage.map(|s| s.to_string()),
            manager: None,
            level: None,
            person_type: "CE".to_string(),
        }
    }

    fn brand_records() -> Vec<DeploymentRecord> {
        vec![
            brand_record("Acme Corp", "Jane", "Bob", "Carol"),
            brand_record("Beta Inc", "Jane", "Ann", "Dave"),
            brand_record("Acme Corp", "Jane", "Bob", "Dave"),
        ]
    }

    #[test]
    fn tier1_manager_gets_all_accounts() {
        let roster = vec![entry("Jane", Some(ManagerTier::Tier1), None)];
        let out = link_roster(&roster, &brand_records(), &ParseRules::default());
        let accounts: Vec<&str> = out.iter().map(|r| r.account.as_str()).collect();
        assert_eq!(accounts, vec!["Acme Corp", "Beta Inc"]);
        assert!(out.iter().all(|r| r.person == "Jane" && r.slm == "Jane"));
        assert!(out.iter().all(|r| r.person_type == Some("CE".to_string())));
    }

    #[test]
    fn tier2_uses_tier2_map_only() {
        // Jane is not a tier-2 manager anywhere.
        let roster = vec![
            entry("Bob", Some(ManagerTier::Tier2), None),
            entry("Jane", Some(ManagerTier::Tier2), None),
        ];
        let out = link_roster(&roster, &brand_records(), &ParseRules::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].account, "Acme Corp");
        assert_eq!(out[0].flm, "Bob");
        assert_eq!(out[1].account, UNASSIGNED);
    }

    #[test]
    fn coverage_is_a_fallback() {
        let roster = vec![
            entry("Zed", None, Some("Gamma, TBD, Delta")),
            entry("Jane", Some(ManagerTier::Tier1), Some("Omega")),
        ];
        let out = link_roster(&roster, &brand_records(), &ParseRules::default());
        let accounts: Vec<(&str, &str)> = out
            .iter()
            .map(|r| (r.person.as_str(), r.account.as_str()))
            .collect();
        assert_eq!(
            accounts,
            vec![
                ("Zed", "Delta"),
                ("Zed", "Gamma"),
                ("Jane", "Acme Corp"),
                ("Jane", "Beta Inc")
            ]
        );
    }

    #[test]
    fn every_entry_yields_a_record() {
        let roster = vec![entry("Nobody", None, None), entry("Tbd", None, Some("-"))];
        let out = link_roster(&roster, &[], &ParseRules::default());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.account == UNASSIGNED));
    }
}
