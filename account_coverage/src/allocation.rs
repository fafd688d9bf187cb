use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use crate::config::*;

/// person -> fraction of the person credited to each of their accounts.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct AllocationTable {
    fractions: HashMap<String, f64>,
    accounts: HashMap<String, usize>,
}

impl AllocationTable {
    pub fn build(records: &[DeploymentRecord]) -> AllocationTable {
        let mut by_person: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for r in records.iter() {
            by_person
                .entry(r.person.as_str())
                .or_default()
                .insert(r.account.as_str());
        }
        let accounts: HashMap<String, usize> = by_person
            .iter()
            .map(|(p, accs)| (p.to_string(), accs.len()))
            .collect();
        let fractions: HashMap<String, f64> = accounts
            .iter()
            .map(|(p, n)| (p.clone(), 1.0 / ((*n).max(1) as f64)))
            .collect();
        debug!("AllocationTable::build: {} people", fractions.len());
        AllocationTable {
            fractions,
            accounts,
        }
    }

    /// The fraction of the person credited to each account. Unknown people count fully.
    pub fn for_person(&self, person: &str) -> f64 {
        self.fractions.get(person).cloned().unwrap_or(1.0)
    }

    pub fn account_count(&self, person: &str) -> usize {
        self.accounts.get(person).cloned().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }
}

/// The quota aggregates derived from the quota lines.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct QuotaBook {
    person_totals: HashMap<String, f64>,
    account_targets: HashMap<String, f64>,
    client_engineering: BTreeSet<String>,
}

impl QuotaBook {
    pub fn build(quotas: &[QuotaRecord], rules: &QueryRules) -> QuotaBook {
        let mut book = QuotaBook::default();
        for q in quotas.iter() {
            *book
                .person_totals
                .entry(q.seller_name.clone())
                .or_insert(0.0) += q.target_quota_amt;
            if q.org_code == rules.primary_org_code && !q.territory_type_name.is_empty() {
                // The official target of an account is the largest primary line, not a sum.
                let e = book
                    .account_targets
                    .entry(q.territory_type_name.clone())
                    .or_insert(q.target_quota_amt);
                *e = e.max(q.target_quota_amt);
            }
            if q.org_code == rules.client_engineering_org_code {
                book.client_engineering.insert(q.seller_name.clone());
            }
        }
        debug!(
            "QuotaBook::build: {} sellers, {} account targets",
            book.person_totals.len(),
            book.account_targets.len()
        );
        book
    }

    pub fn has_data(&self) -> bool {
        !self.person_totals.is_empty()
    }

    /// Sum of all the quota lines of a person, 0 if unknown.
    pub fn person_total(&self, person: &str) -> f64 {
        self.person_totals.get(person).cloned().unwrap_or(0.0)
    }

    /// The official target of an account, 0 if unknown.
    pub fn account_target(&self, account: &str) -> f64 {
        self.account_targets.get(account).cloned().unwrap_or(0.0)
    }

    pub fn person_totals(&self) -> BTreeMap<String, f64> {
        self.person_totals
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    pub fn account_targets(&self) -> BTreeMap<String, f64> {
        self.account_targets
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    pub fn is_client_engineering(&self, person: &str) -> bool {
        self.client_engineering.contains(person)
    }

    /// The share of the person's quota credited to one of their accounts.
    pub fn apportioned(&self, person: &str, allocations: &AllocationTable) -> f64 {
        self.person_total(person) * allocations.for_person(person)
    }
}

/// Resolves the team of a record with a fixed precedence: client engineering
/// org code, person type, role keyword, previously recorded role keyword, brand.
#[derive(Debug, Clone)]
pub struct TeamClassifier {
    rules: QueryRules,
    first_roles: HashMap<String, String>,
    // Roster tags apply to the person, including on brand sheet records.
    person_types: HashMap<String, String>,
}

impl TeamClassifier {
    pub fn new(records: &[DeploymentRecord], rules: &QueryRules) -> TeamClassifier {
        let mut first_roles: HashMap<String, String> = HashMap::new();
        let mut person_types: HashMap<String, String> = HashMap::new();
        for r in records.iter() {
            first_roles
                .entry(r.person.clone())
                .or_insert_with(|| r.role.clone());
            if let Some(pt) = r.person_type.as_ref() {
                person_types
                    .entry(r.person.clone())
                    .or_insert_with(|| pt.clone());
            }
        }
        TeamClassifier {
            rules: rules.clone(),
            first_roles,
            person_types,
        }
    }

    fn keyword_team(&self, role: &str) -> Option<String> {
        let role = role.to_lowercase();
        self.rules
            .team_keywords
            .iter()
            .find(|kw| role.contains(&kw.keyword.to_lowercase()))
            .map(|kw| kw.team.clone())
    }

    pub fn team(&self, record: &DeploymentRecord, quotas: &QuotaBook) -> Option<String> {
        if quotas.is_client_engineering(&record.person) {
            return Some(self.rules.client_engineering_team.clone());
        }
        let person_type = record
            .person_type
            .as_ref()
            .or_else(|| self.person_types.get(&record.person));
        if let Some(pt) = person_type {
            if let Some((_, team)) = self.rules.person_type_teams.iter().find(|(t, _)| t == pt) {
                return Some(team.clone());
            }
        }
        if let Some(team) = self.keyword_team(&record.role) {
            return Some(team);
        }
        if let Some(team) = self
            .first_roles
            .get(&record.person)
            .and_then(|role| self.keyword_team(role))
        {
            return Some(team);
        }
        if record.brand.trim().is_empty() {
            None
        } else {
            Some(record.brand.clone())
        }
    }
}

/// Apportioned quota summed per entity, for the given records. A person is
/// credited once per account within an entity, however many roles they hold there.
#[derive(PartialEq, Debug, Clone, Default, serde::Serialize)]
pub struct QuotaBreakdown {
    pub by_flm: BTreeMap<String, f64>,
    pub by_slm: BTreeMap<String, f64>,
    pub by_brand: BTreeMap<String, f64>,
    pub by_team: BTreeMap<String, f64>,
}

pub fn quota_breakdown(
    records: &[&DeploymentRecord],
    allocations: &AllocationTable,
    quotas: &QuotaBook,
    teams: &TeamClassifier,
) -> QuotaBreakdown {
    let mut res = QuotaBreakdown::default();
    let mut seen: [BTreeSet<(String, &str, &str)>; 4] = Default::default();
    for r in records.iter() {
        let q = quotas.apportioned(&r.person, allocations);
        if q == 0.0 {
            continue;
        }
        let team = teams.team(r, quotas);
        let buckets = [
            (&mut res.by_flm, Some(r.flm.clone())),
            (&mut res.by_slm, Some(r.slm.clone())),
            (&mut res.by_brand, Some(r.brand.clone())),
            (&mut res.by_team, team),
        ];
        for ((totals, key), seen_in) in buckets.into_iter().zip(seen.iter_mut()) {
            if let Some(key) = key {
                if seen_in.insert((key.clone(), r.person.as_str(), r.account.as_str())) {
                    *totals.entry(key).or_insert(0.0) += q;
                }
            }
        }
    }
    res
}
