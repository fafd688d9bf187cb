use std::collections::BTreeMap;

use serde::Serialize;

use crate::allocation::AllocationTable;
use crate::config::*;

fn non_empty(c: &Option<String>) -> Option<&str> {
    c.as_deref().map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        [
            &self.brand,
            &self.account,
            &self.slm,
            &self.flm,
            &self.person,
            &self.role,
            &self.person_type,
        ]
        .iter()
        .all(|c| non_empty(c).is_none())
    }

    pub fn matches(&self, r: &DeploymentRecord) -> bool {
        if let Some(b) = self.brand.as_deref().filter(|s| !s.is_empty()) {
            if r.brand != b {
                return false;
            }
        }
        if let Some(a) = self.account.as_deref().filter(|s| !s.is_empty()) {
            if r.account != a {
                return false;
            }
        }
        if let Some(slm) = non_empty(&self.slm) {
            if r.slm.trim() != slm {
                return false;
            }
        }
        if let Some(flm) = non_empty(&self.flm) {
            if r.flm.trim() != flm {
                return false;
            }
        }
        if let Some(p) = non_empty(&self.person) {
            if !contains_ignore_case(&r.person, p) {
                return false;
            }
        }
        if let Some(role) = non_empty(&self.role) {
            if !contains_ignore_case(&r.role, role) {
                return false;
            }
        }
        if let Some(pt) = non_empty(&self.person_type) {
            match r.person_type.as_deref() {
                Some(rpt) if contains_ignore_case(rpt, pt) => {}
                _ => return false,
            }
        }
        true
    }
}

pub fn filter_records<'a>(
    records: &'a [DeploymentRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a DeploymentRecord> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

/// The value of one record under the aggregation mode.
pub fn record_weight(r: &DeploymentRecord, mode: AggregationMode, alloc: &AllocationTable) -> f64 {
    match mode {
        AggregationMode::Raw => 1.0,
        AggregationMode::Fte => alloc.for_person(&r.person),
    }
}

/// Sums per account, and per account and brand.
#[derive(PartialEq, Debug, Clone, Default, Serialize)]
pub struct AccountAggregate {
    pub by_account: BTreeMap<String, f64>,
    pub by_account_brand: BTreeMap<String, BTreeMap<String, f64>>,
}

pub fn aggregate(
    records: &[&DeploymentRecord],
    mode: AggregationMode,
    alloc: &AllocationTable,
) -> AccountAggregate {
    let mut res = AccountAggregate::default();
    for r in records.iter() {
        let w = record_weight(r, mode, alloc);
        *res.by_account.entry(r.account.clone()).or_insert(0.0) += w;
        *res
            .by_account_brand
            .entry(r.account.clone())
            .or_default()
            .entry(r.brand.clone())
            .or_insert(0.0) += w;
    }
    res
}

/// Sums per value of a key. The key function returns None for the records
/// that do not belong to any group.
pub fn group_sum<F>(
    records: &[&DeploymentRecord],
    mode: AggregationMode,
    alloc: &AllocationTable,
    key: F,
) -> BTreeMap<String, f64>
where
    F: Fn(&DeploymentRecord) -> Option<String>,
{
    let mut res: BTreeMap<String, f64> = BTreeMap::new();
    for r in records.iter() {
        if let Some(k) = key(*r) {
            *res.entry(k).or_insert(0.0) += record_weight(r, mode, alloc);
        }
    }
    res
}
