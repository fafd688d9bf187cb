/*!
Turns an account coverage workbook into normalized deployment records and
derives headcount, FTE and quota metrics from them.

A workbook has one sheet per brand, plus optional roster and quota sheets.
Brand sheets have no fixed schema: the columns are organised in groups, each
group starting with a second-line manager column (`SLM`), optionally followed
by a first-line manager column (`FLM`), and then by role columns holding the
names of the people deployed on the account of the row.

The main entry point is [`build_session`] (or the [`builder::Builder`]), which
returns a [`Session`] holding all the derived tables.

See the [`manual`] module for the expected layout of each sheet type.
*/
mod allocation;
pub mod builder;
mod classifier;
mod config;
mod extract;
mod linker;
pub mod manual;
mod query;
mod sheets;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::{debug, info};
use serde::Serialize;

pub use crate::allocation::{AllocationTable, QuotaBook, QuotaBreakdown, TeamClassifier};
pub use crate::classifier::classify_columns;
pub use crate::config::*;
pub use crate::extract::{extract_row, is_placeholder, split_list, split_names, RowContext};
pub use crate::linker::link_roster;
pub use crate::query::AccountAggregate;
pub use crate::sheets::{route_sheet, ParsedWorkbook, SheetKind, SkipReason};

// ******** Output data structures *********

/// One person deployed on an account, with their share of capacity and quota.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct PersonAllocation {
    pub person: String,
    pub role: String,
    pub brand: String,
    pub allocation: f64,
    pub account_count: usize,
    pub apportioned_quota: Option<f64>,
    /// Share of the person's total quota credited to this account, in percent.
    pub quota_percentage: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct AccountQuota {
    pub account_target: f64,
    pub breakdown: QuotaBreakdown,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct AccountDetails {
    pub account: String,
    pub mode: AggregationMode,
    pub total_headcount: usize,
    pub total_fte: f64,
    pub brand_breakdown: BTreeMap<String, f64>,
    pub role_breakdown: BTreeMap<String, f64>,
    pub people: Vec<PersonAllocation>,
    pub quota: Option<AccountQuota>,
}

/// The distinct values offered by the selection controls.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub brands: BTreeSet<String>,
    pub accounts: BTreeSet<String>,
    pub slms: BTreeSet<String>,
    pub flms: BTreeSet<String>,
    pub person_types: BTreeSet<String>,
    pub roles: BTreeSet<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Summary {
    pub total_accounts: usize,
    pub total_records: usize,
    pub distinct_people: usize,
    pub total_fte: f64,
    pub avg_per_account: f64,
    pub top_account: Option<(String, usize)>,
    pub brand_counts: BTreeMap<String, usize>,
    pub top_roles: Vec<(String, usize)>,
}

/// The quota lookups derived for the whole workbook.
#[derive(PartialEq, Debug, Clone, Default, Serialize)]
pub struct QuotaAggregates {
    pub by_person: BTreeMap<String, f64>,
    pub by_account: BTreeMap<String, f64>,
    pub breakdown: QuotaBreakdown,
}

const TOP_ROLES: usize = 10;

/// All the tables derived from one workbook.
///
/// A session is immutable once built. Loading another workbook means building
/// another session.
#[derive(Debug, Clone)]
pub struct Session {
    records: Vec<DeploymentRecord>,
    quotas: Vec<QuotaRecord>,
    skipped_sheets: Vec<(String, SkipReason)>,
    allocations: AllocationTable,
    quota_book: QuotaBook,
    teams: TeamClassifier,
}

/// Runs the whole pipeline on the sheets of a workbook.
///
/// Arguments:
/// * `sheets` the sheets, in workbook order
/// * `rules` how to recognize the sheet types and the manager columns
/// * `query_rules` how quota and teams are derived
pub fn build_session(
    sheets: &[Sheet],
    rules: &ParseRules,
    query_rules: &QueryRules,
) -> Result<Session, CoverageErrors> {
    rules.validate()?;
    let mut seen: HashSet<&str> = HashSet::new();
    for s in sheets.iter() {
        if !seen.insert(s.name.as_str()) {
            return Err(CoverageErrors::DuplicateSheet(s.name.clone()));
        }
    }
    info!("build_session: processing {} sheets", sheets.len());

    let parsed = crate::sheets::read_workbook(sheets, rules);
    let linked = link_roster(&parsed.roster, &parsed.brand_records, rules);

    let mut records = parsed.brand_records;
    records.extend(linked);
    let allocations = AllocationTable::build(&records);
    let quota_book = QuotaBook::build(&parsed.quotas, query_rules);
    let teams = TeamClassifier::new(&records, query_rules);

    info!(
        "build_session: {} records, {} people, {} quota lines, {} skipped sheets",
        records.len(),
        allocations.len(),
        parsed.quotas.len(),
        parsed.skipped_sheets.len()
    );
    Ok(Session {
        records,
        quotas: parsed.quotas,
        skipped_sheets: parsed.skipped_sheets,
        allocations,
        quota_book,
        teams,
    })
}

impl Session {
    pub fn records(&self) -> &[DeploymentRecord] {
        &self.records
    }

    pub fn quotas(&self) -> &[QuotaRecord] {
        &self.quotas
    }

    pub fn skipped_sheets(&self) -> &[(String, SkipReason)] {
        &self.skipped_sheets
    }

    pub fn has_quota_data(&self) -> bool {
        self.quota_book.has_data()
    }

    /// 1 / number of distinct accounts of the person; 1.0 for unknown people.
    pub fn allocation_for_person(&self, person: &str) -> f64 {
        self.allocations.for_person(person)
    }

    /// The official target of the account; 0 when unknown.
    pub fn quota_for_account(&self, account: &str) -> f64 {
        self.quota_book.account_target(account)
    }

    pub fn quota_for_person(&self, person: &str) -> f64 {
        self.quota_book.person_total(person)
    }

    pub fn team_of(&self, record: &DeploymentRecord) -> Option<String> {
        self.teams.team(record, &self.quota_book)
    }

    pub fn filter_data(&self, criteria: &FilterCriteria) -> Vec<&DeploymentRecord> {
        let res = query::filter_records(&self.records, criteria);
        debug!("filter_data: {:?} -> {} records", criteria, res.len());
        res
    }

    pub fn aggregate(&self, records: &[&DeploymentRecord], mode: AggregationMode) -> AccountAggregate {
        query::aggregate(records, mode, &self.allocations)
    }

    /// Grouped sums. Records without a team are left out of the team groups,
    /// and the N/A manager placeholder does not form a group.
    pub fn group_by(
        &self,
        records: &[&DeploymentRecord],
        mode: AggregationMode,
        key: GroupKey,
    ) -> BTreeMap<String, f64> {
        let manager = |s: &String| Some(s.clone()).filter(|s| s != NOT_AVAILABLE);
        query::group_sum(records, mode, &self.allocations, |r| match key {
            GroupKey::Account => Some(r.account.clone()),
            GroupKey::Brand => Some(r.brand.clone()),
            GroupKey::Slm => manager(&r.slm),
            GroupKey::Flm => manager(&r.flm),
            GroupKey::Role => Some(r.role.clone()),
            GroupKey::Team => self.team_of(r),
        })
    }

    /// account -> brand -> value, restricted to the given accounts.
    pub fn compare_accounts(
        &self,
        accounts: &[String],
        mode: AggregationMode,
    ) -> BTreeMap<String, BTreeMap<String, f64>> {
        let wanted: HashSet<&str> = accounts.iter().map(|s| s.trim()).collect();
        let records: Vec<&DeploymentRecord> = self
            .records
            .iter()
            .filter(|r| wanted.contains(r.account.as_str()))
            .collect();
        self.aggregate(&records, mode).by_account_brand
    }

    pub fn account_details(&self, account: &str, mode: AggregationMode) -> AccountDetails {
        let records: Vec<&DeploymentRecord> = self
            .records
            .iter()
            .filter(|r| r.account == account)
            .collect();
        let has_quota = self.quota_book.has_data();

        let people: Vec<PersonAllocation> = records
            .iter()
            .map(|r| {
                let allocation = self.allocations.for_person(&r.person);
                let total = self.quota_book.person_total(&r.person);
                let apportioned = if has_quota {
                    Some(total * allocation)
                } else {
                    None
                };
                let quota_percentage = match apportioned {
                    Some(q) if total > 0.0 => Some(q / total * 100.0),
                    _ => None,
                };
                PersonAllocation {
                    person: r.person.clone(),
                    role: r.role.clone(),
                    brand: r.brand.clone(),
                    allocation,
                    account_count: self.allocations.account_count(&r.person),
                    apportioned_quota: apportioned,
                    quota_percentage,
                }
            })
            .collect();

        let quota = if has_quota {
            Some(AccountQuota {
                account_target: self.quota_book.account_target(account),
                breakdown: allocation::quota_breakdown(
                    &records,
                    &self.allocations,
                    &self.quota_book,
                    &self.teams,
                ),
            })
        } else {
            None
        };

        AccountDetails {
            account: account.to_string(),
            mode,
            total_headcount: records.len(),
            total_fte: people.iter().map(|p| p.allocation).sum(),
            brand_breakdown: self.group_by(&records, mode, GroupKey::Brand),
            role_breakdown: self.group_by(&records, mode, GroupKey::Role),
            people,
            quota,
        }
    }

    pub fn quota_aggregates(&self) -> QuotaAggregates {
        let all: Vec<&DeploymentRecord> = self.records.iter().collect();
        QuotaAggregates {
            by_person: self.quota_book.person_totals(),
            by_account: self.quota_book.account_targets(),
            breakdown: allocation::quota_breakdown(
                &all,
                &self.allocations,
                &self.quota_book,
                &self.teams,
            ),
        }
    }

    pub fn filter_options(&self) -> FilterOptions {
        let mut res = FilterOptions::default();
        let add = |set: &mut BTreeSet<String>, v: &str| {
            let v = v.trim();
            if !v.is_empty() && v != NOT_AVAILABLE {
                set.insert(v.to_string());
            }
        };
        for r in self.records.iter() {
            add(&mut res.brands, &r.brand);
            add(&mut res.accounts, &r.account);
            add(&mut res.slms, &r.slm);
            add(&mut res.flms, &r.flm);
            add(&mut res.roles, &r.role);
            if let Some(pt) = r.person_type.as_ref() {
                add(&mut res.person_types, pt);
            }
        }
        res
    }

    pub fn summary(&self) -> Summary {
        let mut account_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut brand_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut role_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in self.records.iter() {
            *account_counts.entry(r.account.as_str()).or_insert(0) += 1;
            *brand_counts.entry(r.brand.clone()).or_insert(0) += 1;
            *role_counts.entry(r.role.as_str()).or_insert(0) += 1;
        }

        // Ties go to the first account in alphabetical order.
        let top_account = account_counts
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (a, c)| match best {
                Some((_, bc)) if bc >= *c => best,
                _ => Some((*a, *c)),
            })
            .map(|(a, c)| (a.to_string(), c));

        let mut top_roles: Vec<(String, usize)> = role_counts
            .iter()
            .map(|(r, c)| (r.to_string(), *c))
            .collect();
        top_roles.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_roles.truncate(TOP_ROLES);

        let total_accounts = account_counts.len();
        let total_records = self.records.len();
        let avg_per_account = if total_accounts > 0 {
            (total_records as f64 / total_accounts as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };
        let total_fte: f64 = self
            .records
            .iter()
            .map(|r| self.allocations.for_person(&r.person))
            .sum();

        Summary {
            total_accounts,
            total_records,
            distinct_people: self.allocations.len(),
            total_fte,
            avg_per_account,
            top_account,
            brand_counts,
            top_roles,
        }
    }
}

/// Holds the session currently shown to the user, for long-lived callers that
/// reload workbooks. A one-shot caller can use [`build_session`] directly.
///
/// A load either fully replaces the current session or leaves it untouched.
#[derive(Debug, Default)]
pub struct Dashboard {
    current: Option<Session>,
}

impl Dashboard {
    pub fn new() -> Dashboard {
        Dashboard::default()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Runs a load and swaps the result in on success. On failure, the
    /// previous session (if any) is kept and the error is returned.
    pub fn load<E, F>(&mut self, loader: F) -> Result<&Session, E>
    where
        F: FnOnce() -> Result<Session, E>,
    {
        let session = loader()?;
        Ok(self.current.insert(session))
    }
}
