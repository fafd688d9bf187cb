use log::{debug, info, warn};

use crate::classifier::classify_columns;
use crate::config::*;
use crate::extract::{extract_row, is_placeholder, RowContext};

/// The kind of handler a sheet is routed to.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SheetKind {
    Brand,
    Roster { person_type: String },
    Quota,
}

/// Why a sheet did not contribute anything.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SkipReason {
    EmptySheet,
    NoManagerColumns,
    MissingColumns(Vec<String>),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptySheet => write!(f, "empty sheet"),
            SkipReason::NoManagerColumns => write!(f, "no manager column in the header"),
            SkipReason::MissingColumns(cols) => {
                write!(f, "missing columns: {}", cols.join(", "))
            }
        }
    }
}

/// Everything read from a workbook, before linking.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ParsedWorkbook {
    pub brand_records: Vec<DeploymentRecord>,
    pub roster: Vec<RosterEntry>,
    pub quotas: Vec<QuotaRecord>,
    pub skipped_sheets: Vec<(String, SkipReason)>,
}

const ROSTER_NAME: &[&str] = &["Employee Name"];
const ROSTER_TIER: &[&str] = &["Manager Tier", "Tier", "SLM/FLM"];
const ROSTER_TITLE: &[&str] = &["Title/Specialty", "Title", "Specialty"];
const ROSTER_COVERAGE: &[&str] = &["Coverage", "Department"];
const ROSTER_MANAGER: &[&str] = &["Manager"];
const ROSTER_LEVEL: &[&str] = &["Level"];

const QUOTA_SELLER: &[&str] = &["Seller Name"];
const QUOTA_MANAGER: &[&str] = &["Manager Name"];
const QUOTA_MANAGER_ID: &[&str] = &["Manager Talent ID"];
const QUOTA_AMOUNT: &[&str] = &["Target Quota Amt"];
const QUOTA_TERRITORY: &[&str] = &["Territory Type Name"];
const QUOTA_ORG_CODE: &[&str] = &["Org Code"];

/// Picks the handler of a sheet by exact name. Unknown names are brand sheets.
pub fn route_sheet(name: &str, rules: &ParseRules) -> SheetKind {
    if let Some(rs) = rules.roster_sheets.iter().find(|rs| rs.sheet_name == name) {
        return SheetKind::Roster {
            person_type: rs.person_type.clone(),
        };
    }
    if rules.quota_sheets.iter().any(|q| q == name) {
        return SheetKind::Quota;
    }
    SheetKind::Brand
}

/// Reads all the sheets of a workbook. Sheets that do not have the expected
/// structure are logged and skipped.
pub fn read_workbook(sheets: &[Sheet], rules: &ParseRules) -> ParsedWorkbook {
    let mut res = ParsedWorkbook::default();
    for sheet in sheets.iter() {
        let kind = route_sheet(&sheet.name, rules);
        info!(
            "read_workbook: sheet {:?} ({} rows) routed as {:?}",
            sheet.name,
            sheet.rows.len(),
            kind
        );
        let outcome = match &kind {
            SheetKind::Brand => read_brand_sheet(sheet, rules, &mut res.brand_records),
            SheetKind::Roster { person_type } => {
                read_roster_sheet(sheet, person_type, rules, &mut res.roster)
            }
            SheetKind::Quota => read_quota_sheet(sheet, rules, &mut res.quotas),
        };
        match outcome {
            Ok(count) => {
                info!("read_workbook: sheet {:?}: {} entries", sheet.name, count);
            }
            Err(reason) => {
                warn!("read_workbook: skipping sheet {:?}: {:?}", sheet.name, reason);
                res.skipped_sheets.push((sheet.name.clone(), reason));
            }
        }
    }
    res
}

fn checkpoint(sheet: &Sheet, idx: usize, rules: &ParseRules) {
    if idx > 0 && idx % rules.progress_interval == 0 {
        debug!("sheet {:?}: processed {} rows", sheet.name, idx);
    }
}

/// Generic brand sheet: header on the first row, one account per data row.
pub fn read_brand_sheet(
    sheet: &Sheet,
    rules: &ParseRules,
    out: &mut Vec<DeploymentRecord>,
) -> Result<usize, SkipReason> {
    let header = sheet.rows.first().ok_or(SkipReason::EmptySheet)?;
    let groups = classify_columns(header, sheet.width(), &rules.markers);
    if groups.is_empty() {
        return Err(SkipReason::NoManagerColumns);
    }
    debug!(
        "read_brand_sheet: {:?}: {} hierarchy groups",
        sheet.name,
        groups.len()
    );

    let brand = sheet.name.trim().to_string();
    let mut count = 0;
    for (idx, row) in sheet.rows.iter().enumerate().skip(1) {
        checkpoint(sheet, idx, rules);
        let account = match row.get(rules.account_column_index).and_then(|c| c.text()) {
            Some(a) if !is_placeholder(&a) => a,
            Some(a) => {
                debug!("read_brand_sheet: row {}: placeholder account {:?}", idx, a);
                continue;
            }
            None => continue,
        };
        let ctx = RowContext {
            account,
            client_type: row
                .get(rules.client_type_column_index)
                .and_then(|c| c.text()),
            brand: brand.clone(),
        };
        count += extract_row(row, &groups, header, &ctx, out);
    }
    Ok(count)
}

/// Personnel roster: one person per row, no account column.
pub fn read_roster_sheet(
    sheet: &Sheet,
    person_type: &str,
    rules: &ParseRules,
    out: &mut Vec<RosterEntry>,
) -> Result<usize, SkipReason> {
    let header = sheet.rows.first().ok_or(SkipReason::EmptySheet)?;
    let name_idx = find_column(header, ROSTER_NAME);
    let tier_idx = find_column(header, ROSTER_TIER);
    let (name_idx, tier_idx) = match (name_idx, tier_idx) {
        (Some(n), Some(t)) => (n, t),
        _ => {
            return Err(missing(&[
                (ROSTER_NAME, name_idx),
                (ROSTER_TIER, tier_idx),
            ]))
        }
    };
    let title_idx = find_column(header, ROSTER_TITLE);
    let coverage_idx = find_column(header, ROSTER_COVERAGE);
    let manager_idx = find_column(header, ROSTER_MANAGER);
    let level_idx = find_column(header, ROSTER_LEVEL);

    let mut count = 0;
    for (idx, row) in sheet.rows.iter().enumerate().skip(1) {
        checkpoint(sheet, idx, rules);
        let person = match cell_text(row, Some(name_idx)) {
            Some(p) => p,
            None => continue,
        };
        let tier = cell_text(row, Some(tier_idx)).and_then(|s| rules.markers.manager_tier(&s));
        out.push(RosterEntry {
            person,
            tier,
            title: cell_text(row, title_idx),
            coverage: cell_text(row, coverage_idx),
            manager: cell_text(row, manager_idx),
            level: cell_text(row, level_idx),
            person_type: person_type.to_string(),
        });
        count += 1;
    }
    Ok(count)
}

/// Quota roster: one quota line per row.
pub fn read_quota_sheet(
    sheet: &Sheet,
    rules: &ParseRules,
    out: &mut Vec<QuotaRecord>,
) -> Result<usize, SkipReason> {
    let header = sheet.rows.first().ok_or(SkipReason::EmptySheet)?;
    let seller_idx = find_column(header, QUOTA_SELLER);
    let amount_idx = find_column(header, QUOTA_AMOUNT);
    let territory_idx = find_column(header, QUOTA_TERRITORY);
    let (seller_idx, amount_idx, territory_idx) = match (seller_idx, amount_idx, territory_idx) {
        (Some(s), Some(a), Some(t)) => (s, a, t),
        _ => {
            return Err(missing(&[
                (QUOTA_SELLER, seller_idx),
                (QUOTA_AMOUNT, amount_idx),
                (QUOTA_TERRITORY, territory_idx),
            ]))
        }
    };
    let manager_idx = find_column(header, QUOTA_MANAGER);
    let manager_id_idx = find_column(header, QUOTA_MANAGER_ID);
    let org_idx = find_column(header, QUOTA_ORG_CODE);

    let mut count = 0;
    for (idx, row) in sheet.rows.iter().enumerate().skip(1) {
        checkpoint(sheet, idx, rules);
        let seller_name = match cell_text(row, Some(seller_idx)) {
            Some(s) => s,
            None => continue,
        };
        out.push(QuotaRecord {
            seller_name,
            manager_name: cell_text(row, manager_idx),
            manager_talent_id: cell_text(row, manager_id_idx),
            target_quota_amt: row.get(amount_idx).map(parse_amount).unwrap_or(0.0),
            territory_type_name: cell_text(row, Some(territory_idx)).unwrap_or_default(),
            org_code: cell_text(row, org_idx).unwrap_or_default(),
        });
        count += 1;
    }
    Ok(count)
}

/// Finds the first column whose header equals one of the labels (ignoring case
/// and surrounding whitespace). Labels are tried in order.
pub fn find_column(header: &[Cell], labels: &[&str]) -> Option<usize> {
    labels.iter().find_map(|label| {
        header.iter().position(|c| match c.text() {
            Some(s) => s.eq_ignore_ascii_case(label),
            None => false,
        })
    })
}

/// Reads a quota amount. Text amounts may carry currency symbols and
/// thousands separators. Anything unreadable is 0.
pub fn parse_amount(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(f) if f.is_finite() => *f,
        Cell::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' '))
                .collect();
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

fn cell_text(row: &[Cell], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i)).and_then(|c| c.text())
}

fn missing(cols: &[(&[&str], Option<usize>)]) -> SkipReason {
    SkipReason::MissingColumns(
        cols.iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(labels, _)| labels[0].to_string())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, rows: &[&[&str]]) -> Sheet {
        Sheet {
            name: name.to_string(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| Cell::from(*s)).collect())
                .collect(),
        }
    }

    #[test]
    fn routing_is_exact() {
        let rules = ParseRules::default();
        assert_eq!(route_sheet("Quota", &rules), SheetKind::Quota);
        assert_eq!(
            route_sheet("CSM", &rules),
            SheetKind::Roster {
                person_type: "CSM".to_string()
            }
        );
        assert_eq!(route_sheet("quota", &rules), SheetKind::Brand);
        assert_eq!(route_sheet("CE Team", &rules), SheetKind::Brand);
    }

    #[test]
    fn header_only_sheet() {
        let s = sheet("Data", &[&["", "Account", "Type", "SLM", "FLM", "Engineer"]]);
        let mut out = vec![];
        assert_eq!(read_brand_sheet(&s, &ParseRules::default(), &mut out), Ok(0));
        assert!(out.is_empty());
    }

    #[test]
    fn rows_without_account_are_skipped() {
        let s = sheet(
            "Data ",
            &[
                &["", "Account", "Type", "SLM", "FLM", "Engineer"],
                &["", " ", "Ent", "Jane", "Bob", "Carol"],
                &["", "Acme", "Ent", "Jane", "Bob", "Carol"],
            ],
        );
        let mut out = vec![];
        assert_eq!(read_brand_sheet(&s, &ParseRules::default(), &mut out), Ok(1));
        assert_eq!(out[0].brand, "Data");
    }

    #[test]
    fn placeholder_accounts_are_skipped() {
        let s = sheet(
            "Data",
            &[
                &["", "Account", "Type", "SLM", "FLM", "Engineer"],
                &["", "TBD", "Ent", "Jane", "Bob", "Carol"],
                &["", "N/A", "Ent", "Jane", "Bob", "Carol"],
                &["", "--", "Ent", "Jane", "Bob", "Carol"],
                &["", "Acme", "Ent", "Jane", "Bob", "Carol"],
            ],
        );
        let mut out = vec![];
        assert_eq!(read_brand_sheet(&s, &ParseRules::default(), &mut out), Ok(1));
        let accounts: Vec<&str> = out.iter().map(|r| r.account.as_str()).collect();
        assert_eq!(accounts, vec!["Acme"]);
    }

    #[test]
    fn skipped_sheets_are_reported() {
        let sheets = vec![
            sheet("Notes", &[&["Just", "some", "text"]]),
            sheet("Empty", &[]),
            sheet("CE", &[&["Name", "Title"]]),
        ];
        let parsed = read_workbook(&sheets, &ParseRules::default());
        assert_eq!(
            parsed.skipped_sheets,
            vec![
                ("Notes".to_string(), SkipReason::NoManagerColumns),
                ("Empty".to_string(), SkipReason::EmptySheet),
                (
                    "CE".to_string(),
                    SkipReason::MissingColumns(vec![
                        "Employee Name".to_string(),
                        "Manager Tier".to_string()
                    ])
                ),
            ]
        );
    }

    #[test]
    fn roster_rows() {
        let s = sheet(
            "CE",
            &[
                &["Employee Name", "SLM/FLM", "Title/Specialty", "Coverage", "Manager", "Level"],
                &["Jane", "SLM", "Director", "", "", "9"],
                &["Bob", "FLM", "Manager", "", "Jane", "8"],
                &["Carol", "", "Client Engineer", "Acme, Beta", "Bob", "7"],
                &["", "FLM", "", "", "", ""],
            ],
        );
        let mut out = vec![];
        assert_eq!(
            read_roster_sheet(&s, "CE", &ParseRules::default(), &mut out),
            Ok(3)
        );
        assert_eq!(out[0].tier, Some(ManagerTier::Tier1));
        assert_eq!(out[1].tier, Some(ManagerTier::Tier2));
        assert_eq!(out[1].manager, Some("Jane".to_string()));
        assert_eq!(out[2].tier, None);
        assert_eq!(out[2].coverage, Some("Acme, Beta".to_string()));
        assert_eq!(out[2].person_type, "CE");
    }

    #[test]
    fn quota_rows() {
        let s = Sheet {
            name: "Quota".to_string(),
            rows: vec![
                vec![
                    Cell::from("seller name"),
                    Cell::from("Manager Name"),
                    Cell::from("Target Quota Amt"),
                    Cell::from("Territory Type Name"),
                    Cell::from("Org Code"),
                ],
                vec![
                    Cell::from("Eve"),
                    Cell::from("Jane"),
                    Cell::Number(1000.0),
                    Cell::from("Acme"),
                    Cell::from("PRIMARY"),
                ],
                vec![
                    Cell::from("Eve"),
                    Cell::Empty,
                    Cell::from("$1,250.50"),
                    Cell::from("Beta"),
                    Cell::Empty,
                ],
                vec![
                    Cell::from("Mallory"),
                    Cell::Empty,
                    Cell::from("lots"),
                    Cell::from("Beta"),
                    Cell::Empty,
                ],
            ],
        };
        let mut out = vec![];
        assert_eq!(read_quota_sheet(&s, &ParseRules::default(), &mut out), Ok(3));
        assert_eq!(out[0].target_quota_amt, 1000.0);
        assert_eq!(out[0].manager_name, Some("Jane".to_string()));
        assert_eq!(out[1].target_quota_amt, 1250.5);
        assert_eq!(out[1].org_code, "");
        assert_eq!(out[2].target_quota_amt, 0.0);
    }
}
