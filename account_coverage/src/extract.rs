use log::debug;

use crate::classifier::header_text;
use crate::config::*;

/// The row-level context shared by all the records of a brand sheet row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RowContext {
    pub account: String,
    pub client_type: Option<String>,
    pub brand: String,
}

/// True for the values that stand for "nobody": TBD, N/A, None, Select, dashes
/// and blanks. Case is ignored.
pub fn is_placeholder(s: &str) -> bool {
    let t = s.trim();
    if t.is_empty() || t.chars().all(|c| c == '-') {
        return true;
    }
    ["tbd", "n/a", "none", "select"]
        .iter()
        .any(|p| t.eq_ignore_ascii_case(p))
}

/// Splits a cell holding one or several names.
///
/// The comma takes precedence: a slash is only used as a delimiter when the
/// cell has no comma. Placeholders and blanks are dropped.
pub fn split_names(cell: &str) -> Vec<String> {
    if is_placeholder(cell) {
        return vec![];
    }
    let delim = if cell.contains(',') {
        Some(',')
    } else if cell.contains('/') {
        Some('/')
    } else {
        None
    };
    let tokens: Vec<&str> = match delim {
        Some(d) => cell.split(d).collect(),
        None => vec![cell],
    };
    tokens
        .iter()
        .map(|s| s.trim())
        .filter(|s| !is_placeholder(s))
        .map(|s| s.to_string())
        .collect()
}

/// Parses a free text, comma-separated list (for example a coverage list).
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|t| t.trim())
        .filter(|t| !is_placeholder(t))
        .map(|t| t.to_string())
        .collect()
}

fn manager_value(row: &[Cell], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i)).and_then(|c| c.text())
}

/// Emits the deployment records of one data row of a brand sheet.
///
/// Returns the number of records added to `out`.
pub fn extract_row(
    row: &[Cell],
    groups: &[HierarchyGroup],
    header: &[Cell],
    ctx: &RowContext,
    out: &mut Vec<DeploymentRecord>,
) -> usize {
    let start = out.len();
    for group in groups.iter() {
        let slm = manager_value(row, Some(group.manager_column_index));
        let flm = manager_value(row, group.sub_manager_column_index);
        if slm.is_none() && flm.is_none() {
            // No management context, nothing to attach the people to.
            continue;
        }
        let slm = slm.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let flm = flm.unwrap_or_else(|| NOT_AVAILABLE.to_string());

        for col_idx in group.employee_column_indices.iter() {
            let cell = match row.get(*col_idx).and_then(|c| c.text()) {
                Some(s) => s,
                None => continue,
            };
            let role = header_text(header, *col_idx).unwrap_or_else(|| DEFAULT_ROLE.to_string());
            for person in split_names(&cell) {
                out.push(DeploymentRecord {
                    account: ctx.account.clone(),
                    brand: ctx.brand.clone(),
                    slm: slm.clone(),
                    flm: flm.clone(),
                    person,
                    role: role.clone(),
                    hierarchy_name: group.name.clone(),
                    client_type: ctx.client_type.clone(),
                    person_type: None,
                });
            }
        }
    }
    let added = out.len() - start;
    if added > 0 {
        debug!(
            "extract_row: account {:?}: {} records in brand {:?}",
            ctx.account, added, ctx.brand
        );
    }
    added
}
