use log::debug;

use crate::config::*;

/// Finds the hierarchy groups of a brand sheet from its header row.
///
/// Every tier-1 manager column opens a group that extends up to the next
/// tier-1 column (or the end of the sheet). Inside that span, the first tier-2
/// column is the sub-manager column and the employee columns follow it.
///
/// A header without any tier-1 column returns no group.
pub fn classify_columns(
    header: &[Cell],
    num_columns: usize,
    matcher: &dyn ColumnMatcher,
) -> Vec<HierarchyGroup> {
    let num_columns = num_columns.max(header.len());
    let tiers: Vec<Option<ManagerTier>> = (0..num_columns)
        .map(|idx| header_text(header, idx).and_then(|s| matcher.manager_tier(&s)))
        .collect();

    let tier1_columns: Vec<usize> = tiers
        .iter()
        .enumerate()
        .filter_map(|(idx, t)| match t {
            Some(ManagerTier::Tier1) => Some(idx),
            _ => None,
        })
        .collect();
    debug!("classify_columns: tier-1 columns: {:?}", tier1_columns);

    let mut groups: Vec<HierarchyGroup> = Vec::new();
    for (ordinal, manager_idx) in tier1_columns.iter().enumerate() {
        let boundary = tier1_columns
            .get(ordinal + 1)
            .cloned()
            .unwrap_or(num_columns);

        let sub_manager_idx =
            (manager_idx + 1..boundary).find(|idx| tiers[*idx] == Some(ManagerTier::Tier2));
        let first_employee = sub_manager_idx.unwrap_or(*manager_idx) + 1;

        let employee_column_indices: Vec<usize> = (first_employee..boundary)
            .filter(|idx| tiers[*idx].is_none() && header_text(header, *idx).is_some())
            .collect();

        let name = match manager_idx.checked_sub(1) {
            Some(prev) if tiers[prev].is_none() => header_text(header, prev),
            _ => None,
        }
        .unwrap_or_else(|| format!("Group {}", ordinal + 1));

        let group = HierarchyGroup {
            name,
            manager_column_index: *manager_idx,
            sub_manager_column_index: sub_manager_idx,
            employee_column_indices,
        };
        debug!("classify_columns: group: {:?}", group);
        groups.push(group);
    }
    groups
}

pub(crate) fn header_text(header: &[Cell], idx: usize) -> Option<String> {
    header.get(idx).and_then(|c| c.text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    #[test]
    fn single_group_with_both_tiers() {
        let h = header(&["", "Account", "ClientType", "Group1 SLM", "Group1 FLM", "Engineer"]);
        let groups = classify_columns(&h, h.len(), &MarkerMatcher::default());
        assert_eq!(
            groups,
            vec![HierarchyGroup {
                name: "ClientType".to_string(),
                manager_column_index: 3,
                sub_manager_column_index: Some(4),
                employee_column_indices: vec![5],
            }]
        );
    }

    #[test]
    fn groups_end_at_next_tier1_column() {
        let h = header(&[
            "", "Account", "", "Data SLM", "Data FLM", "Engineer", "Architect", "Apps SLM",
            "Seller", "", "Specialist",
        ]);
        let groups = classify_columns(&h, 12, &MarkerMatcher::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Group 1");
        assert_eq!(groups[0].employee_column_indices, vec![5, 6]);
        assert_eq!(groups[1].name, "Architect");
        assert_eq!(groups[1].manager_column_index, 7);
        assert_eq!(groups[1].sub_manager_column_index, None);
        // Blank headers are not employee columns.
        assert_eq!(groups[1].employee_column_indices, vec![8, 10]);
    }

    #[test]
    fn no_manager_column_no_group() {
        let h = header(&["", "Account", "Type", "Engineer"]);
        assert!(classify_columns(&h, 4, &MarkerMatcher::default()).is_empty());
    }

    #[test]
    fn custom_markers() {
        let m = MarkerMatcher {
            tier1_marker: "Director".to_string(),
            tier2_marker: "Lead".to_string(),
        };
        let h = header(&["", "Account", "Type", "Director", "Team Lead", "Dev"]);
        let groups = classify_columns(&h, h.len(), &m);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].sub_manager_column_index, Some(4));
        assert_eq!(groups[0].employee_column_indices, vec![5]);
    }
}
