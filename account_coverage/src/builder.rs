pub use crate::config::*;
use crate::{build_session, Session};

/// A builder for assembling a workbook sheet by sheet.
///
/// This is the simplest way to feed data that does not come from a file.
///
/// ```
/// pub use account_coverage::builder::Builder;
/// pub use account_coverage::ParseRules;
/// # use account_coverage::CoverageErrors;
///
/// let mut builder = Builder::new(&ParseRules::default())?;
///
/// builder.add_sheet_simple(
///     "Data",
///     &[
///         &["", "Account", "ClientType", "Group1 SLM", "Group1 FLM", "Engineer"],
///         &["", "Acme Corp", "Enterprise", "Jane", "Bob", "Carol, Dave"],
///     ],
/// )?;
///
/// let session = builder.build()?;
/// assert_eq!(session.records().len(), 2);
///
/// # Ok::<(), CoverageErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ParseRules,
    pub(crate) _query_rules: QueryRules,
    pub(crate) _sheets: Vec<Sheet>,
}

impl Builder {
    pub fn new(rules: &ParseRules) -> Result<Builder, CoverageErrors> {
        rules.validate()?;
        Ok(Builder {
            _rules: rules.clone(),
            _query_rules: QueryRules::default(),
            _sheets: Vec::new(),
        })
    }

    pub fn query_rules(self, query_rules: &QueryRules) -> Result<Builder, CoverageErrors> {
        Ok(Builder {
            _rules: self._rules,
            _query_rules: query_rules.clone(),
            _sheets: self._sheets,
        })
    }

    /// Adds a sheet made only of text cells. Empty strings are empty cells.
    pub fn add_sheet_simple(&mut self, name: &str, rows: &[&[&str]]) -> Result<(), CoverageErrors> {
        let rows: Vec<Vec<Cell>> = rows
            .iter()
            .map(|r| r.iter().map(|s| Cell::from(*s)).collect())
            .collect();
        self.add_sheet(&Sheet {
            name: name.to_string(),
            rows,
        })
    }

    /// Adds a sheet. Sheet names must be unique within a workbook.
    pub fn add_sheet(&mut self, sheet: &Sheet) -> Result<(), CoverageErrors> {
        if self._sheets.iter().any(|s| s.name == sheet.name) {
            return Err(CoverageErrors::DuplicateSheet(sheet.name.clone()));
        }
        self._sheets.push(sheet.clone());
        Ok(())
    }

    pub fn build(&self) -> Result<Session, CoverageErrors> {
        build_session(&self._sheets, &self._rules, &self._query_rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_sheet() {
        let mut b = Builder::new(&ParseRules::default()).unwrap();
        b.add_sheet_simple("Data", &[&["SLM"]]).unwrap();
        assert_eq!(
            b.add_sheet_simple("Data", &[&["SLM"]]),
            Err(CoverageErrors::DuplicateSheet("Data".to_string()))
        );
    }

    #[test]
    fn invalid_rules() {
        let rules = ParseRules {
            markers: MarkerMatcher {
                tier1_marker: "X".to_string(),
                tier2_marker: "X".to_string(),
            },
            ..ParseRules::default()
        };
        assert!(Builder::new(&rules).is_err());
    }

    #[test]
    fn custom_query_rules() {
        let qr = QueryRules {
            primary_org_code: "MAIN".to_string(),
            ..QueryRules::default()
        };
        let mut b = Builder::new(&ParseRules::default())
            .unwrap()
            .query_rules(&qr)
            .unwrap();
        b.add_sheet(&Sheet {
            name: "Quota".to_string(),
            rows: vec![
                vec![
                    Cell::from("Seller Name"),
                    Cell::from("Target Quota Amt"),
                    Cell::from("Territory Type Name"),
                    Cell::from("Org Code"),
                ],
                vec![
                    Cell::from("Eve"),
                    Cell::Number(10.0),
                    Cell::from("Acme"),
                    Cell::from("MAIN"),
                ],
            ],
        })
        .unwrap();
        let s = b.build().unwrap();
        assert_eq!(s.quota_for_account("Acme"), 10.0);
        assert!(s.records().is_empty());
    }
}
