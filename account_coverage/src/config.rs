// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use serde::Serialize;

/// The content of one spreadsheet cell, as handed over by the workbook reader.
///
/// The library does not read files itself: the caller decodes the workbook and
/// converts every cell into this representation.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// The trimmed text form of the cell, or None if the cell is blank.
    ///
    /// Integral numbers are rendered without a fractional part so that an
    /// employee id typed as a number reads the same as when typed as text.
    /// Booleans (checkbox columns) never name a person or an account and read
    /// as blank.
    pub fn text(&self) -> Option<String> {
        let s = match self {
            Cell::Empty | Cell::Bool(_) => return None,
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Cell::Number(f) => f.to_string(),
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_none()
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Number(f)
    }
}

/// One worksheet: its name and its cells, row-major, with absolute coordinates
/// (row 0 is the first row of the sheet, column 0 the first column).
#[derive(PartialEq, Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

// ******** Normalized records *********

/// One person's assignment to one account under one brand / hierarchy group.
#[derive(PartialEq, Eq, Debug, Clone, Hash, PartialOrd, Ord, Serialize)]
pub struct DeploymentRecord {
    pub account: String,
    pub brand: String,
    pub slm: String,
    pub flm: String,
    pub person: String,
    pub role: String,
    pub hierarchy_name: String,
    pub client_type: Option<String>,
    pub person_type: Option<String>,
}

/// One seller's assigned target.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct QuotaRecord {
    pub seller_name: String,
    pub manager_name: Option<String>,
    pub manager_talent_id: Option<String>,
    pub target_quota_amt: f64,
    pub territory_type_name: String,
    pub org_code: String,
}

/// The two manager tiers found in brand sheet headers and roster sheets.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize)]
pub enum ManagerTier {
    /// Second-line manager (SLM).
    Tier1,
    /// First-line manager (FLM).
    Tier2,
}

/// A group of columns that share one management context within a brand sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HierarchyGroup {
    pub name: String,
    pub manager_column_index: usize,
    pub sub_manager_column_index: Option<usize>,
    pub employee_column_indices: Vec<usize>,
}

/// A person listed on a roster sheet. Roster sheets have no account column:
/// accounts are attached later by the linker.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterEntry {
    pub person: String,
    pub tier: Option<ManagerTier>,
    pub title: Option<String>,
    pub coverage: Option<String>,
    pub manager: Option<String>,
    pub level: Option<String>,
    pub person_type: String,
}

// ******** Query structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
pub enum AggregationMode {
    /// Every record counts for one.
    Raw,
    /// Every record counts for the allocation fraction of its person.
    Fte,
}

/// The dimension used by grouped sums.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum GroupKey {
    Account,
    Brand,
    Slm,
    Flm,
    Role,
    Team,
}

/// Filter criteria for records. Empty or missing fields match everything.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FilterCriteria {
    pub brand: Option<String>,
    pub account: Option<String>,
    pub slm: Option<String>,
    pub flm: Option<String>,
    pub person: Option<String>,
    pub role: Option<String>,
    pub person_type: Option<String>,
}

// ******** Errors *********

/// Errors that prevent a workbook from being turned into a session.
///
/// Structural problems inside a sheet are not errors: the sheet is skipped and
/// a warning is logged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CoverageErrors {
    InvalidRules(String),
    DuplicateSheet(String),
}

impl Error for CoverageErrors {}

impl Display for CoverageErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageErrors::InvalidRules(msg) => write!(f, "invalid parsing rules: {}", msg),
            CoverageErrors::DuplicateSheet(name) => {
                write!(f, "sheet {:?} appears more than once in the workbook", name)
            }
        }
    }
}

// ********* Configuration **********

/// Decides whether a header (or a roster tier cell) designates a manager tier.
///
/// The default implementation looks for substrings; other strategies can be
/// plugged in without touching the extraction algorithm.
pub trait ColumnMatcher {
    fn manager_tier(&self, text: &str) -> Option<ManagerTier>;
}

/// Substring matching on the tier markers. The tier-1 marker is tested first.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MarkerMatcher {
    pub tier1_marker: String,
    pub tier2_marker: String,
}

impl ColumnMatcher for MarkerMatcher {
    fn manager_tier(&self, text: &str) -> Option<ManagerTier> {
        if text.contains(self.tier1_marker.as_str()) {
            Some(ManagerTier::Tier1)
        } else if text.contains(self.tier2_marker.as_str()) {
            Some(ManagerTier::Tier2)
        } else {
            None
        }
    }
}

impl Default for MarkerMatcher {
    fn default() -> Self {
        MarkerMatcher {
            tier1_marker: "SLM".to_string(),
            tier2_marker: "FLM".to_string(),
        }
    }
}

/// A sheet name reserved for a personnel roster, and the person type it tags.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterSheet {
    pub sheet_name: String,
    pub person_type: String,
}

/// Rules that govern how a workbook is turned into records.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParseRules {
    pub markers: MarkerMatcher,
    pub account_column_index: usize,
    pub client_type_column_index: usize,
    // Checked in order, the first exact match wins.
    pub roster_sheets: Vec<RosterSheet>,
    pub quota_sheets: Vec<String>,
    pub unassigned_account: String,
    /// Number of rows between two progress checkpoints while reading a sheet.
    pub progress_interval: usize,
}

impl Default for ParseRules {
    fn default() -> Self {
        ParseRules {
            markers: MarkerMatcher::default(),
            account_column_index: 1,
            client_type_column_index: 2,
            roster_sheets: vec![
                RosterSheet {
                    sheet_name: "CE".to_string(),
                    person_type: "CE".to_string(),
                },
                RosterSheet {
                    sheet_name: "CSM".to_string(),
                    person_type: "CSM".to_string(),
                },
            ],
            quota_sheets: vec!["Quota".to_string()],
            unassigned_account: UNASSIGNED.to_string(),
            progress_interval: 500,
        }
    }
}

impl ParseRules {
    pub fn validate(&self) -> Result<(), CoverageErrors> {
        if self.markers.tier1_marker.trim().is_empty() || self.markers.tier2_marker.trim().is_empty()
        {
            return Err(CoverageErrors::InvalidRules(
                "manager markers may not be empty".to_string(),
            ));
        }
        if self.markers.tier1_marker == self.markers.tier2_marker {
            return Err(CoverageErrors::InvalidRules(format!(
                "tier-1 and tier-2 markers are both {:?}",
                self.markers.tier1_marker
            )));
        }
        if self.account_column_index == self.client_type_column_index {
            return Err(CoverageErrors::InvalidRules(
                "account and client type columns must differ".to_string(),
            ));
        }
        if self.unassigned_account.trim().is_empty() {
            return Err(CoverageErrors::InvalidRules(
                "the unassigned account label may not be empty".to_string(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(CoverageErrors::InvalidRules(
                "progress interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A keyword looked up (case-insensitively) in a role to assign a team.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TeamKeyword {
    pub keyword: String,
    pub team: String,
}

/// Rules for the derived quota and team metrics.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QueryRules {
    /// Quota lines with this org code define the official account target.
    pub primary_org_code: String,
    /// Quota lines with this org code put the seller in the client engineering team.
    pub client_engineering_org_code: String,
    pub client_engineering_team: String,
    /// Person type tag -> team, checked in order.
    pub person_type_teams: Vec<(String, String)>,
    /// Checked in order, the first keyword found in the role wins.
    pub team_keywords: Vec<TeamKeyword>,
}

impl Default for QueryRules {
    fn default() -> Self {
        let kw = |keyword: &str, team: &str| TeamKeyword {
            keyword: keyword.to_string(),
            team: team.to_string(),
        };
        QueryRules {
            primary_org_code: "PRIMARY".to_string(),
            client_engineering_org_code: "CE".to_string(),
            client_engineering_team: "Client Engineering".to_string(),
            person_type_teams: vec![
                ("CE".to_string(), "Client Engineering".to_string()),
                ("CSM".to_string(), "Customer Success".to_string()),
            ],
            team_keywords: vec![
                kw("client engineer", "Client Engineering"),
                kw("customer success", "Customer Success"),
                kw("csm", "Customer Success"),
                kw("technical specialist", "Technical Sales"),
                kw("architect", "Technical Sales"),
                kw("seller", "Sales"),
                kw("sales", "Sales"),
                kw("executive", "Sales"),
            ],
        }
    }
}

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNASSIGNED: &str = "Unassigned";
pub const DEFAULT_ROLE: &str = "Personnel";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text() {
        assert_eq!(Cell::from("  Carol ").text(), Some("Carol".to_string()));
        assert_eq!(Cell::Number(1234.0).text(), Some("1234".to_string()));
        assert_eq!(Cell::Number(2.5).text(), Some("2.5".to_string()));
        assert_eq!(Cell::from("   ").text(), None);
        assert_eq!(Cell::Bool(true).text(), None);
        assert!(Cell::Bool(false).is_blank());
        assert!(Cell::Empty.is_blank());
    }
}
