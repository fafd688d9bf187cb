use crate::covmap::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RosterSheetConfig {
    #[serde(rename = "sheetName")]
    pub sheet_name: String,
    #[serde(rename = "personType")]
    pub person_type: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PersonTypeTeamConfig {
    #[serde(rename = "personType")]
    pub person_type: String,
    pub team: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TeamKeywordConfig {
    pub keyword: String,
    pub team: String,
}

/// The JSON configuration of covmap. All the fields are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CovConfig {
    pub input: Option<String>,
    #[serde(rename = "tier1Marker")]
    pub tier1_marker: Option<String>,
    #[serde(rename = "tier2Marker")]
    pub tier2_marker: Option<String>,
    #[serde(rename = "accountColumn")]
    _account_column: Option<JSValue>,
    #[serde(rename = "clientTypeColumn")]
    _client_type_column: Option<JSValue>,
    #[serde(rename = "rosterSheets")]
    pub roster_sheets: Option<Vec<RosterSheetConfig>>,
    #[serde(rename = "quotaSheets")]
    pub quota_sheets: Option<Vec<String>>,
    #[serde(rename = "unassignedAccount")]
    pub unassigned_account: Option<String>,
    #[serde(rename = "progressInterval")]
    pub progress_interval: Option<u64>,
    #[serde(rename = "primaryOrgCode")]
    pub primary_org_code: Option<String>,
    #[serde(rename = "clientEngineeringOrgCode")]
    pub client_engineering_org_code: Option<String>,
    #[serde(rename = "clientEngineeringTeam")]
    pub client_engineering_team: Option<String>,
    #[serde(rename = "personTypeTeams")]
    pub person_type_teams: Option<Vec<PersonTypeTeamConfig>>,
    #[serde(rename = "teamKeywords")]
    pub team_keywords: Option<Vec<TeamKeywordConfig>>,
}

impl CovConfig {
    /// The 0-based index of the account column.
    pub fn account_column(&self, default: usize) -> CovResult<usize> {
        read_column(&self._account_column, default)
    }

    /// The 0-based index of the client type column.
    pub fn client_type_column(&self, default: usize) -> CovResult<usize> {
        read_column(&self._client_type_column, default)
    }
}

pub fn read_config(path: &str) -> CovResult<CovConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: CovConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> CovResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Turns the configuration into the rules used by the library, applying the
/// defaults for everything that is not specified.
pub fn validate_rules(config: &CovConfig) -> CovResult<(ParseRules, QueryRules)> {
    let defaults = ParseRules::default();
    let markers = MarkerMatcher {
        tier1_marker: config
            .tier1_marker
            .clone()
            .unwrap_or(defaults.markers.tier1_marker.clone()),
        tier2_marker: config
            .tier2_marker
            .clone()
            .unwrap_or(defaults.markers.tier2_marker.clone()),
    };
    let progress_interval = match config.progress_interval {
        Some(0) => {
            return InvalidConfigSnafu {
                message: "progressInterval must be positive",
            }
            .fail();
        }
        Some(x) => x as usize,
        None => defaults.progress_interval,
    };
    let rules = ParseRules {
        markers,
        account_column_index: config.account_column(defaults.account_column_index)?,
        client_type_column_index: config.client_type_column(defaults.client_type_column_index)?,
        roster_sheets: match config.roster_sheets.as_ref() {
            Some(l) => l
                .iter()
                .map(|rs| RosterSheet {
                    sheet_name: rs.sheet_name.clone(),
                    person_type: rs.person_type.clone(),
                })
                .collect(),
            None => defaults.roster_sheets.clone(),
        },
        quota_sheets: config
            .quota_sheets
            .clone()
            .unwrap_or(defaults.quota_sheets.clone()),
        unassigned_account: config
            .unassigned_account
            .clone()
            .unwrap_or(defaults.unassigned_account.clone()),
        progress_interval,
    };
    rules.validate().context(CoverageSnafu {})?;

    let qdefaults = QueryRules::default();
    let query_rules = QueryRules {
        primary_org_code: config
            .primary_org_code
            .clone()
            .unwrap_or(qdefaults.primary_org_code.clone()),
        client_engineering_org_code: config
            .client_engineering_org_code
            .clone()
            .unwrap_or(qdefaults.client_engineering_org_code.clone()),
        client_engineering_team: config
            .client_engineering_team
            .clone()
            .unwrap_or(qdefaults.client_engineering_team.clone()),
        person_type_teams: match config.person_type_teams.as_ref() {
            Some(l) => l
                .iter()
                .map(|p| (p.person_type.clone(), p.team.clone()))
                .collect(),
            None => qdefaults.person_type_teams.clone(),
        },
        team_keywords: match config.team_keywords.as_ref() {
            Some(l) => l
                .iter()
                .map(|k| TeamKeyword {
                    keyword: k.keyword.clone(),
                    team: k.team.clone(),
                })
                .collect(),
            None => qdefaults.team_keywords.clone(),
        },
    };
    if query_rules.team_keywords.iter().any(|k| k.keyword.trim().is_empty()) {
        return InvalidConfigSnafu {
            message: "team keywords may not be empty",
        }
        .fail();
    }
    info!("validate_rules: {:?} {:?}", rules, query_rules);
    Ok((rules, query_rules))
}

/// Reads a 1-based column position, given either as a number or as a
/// spreadsheet column name ("B", "AA").
fn read_column(x: &Option<JSValue>, default: usize) -> CovResult<usize> {
    let position: Option<u64> = match x {
        None => return Ok(default),
        Some(JSValue::Number(n)) => n.as_u64(),
        Some(JSValue::String(s))
            if (1..=3).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            Some(column_from_letters(s))
        }
        Some(JSValue::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match position {
        Some(p) if p >= 1 => Ok((p - 1) as usize),
        _ => InvalidConfigSnafu {
            message: format!("could not understand column position {:?}", x),
        }
        .fail(),
    }
}

fn column_from_letters(s: &str) -> u64 {
    s.to_ascii_uppercase()
        .bytes()
        .fold(0, |acc, b| acc * 26 + (b - b'A' + 1) as u64)
}
