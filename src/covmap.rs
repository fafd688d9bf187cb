use log::{debug, info, warn};

use account_coverage::*;
use snafu::prelude::*;

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::covmap::config_reader::*;
use crate::covmap::io_common::{resolve_path, simplify_file_name};

mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum CovError {
    #[snafu(display("Error reading file {path}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Error opening json file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing json: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Invalid configuration: {message}"))]
    InvalidConfig { message: String },
    #[snafu(display("Could not process the workbook: {source}"))]
    Coverage { source: CoverageErrors },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing csv file {path}"))]
    WritingCsv { source: csv::Error, path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type CovResult<T> = Result<T, CovError>;

fn parse_mode(mode: Option<&str>) -> CovResult<AggregationMode> {
    match mode.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("raw") => Ok(AggregationMode::Raw),
        Some("fte") => Ok(AggregationMode::Fte),
        Some(x) => InvalidConfigSnafu {
            message: format!("unknown mode {:?}: expected raw or fte", x),
        }
        .fail(),
    }
}

fn filter_criteria(args: &Args) -> FilterCriteria {
    FilterCriteria {
        brand: args.brand.clone(),
        account: args.account.clone(),
        slm: args.slm.clone(),
        flm: args.flm.clone(),
        person: args.person.clone(),
        role: args.role.clone(),
        person_type: args.person_type.clone(),
    }
}

/// Reads a workbook from disk and runs the whole pipeline on it.
pub fn load_session(
    path: &str,
    rules: &ParseRules,
    query_rules: &QueryRules,
) -> CovResult<Session> {
    let sheets = io_xlsx::read_workbook_file(path)?;
    let session = build_session(&sheets, rules, query_rules).context(CoverageSnafu {})?;
    for (name, reason) in session.skipped_sheets().iter() {
        warn!("load_session: sheet {:?} was skipped: {}", name, reason);
    }
    Ok(session)
}

fn skipped_sheets_js(session: &Session) -> Vec<JSValue> {
    session
        .skipped_sheets()
        .iter()
        .map(|(name, reason)| json!({"sheet": name, "reason": reason.to_string()}))
        .collect()
}

fn build_summary_js(
    session: &Session,
    criteria: &FilterCriteria,
    mode: AggregationMode,
    source: &str,
) -> JSValue {
    let records = session.filter_data(criteria);
    let agg = session.aggregate(&records, mode);
    let quota = if session.has_quota_data() {
        json!(session.quota_aggregates())
    } else {
        JSValue::Null
    };
    json!({
        "source": source,
        "mode": mode,
        "summary": session.summary(),
        "filterOptions": session.filter_options(),
        "filteredRecords": records.len(),
        "byAccount": agg.by_account,
        "byAccountBrand": agg.by_account_brand,
        "bySlm": session.group_by(&records, mode, GroupKey::Slm),
        "byFlm": session.group_by(&records, mode, GroupKey::Flm),
        "byRole": session.group_by(&records, mode, GroupKey::Role),
        "byTeam": session.group_by(&records, mode, GroupKey::Team),
        "quota": quota,
        "skippedSheets": skipped_sheets_js(session),
    })
}

fn build_details_js(
    session: &Session,
    account: &str,
    mode: AggregationMode,
    source: &str,
) -> JSValue {
    json!({
        "source": source,
        "details": session.account_details(account, mode),
    })
}

fn build_comparison_js(
    session: &Session,
    accounts: &[String],
    mode: AggregationMode,
    source: &str,
) -> JSValue {
    json!({
        "source": source,
        "mode": mode,
        "comparison": session.compare_accounts(accounts, mode),
    })
}

fn write_output(out: Option<&str>, contents: &str) -> CovResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", contents);
        }
        Some(path) => {
            fs::write(path, contents).context(WritingFileSnafu { path })?;
            info!("write_output: summary written to {:?}", path);
        }
    }
    Ok(())
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> CovResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_dashboard(args: &Args) -> CovResult<()> {
    let config = match args.config.as_deref() {
        Some(p) => read_config(p)?,
        None => CovConfig::default(),
    };
    let (rules, query_rules) = validate_rules(&config)?;
    let mode = parse_mode(args.mode.as_deref())?;

    let input = match (args.input.as_ref(), config.input.as_ref()) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve_path(args.config.as_deref(), p),
        (None, None) => {
            whatever!("No workbook given: use --input or set input in the configuration")
        }
    };
    let source = simplify_file_name(&input);

    let session = load_session(&input, &rules, &query_rules)?;

    let criteria = filter_criteria(args);
    debug!("run_dashboard: criteria: {:?}", criteria);
    if let Some(p) = args.export_csv.as_deref() {
        io_csv::export_csv(p, &session.filter_data(&criteria))?;
    }

    let result_js = match (args.account.as_deref(), args.compare.as_ref()) {
        (Some(account), _) => build_details_js(&session, account, mode, &source),
        (None, Some(accounts)) => build_comparison_js(&session, accounts, mode, &source),
        (None, None) => build_summary_js(&session, &criteria, mode, &source),
    };
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_output(args.out.as_deref(), &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(reference) = args.reference.as_deref() {
        check_reference(reference, &pretty_js_stats)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_coverage::builder::Builder;
    use std::path::PathBuf;

    fn session() -> Session {
        let mut b = Builder::new(&ParseRules::default()).unwrap();
        b.add_sheet_simple(
            "Data",
            &[
                &["", "Account", "ClientType", "Group1 SLM", "Group1 FLM", "Engineer"],
                &["", "Acme Corp", "Enterprise", "Jane", "Bob", "Carol, Dave"],
                &["", "Beta Inc", "Enterprise", "Jane", "Ann", "Dave"],
            ],
        )
        .unwrap();
        b.add_sheet_simple("Notes", &[&["Nothing to see"]]).unwrap();
        b.build().unwrap()
    }

    fn temp_path(name: &str) -> String {
        let p: PathBuf = std::env::temp_dir().join(format!("covmap_{}_{}", std::process::id(), name));
        p.display().to_string()
    }

    #[test]
    fn modes() {
        assert_eq!(parse_mode(None).unwrap(), AggregationMode::Raw);
        assert_eq!(parse_mode(Some("FTE")).unwrap(), AggregationMode::Fte);
        assert!(matches!(
            parse_mode(Some("weighted")),
            Err(CovError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn failed_load_keeps_previous_session() {
        let mut dashboard = Dashboard::new();
        dashboard.load(|| -> CovResult<Session> { Ok(session()) }).unwrap();
        let res = dashboard.load(|| {
            load_session(
                "/nonexistent/coverage.xlsx",
                &ParseRules::default(),
                &QueryRules::default(),
            )
        });
        assert!(matches!(res, Err(CovError::ReadingFile { .. })));
        assert_eq!(dashboard.current().map(|s| s.records().len()), Some(3));
    }

    #[test]
    fn malformed_workbook() {
        let path = temp_path("malformed.xlsx");
        fs::write(&path, b"not a zip archive").unwrap();
        let res = load_session(&path, &ParseRules::default(), &QueryRules::default());
        assert!(matches!(res, Err(CovError::OpeningExcel { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn summary_js() {
        let s = session();
        let js = build_summary_js(&s, &FilterCriteria::default(), AggregationMode::Fte, "t.xlsx");
        assert_eq!(js["source"], json!("t.xlsx"));
        assert_eq!(js["mode"], json!("Fte"));
        assert_eq!(js["summary"]["total_records"], json!(3));
        assert_eq!(js["filteredRecords"], json!(3));
        assert_eq!(js["byAccount"]["Acme Corp"], json!(1.5));
        assert_eq!(js["byFlm"]["Ann"], json!(0.5));
        assert!(js["quota"].is_null());
        assert_eq!(js["skippedSheets"][0]["sheet"], json!("Notes"));

        let filtered = FilterCriteria {
            flm: Some("Bob".to_string()),
            ..FilterCriteria::default()
        };
        let js = build_summary_js(&s, &filtered, AggregationMode::Raw, "t.xlsx");
        assert_eq!(js["filteredRecords"], json!(2));
        // The options are computed on the whole workbook.
        assert_eq!(js["filterOptions"]["flms"], json!(["Ann", "Bob"]));
    }

    #[test]
    fn details_and_comparison_js() {
        let s = session();
        let js = build_details_js(&s, "Beta Inc", AggregationMode::Raw, "t.xlsx");
        assert_eq!(js["details"]["total_headcount"], json!(1));
        assert_eq!(js["details"]["people"][0]["person"], json!("Dave"));
        let js = build_comparison_js(
            &s,
            &["Acme Corp".to_string(), "Nowhere".to_string()],
            AggregationMode::Raw,
            "t.xlsx",
        );
        assert_eq!(js["comparison"]["Acme Corp"]["Data"], json!(2.0));
        assert!(js["comparison"]["Nowhere"].is_null());
    }

    #[test]
    fn reference_check() {
        let s = session();
        let js = build_details_js(&s, "Acme Corp", AggregationMode::Raw, "t.xlsx");
        let pretty = serde_json::to_string_pretty(&js).unwrap();
        let path = temp_path("reference.json");
        write_output(Some(path.as_str()), &pretty).unwrap();
        assert!(check_reference(&path, &pretty).is_ok());
        let other = build_details_js(&s, "Beta Inc", AggregationMode::Raw, "t.xlsx");
        let other = serde_json::to_string_pretty(&other).unwrap();
        assert!(matches!(
            check_reference(&path, &other),
            Err(CovError::Whatever { .. })
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_input() {
        let args = Args::default();
        assert!(matches!(run_dashboard(&args), Err(CovError::Whatever { .. })));
    }

    #[test]
    fn csv_export_of_filtered_records() {
        let s = session();
        let criteria = FilterCriteria {
            person: Some("dave".to_string()),
            ..FilterCriteria::default()
        };
        let path = temp_path("records.csv");
        io_csv::export_csv(&path, &s.filter_data(&criteria)).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        let _ = fs::remove_file(&path);
    }
}
