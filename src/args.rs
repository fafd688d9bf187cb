use clap::Parser;

/// Reads an account coverage workbook and reports headcount, FTE and quota metrics.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The workbook to read (xlsx). Setting this option overrides the input
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, optional) A JSON file describing how the workbook is laid out.
    /// All the settings have defaults. See the manual of the account_coverage crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, 'stdout' or empty) Where the JSON summary is written. Defaults to the
    /// standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing an expected summary in JSON format. If
    /// provided, covmap will check that its output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (account name) If specified, the details of this account are reported instead of
    /// the summary of the whole workbook.
    #[clap(short, long, value_parser)]
    pub account: Option<String>,

    /// (list of comma-separated account names) If specified, the brand breakdown of
    /// these accounts is reported side by side.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub compare: Option<Vec<String>>,

    /// (raw or fte, default raw) How records are counted: one per record, or the
    /// share of each person on the account.
    #[clap(short, long, value_parser)]
    pub mode: Option<String>,

    /// (file path) If specified, the filtered records are written to this file in CSV format.
    #[clap(long, value_parser)]
    pub export_csv: Option<String>,

    // Filters
    /// Only keep the records of this brand (exact match).
    #[clap(long, value_parser)]
    pub brand: Option<String>,

    /// Only keep the records under this second-line manager.
    #[clap(long, value_parser)]
    pub slm: Option<String>,

    /// Only keep the records under this first-line manager.
    #[clap(long, value_parser)]
    pub flm: Option<String>,

    /// Only keep the people whose name contains this text (case insensitive).
    #[clap(long, value_parser)]
    pub person: Option<String>,

    /// Only keep the roles containing this text (case insensitive).
    #[clap(long, value_parser)]
    pub role: Option<String>,

    /// Only keep the roster people of this type (CE, CSM, ...).
    #[clap(long, value_parser)]
    pub person_type: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
