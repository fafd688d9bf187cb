// Exporting records to CSV files.

use std::fs::File;
use std::io::Write;

use crate::covmap::*;

/// Writes one line per record, with a header line.
pub fn write_records<W: Write>(records: &[&DeploymentRecord], w: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(w);
    for r in records.iter() {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(path: &str, records: &[&DeploymentRecord]) -> CovResult<()> {
    let f = File::create(path).context(WritingFileSnafu { path })?;
    write_records(records, f).context(WritingCsvSnafu { path })?;
    info!("export_csv: wrote {} records to {:?}", records.len(), path);
    Ok(())
}
