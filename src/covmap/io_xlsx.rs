// Reading xlsx workbooks.

use std::io::Cursor;

use calamine::{DataType, Range, Reader, Xlsx};

use crate::covmap::{io_common::convert_cell, *};

pub fn read_workbook_file(path: &str) -> CovResult<Vec<Sheet>> {
    info!("read_workbook_file: reading {:?}", path);
    let bytes = fs::read(path).context(ReadingFileSnafu { path })?;
    read_workbook_bytes(bytes, path)
}

/// Decodes all the worksheets of a workbook, in workbook order.
pub fn read_workbook_bytes(bytes: Vec<u8>, path: &str) -> CovResult<Vec<Sheet>> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).context(OpeningExcelSnafu { path })?;
    let names: Vec<String> = workbook.sheet_names().to_owned();
    debug!("read_workbook_bytes: sheets: {:?}", names);
    let mut res: Vec<Sheet> = Vec::new();
    for name in names.iter() {
        let wrange = match workbook.worksheet_range(name) {
            Some(r) => r.context(OpeningExcelSnafu { path })?,
            None => {
                warn!("read_workbook_bytes: sheet {:?} could not be found", name);
                continue;
            }
        };
        res.push(range_to_sheet(name, &wrange));
    }
    Ok(res)
}

/// calamine ranges start at the first non-empty cell. The rows and columns
/// before it are padded back so that positions are absolute.
pub fn range_to_sheet(name: &str, wrange: &Range<DataType>) -> Sheet {
    let (row_offset, col_offset) = wrange
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in wrange.rows() {
        let mut cells: Vec<Cell> = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }
    debug!(
        "range_to_sheet: {:?}: {} rows, offset ({}, {})",
        name,
        rows.len(),
        row_offset,
        col_offset
    );
    Sheet {
        name: name.to_string(),
        rows,
    }
}
