use std::path::{Path, PathBuf};

use account_coverage::Cell;
use calamine::DataType;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Resolves a path found in a configuration file against the directory of that file.
pub fn resolve_path(config_path: Option<&str>, path: &str) -> String {
    let p: PathBuf = match config_path.and_then(|c| Path::new(c).parent()) {
        Some(root) => root.join(path),
        None => PathBuf::from(path),
    };
    p.display().to_string()
}

/// Dates are kept as their serial number. Error cells read as empty.
pub fn convert_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) => Cell::from(s.as_str()),
        DataType::Float(f) | DataType::DateTime(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Bool(*b),
        _ => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/data/coverage.xlsx"), "coverage.xlsx");
        assert_eq!(simplify_file_name("coverage.xlsx"), "coverage.xlsx");
        assert_eq!(simplify_file_name(""), "");
    }

    #[test]
    fn resolved_paths() {
        assert_eq!(
            resolve_path(Some("/conf/covmap.json"), "coverage.xlsx"),
            "/conf/coverage.xlsx"
        );
        assert_eq!(
            resolve_path(Some("/conf/covmap.json"), "/data/coverage.xlsx"),
            "/data/coverage.xlsx"
        );
        assert_eq!(resolve_path(None, "coverage.xlsx"), "coverage.xlsx");
    }

    #[test]
    fn cells() {
        assert_eq!(
            convert_cell(&DataType::String("Acme".to_string())),
            Cell::Text("Acme".to_string())
        );
        assert_eq!(convert_cell(&DataType::String("".to_string())), Cell::Empty);
        assert_eq!(convert_cell(&DataType::Int(12)), Cell::Number(12.0));
        assert_eq!(convert_cell(&DataType::Float(1.5)), Cell::Number(1.5));
        assert_eq!(convert_cell(&DataType::Bool(true)), Cell::Bool(true));
        assert_eq!(convert_cell(&DataType::Empty), Cell::Empty);
    }
}
