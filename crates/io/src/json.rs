// JSON grid files: an array of row objects, the same shape as "table-data"

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use gridlog_engine::Grid;

use crate::csv::read_file_as_utf8;
use crate::error::PersistError;

pub fn import(path: &Path) -> Result<Grid, PersistError> {
    let content = read_file_as_utf8(path)?;
    serde_json::from_str(&content).map_err(|e| PersistError::Import(format!("{}: {e}", path.display())))
}

pub fn export(grid: &Grid, path: &Path) -> Result<(), PersistError> {
    let file = File::create(path).map_err(|e| PersistError::Io(format!("{}: {e}", path.display())))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, grid).map_err(|e| PersistError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlog_engine::CellValue;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_json_export_then_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.json");

        let mut grid = Grid::new(vec!["name".into(), "score".into()]);
        grid.push_row(vec!["Alice".into(), CellValue::Number(9.5)]).unwrap();
        export(&grid, &path).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, serde_json::json!([{"name": "Alice", "score": 9.5}]));
        assert_eq!(import(&path).unwrap(), grid);
    }

    #[test]
    fn test_import_rejects_ragged_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"[{"a":"1"},{"b":"2"}]"#).unwrap();

        assert!(matches!(import(&path), Err(PersistError::Import(_))));
    }
}
