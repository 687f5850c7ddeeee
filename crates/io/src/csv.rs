// CSV/TSV import into a grid
//
// The first record is the header row and names the columns. Every cell is
// imported as text, the way the grid editor stores typed input.

use std::path::Path;

use gridlog_engine::{CellValue, Grid};

use crate::error::PersistError;

pub fn import(path: &Path) -> Result<Grid, PersistError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_str(&content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Grid, PersistError> {
    let content = read_file_as_utf8(path)?;
    import_from_str(&content, delimiter)
}

const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];
const SNIFF_LINES: usize = 10;

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map_or(1, |r| r.len())
}

/// Pick the delimiter that splits the header into columns and keeps the
/// following rows at that width. Falls back to comma.
fn sniff_delimiter(content: &str) -> u8 {
    let mut lines = content.lines().take(SNIFF_LINES);
    let Some(header) = lines.next() else {
        return b',';
    };
    let body: Vec<&str> = lines.collect();

    DELIMITERS
        .iter()
        .filter_map(|&delim| {
            let width = field_count(header, delim);
            if width < 2 {
                return None;
            }
            let agreeing = 1 + body.iter().filter(|l| field_count(l, delim) == width).count();
            Some((agreeing * width, delim))
        })
        // First candidate wins a tie
        .fold(None, |best: Option<(usize, u8)>, (score, delim)| match best {
            Some((top, _)) if top >= score => best,
            _ => Some((score, delim)),
        })
        .map_or(b',', |(_, delim)| delim)
}

/// File contents as UTF-8; bytes that are not valid UTF-8 are read as
/// Windows-1252, the encoding spreadsheet exports usually carry.
pub fn read_file_as_utf8(path: &Path) -> Result<String, PersistError> {
    let bytes =
        std::fs::read(path).map_err(|e| PersistError::Io(format!("{}: {e}", path.display())))?;
    Ok(String::from_utf8(bytes).unwrap_or_else(|e| {
        log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
        let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
        decoded.into_owned()
    }))
}

pub fn import_from_str(content: &str, delimiter: u8) -> Result<Grid, PersistError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PersistError::Import(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Ok(Grid::default());
    }
    for (i, name) in headers.iter().enumerate() {
        if headers[..i].contains(name) {
            return Err(PersistError::Import(format!("duplicate column '{name}'")));
        }
    }

    let width = headers.len();
    let mut grid = Grid::new(headers);
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| PersistError::Import(e.to_string()))?;
        if record.len() > width {
            return Err(PersistError::Import(format!(
                "row {} has {} fields, header has {}",
                row_idx + 1,
                record.len(),
                width
            )));
        }
        // Short rows are padded with empty cells
        let mut cells: Vec<CellValue> = record.iter().map(CellValue::from).collect();
        cells.resize(width, CellValue::default());
        grid.push_row(cells)?;
    }

    Ok(grid)
}
