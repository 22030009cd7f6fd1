//! Workbook decoding from in-memory bytes.

use crate::error::ExtractError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// One decoded sheet as a plain row grid.
#[derive(Debug, Clone)]
pub struct SheetRows {
    pub name: String,
    pub rows: Vec<Vec<Data>>,
}

impl SheetRows {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Decode every sheet of a workbook into row grids.
///
/// Sheets whose range cannot be read are skipped with a warning rather than
/// failing the whole load; the extractor decides later whether a sheet it
/// needs is missing.
pub fn load_sheets(bytes: &[u8]) -> Result<Vec<SheetRows>, ExtractError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| ExtractError::Workbook(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in &sheet_names {
        let range = match workbook.worksheet_range(name) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!("Skipping sheet '{}': {}", name, e);
                continue;
            }
        };

        let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
        sheets.push(SheetRows::new(name.clone(), rows));
    }

    Ok(sheets)
}

/// Coerce any cell value to its display string.
pub fn cell_str(cell: Option<&Data>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };

    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sheets_rejects_garbage_bytes() {
        let err = load_sheets(b"not a workbook").unwrap_err();
        assert!(matches!(err, ExtractError::Workbook(_)));
    }

    #[test]
    fn test_cell_str_coerces_primitives() {
        assert_eq!(cell_str(Some(&Data::String("Vendor".into()))), "Vendor");
        assert_eq!(cell_str(Some(&Data::Float(1.5))), "1.5");
        assert_eq!(cell_str(Some(&Data::Int(7))), "7");
        assert_eq!(cell_str(Some(&Data::Empty)), "");
        assert_eq!(cell_str(None), "");
    }
}
