//! Spreadsheet extraction pipeline
//!
//! Turns budget workbook bytes into normalized expense records: decode the
//! workbook with calamine, run the version-dispatched template extractor
//! (header sniffing for the generic layout), then assign stable ids.

pub mod amount;
pub mod error;
pub mod extract;
pub mod header;
pub mod identity;
pub mod workbook;

pub use amount::normalize_amount;
pub use error::ExtractError;
pub use extract::{extract_raw, RawExpense};
pub use header::{detect_header, HeaderMap, HeaderRole};
pub use identity::assign_ids;
pub use workbook::{load_sheets, SheetRows};

use shared_types::{ExpenseRecord, TemplateVersion};

/// Full pipeline: workbook bytes to identified expense records.
pub fn extract_expenses(
    bytes: &[u8],
    version: TemplateVersion,
) -> Result<Vec<ExpenseRecord>, ExtractError> {
    let sheets = load_sheets(bytes)?;
    let raw = extract_raw(version, &sheets)?;
    tracing::debug!("Extracted {} expense rows", raw.len());
    Ok(assign_ids(raw))
}
