//! Version-dispatched template extraction
//!
//! Two strategies keyed off [`TemplateVersion`]: the version-2 split-sheet
//! layout with fixed row/column assumptions, and the version-1 generic
//! layout that sniffs the header row and falls back to a legacy fixed
//! layout when no header qualifies. The two fixed layouts coincide in shape
//! today but are configured independently on purpose.

use crate::amount::normalize_amount;
use crate::error::ExtractError;
use crate::header::{detect_header, HeaderMap, HeaderRole};
use crate::workbook::{cell_str, SheetRows};
use calamine::Data;
use shared_types::{compose_name, TemplateVersion};

/// An extracted expense candidate, pre-identity.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpense {
    pub name: String,
    pub amount: f64,
    pub sheet: String,
}

/// Fixed row/column assumptions for a template section.
#[derive(Debug, Clone, Copy)]
struct FixedLayout {
    /// Rows to skip before data starts (header block).
    skip_rows: usize,
    /// Leading columns concatenated into the expense name.
    name_columns: usize,
    /// Column index the amount is read from.
    amount_column: usize,
}

/// Version-2 split-sheet sections.
const V2_SECTIONS: [(&str, FixedLayout); 2] = [
    (
        "Personnel_Expenses",
        FixedLayout {
            skip_rows: 6,
            name_columns: 6,
            amount_column: 6,
        },
    ),
    (
        "NonPersonnel_Expenses",
        FixedLayout {
            skip_rows: 6,
            name_columns: 3,
            amount_column: 9,
        },
    ),
];

/// Version-1 sheet name and its header-miss fallback layout.
const V1_SHEET: &str = "Expenses";
const V1_FALLBACK: FixedLayout = FixedLayout {
    skip_rows: 6,
    name_columns: 10,
    amount_column: 10,
};

/// Name composition order for header-mapped columns (amount excluded).
const V1_NAME_ROLES: [HeaderRole; 9] = [
    HeaderRole::Category,
    HeaderRole::SubCategory,
    HeaderRole::Phase,
    HeaderRole::Vendor,
    HeaderRole::Item,
    HeaderRole::InvoiceRef,
    HeaderRole::InvoiceDate,
    HeaderRole::TransactionType,
    HeaderRole::CheckNumber,
];

/// Run the strategy selected by `version` over the decoded sheets.
pub fn extract_raw(
    version: TemplateVersion,
    sheets: &[SheetRows],
) -> Result<Vec<RawExpense>, ExtractError> {
    match version {
        TemplateVersion::V2SplitSheets => extract_v2(sheets),
        TemplateVersion::V1Generic => extract_v1(sheets),
    }
}

fn extract_v2(sheets: &[SheetRows]) -> Result<Vec<RawExpense>, ExtractError> {
    let mut expenses = Vec::new();
    for (sheet_name, layout) in V2_SECTIONS {
        let sheet = sheets
            .iter()
            .find(|s| s.name == sheet_name)
            .ok_or_else(|| ExtractError::MissingSheet(sheet_name.to_string()))?;
        expenses.extend(extract_fixed(sheet_name, &sheet.rows, layout));
    }
    Ok(expenses)
}

fn extract_v1(sheets: &[SheetRows]) -> Result<Vec<RawExpense>, ExtractError> {
    let sheet = sheets
        .iter()
        .find(|s| s.name.trim().eq_ignore_ascii_case(V1_SHEET))
        .ok_or_else(|| ExtractError::MissingSheet(V1_SHEET.to_string()))?;

    // Only a header map that actually located the amount column is usable.
    let header = detect_header(&sheet.rows);
    let amount_column = header.as_ref().and_then(|map| map.column(HeaderRole::Amount));

    match (header, amount_column) {
        (Some(map), Some(amount_column)) => Ok(extract_with_header(
            &sheet.name,
            &sheet.rows,
            &map,
            amount_column,
        )),
        _ => {
            tracing::debug!(
                "No qualifying header row in '{}', using fixed fallback layout",
                sheet.name
            );
            Ok(extract_fixed(&sheet.name, &sheet.rows, V1_FALLBACK))
        }
    }
}

fn extract_fixed(sheet_name: &str, rows: &[Vec<Data>], layout: FixedLayout) -> Vec<RawExpense> {
    let mut expenses = Vec::new();
    for row in rows.iter().skip(layout.skip_rows) {
        let amount = amount_at(row, layout.amount_column);
        if amount == 0.0 {
            continue;
        }

        let parts: Vec<String> = (0..layout.name_columns)
            .map(|col| cell_str(row.get(col)))
            .collect();

        expenses.push(RawExpense {
            name: compose_name(parts),
            amount,
            sheet: sheet_name.to_string(),
        });
    }
    expenses
}

fn extract_with_header(
    sheet_name: &str,
    rows: &[Vec<Data>],
    map: &HeaderMap,
    amount_column: usize,
) -> Vec<RawExpense> {
    let mut expenses = Vec::new();
    for row in rows.iter().skip(map.header_row + 1) {
        let amount = amount_at(row, amount_column);
        if amount == 0.0 {
            continue;
        }

        let parts: Vec<String> = V1_NAME_ROLES
            .iter()
            .filter_map(|role| map.column(*role))
            .map(|col| cell_str(row.get(col)))
            .collect();

        expenses.push(RawExpense {
            name: compose_name(parts),
            amount,
            sheet: sheet_name.to_string(),
        });
    }
    expenses
}

fn amount_at(row: &[Data], column: usize) -> f64 {
    row.get(column).map(normalize_amount).unwrap_or(0.0)
}
