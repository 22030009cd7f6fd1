//! Header row detection for the generic template
//!
//! Column positions are not fixed in version-1 workbooks, so the detector
//! scans rows top-down for a row whose cells fuzzily contain the known
//! header phrases, then maps each semantic role to the column that matched.

use crate::workbook::cell_str;
use calamine::Data;
use std::collections::HashMap;

/// Semantic column roles carried by a generic-template header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderRole {
    Category,
    SubCategory,
    Phase,
    Vendor,
    Item,
    Amount,
    InvoiceRef,
    InvoiceDate,
    TransactionType,
    CheckNumber,
}

impl HeaderRole {
    /// Lower-cased phrase the role is matched by (substring containment).
    fn phrase(self) -> &'static str {
        match self {
            HeaderRole::Category => "budget category",
            HeaderRole::SubCategory => "sub-category",
            HeaderRole::Phase => "project phase",
            HeaderRole::Vendor => "vendor",
            HeaderRole::Item => "item",
            HeaderRole::Amount => "amount",
            HeaderRole::InvoiceRef => "invoice",
            HeaderRole::InvoiceDate => "date",
            HeaderRole::TransactionType => "transaction",
            HeaderRole::CheckNumber => "check",
        }
    }

    fn is_mandatory(self) -> bool {
        matches!(
            self,
            HeaderRole::Category
                | HeaderRole::SubCategory
                | HeaderRole::Phase
                | HeaderRole::Vendor
                | HeaderRole::Item
                | HeaderRole::Amount
        )
    }

    const ALL: [HeaderRole; 10] = [
        HeaderRole::Category,
        HeaderRole::SubCategory,
        HeaderRole::Phase,
        HeaderRole::Vendor,
        HeaderRole::Item,
        HeaderRole::Amount,
        HeaderRole::InvoiceRef,
        HeaderRole::InvoiceDate,
        HeaderRole::TransactionType,
        HeaderRole::CheckNumber,
    ];
}

/// A located header row with its role-to-column mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    pub header_row: usize,
    pub columns: HashMap<HeaderRole, usize>,
}

impl HeaderMap {
    pub fn column(&self, role: HeaderRole) -> Option<usize> {
        self.columns.get(&role).copied()
    }
}

/// Minimum number of mandatory phrase hits for a row to qualify.
const MIN_MANDATORY_MATCHES: usize = 3;

/// Scan rows top-down for the first qualifying header row.
///
/// First match wins -- a later row with more hits is never preferred. Within
/// the qualifying row, the last cell matching a role keeps that role's
/// column. Returns `None` when no row qualifies; the caller falls back to
/// the fixed legacy layout.
pub fn detect_header(rows: &[Vec<Data>]) -> Option<HeaderMap> {
    for (row_index, row) in rows.iter().enumerate() {
        let mut columns: HashMap<HeaderRole, usize> = HashMap::new();

        for (col_index, cell) in row.iter().enumerate() {
            let text = cell_str(Some(cell)).trim().to_lowercase();
            if text.is_empty() {
                continue;
            }
            for role in HeaderRole::ALL {
                if text.contains(role.phrase()) {
                    columns.insert(role, col_index);
                }
            }
        }

        let mandatory_hits = columns.keys().filter(|r| r.is_mandatory()).count();
        if mandatory_hits >= MIN_MANDATORY_MATCHES {
            tracing::debug!(
                "Header row detected at index {} ({} mandatory roles)",
                row_index,
                mandatory_hits
            );
            return Some(HeaderMap {
                header_row: row_index,
                columns,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Data> {
        cells.iter().map(|c| Data::String(c.to_string())).collect()
    }

    #[test]
    fn test_detects_header_row_and_amount_column() {
        let rows = vec![
            row(&["Quarterly Budget"]),
            row(&[]),
            row(&[
                "Budget Category",
                "Sub-Category",
                "Project Phase",
                "Vendor",
                "Amount",
            ]),
        ];
        let map = detect_header(&rows).unwrap();
        assert_eq!(map.header_row, 2);
        assert_eq!(map.column(HeaderRole::Amount), Some(4));
        assert_eq!(map.column(HeaderRole::Category), Some(0));
        assert_eq!(map.column(HeaderRole::Vendor), Some(3));
    }

    #[test]
    fn test_matching_is_case_and_whitespace_insensitive() {
        let rows = vec![row(&[
            "  BUDGET CATEGORY  ",
            "SUB-CATEGORY",
            "project phase",
            "AMOUNT ($)",
        ])];
        let map = detect_header(&rows).unwrap();
        assert_eq!(map.column(HeaderRole::Amount), Some(3));
    }

    #[test]
    fn test_two_mandatory_hits_do_not_qualify() {
        let rows = vec![row(&["Budget Category", "Amount", "Notes"])];
        assert!(detect_header(&rows).is_none());
    }

    #[test]
    fn test_first_qualifying_row_wins() {
        let rows = vec![
            row(&["Budget Category", "Sub-Category", "Amount"]),
            row(&[
                "Budget Category",
                "Sub-Category",
                "Project Phase",
                "Vendor",
                "Item",
                "Amount",
            ]),
        ];
        let map = detect_header(&rows).unwrap();
        assert_eq!(map.header_row, 0);
    }

    #[test]
    fn test_last_match_wins_within_a_row() {
        // Both cells contain "invoice"; the later column keeps the role.
        let rows = vec![row(&[
            "Budget Category",
            "Sub-Category",
            "Project Phase",
            "Invoice",
            "Invoice Date",
        ])];
        let map = detect_header(&rows).unwrap();
        assert_eq!(map.column(HeaderRole::InvoiceRef), Some(4));
        assert_eq!(map.column(HeaderRole::InvoiceDate), Some(4));
    }

    #[test]
    fn test_no_header_returns_none() {
        let rows = vec![row(&["a", "b"]), row(&["1", "2"])];
        assert!(detect_header(&rows).is_none());
    }
}
