//! Monetary amount normalization
//!
//! Budget cells arrive as numbers, formatted strings ("$1,234.56"),
//! accounting negatives ("(500)"), or garbage. Anything that does not yield
//! a finite number normalizes to 0 -- a skip-the-row policy, not an error
//! channel.

use crate::workbook::cell_str;
use calamine::Data;

/// Normalize a raw cell value into a signed amount in currency units.
pub fn normalize_amount(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) if f.is_finite() => *f,
        Data::Float(_) => 0.0,
        Data::Int(i) => *i as f64,
        Data::Empty => 0.0,
        other => normalize_amount_str(&cell_str(Some(other))),
    }
}

/// String path of the normalizer; also used for already-textual inputs.
pub fn normalize_amount_str(raw: &str) -> f64 {
    let mut clean = raw.replace(',', "").replace('$', "").trim().to_string();

    if clean.starts_with('(') && clean.ends_with(')') && clean.len() >= 2 {
        clean = format!("-{}", &clean[1..clean.len() - 1]);
    }

    match clean.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}
