//! Stable identity assignment
//!
//! Ids are derived, not random: records grouped by (sheet, name, amount)
//! get a 1-based occurrence counter appended to the `||`-joined base key.
//! Re-extracting the same spreadsheet reproduces identical ids, which the
//! persistence codecs rely on for round-trip identity checks.

use crate::extract::RawExpense;
use shared_types::ExpenseRecord;
use std::collections::HashMap;

const KEY_DELIMITER: &str = "||";

/// Assign collision-resistant ids to extracted expenses, in input order.
pub fn assign_ids(raw: Vec<RawExpense>) -> Vec<ExpenseRecord> {
    let mut occurrences: HashMap<String, u32> = HashMap::new();

    raw.into_iter()
        .map(|expense| {
            let base = format!(
                "{sheet}{d}{name}{d}{amount}",
                sheet = expense.sheet,
                name = expense.name,
                amount = expense.amount,
                d = KEY_DELIMITER,
            );
            let count = occurrences.entry(base.clone()).or_insert(0);
            *count += 1;

            ExpenseRecord {
                id: format!("{base}{KEY_DELIMITER}{count}"),
                name: expense.name,
                amount: expense.amount,
                sheet: expense.sheet,
            }
        })
        .collect()
}
