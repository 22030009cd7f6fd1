//! USD display formatting for detail pages and summaries.

use num_format::{Buffer, Locale};

/// Format a signed amount as US dollars, e.g. `$1,234.56` / `-$500.00`.
pub fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    // Round to whole cents before splitting, so 19.999 renders as $20.00.
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let fraction = cents % 100;

    let mut buffer = Buffer::default();
    buffer.write_formatted(&dollars, &Locale::en);

    if negative {
        format!("-${}.{:02}", buffer.as_str(), fraction)
    } else {
        format!("${}.{:02}", buffer.as_str(), fraction)
    }
}
