//! Download naming
//!
//! Report and progress outputs use fixed names; save points carry the
//! current date so successive saves do not shadow each other.

use chrono::NaiveDate;

/// Fixed name of the generated expense report.
pub const REPORT_FILE_NAME: &str = "expense-report.pdf";

/// Fixed name of the generated progress PDF.
pub const PROGRESS_FILE_NAME: &str = "progress-report.pdf";

/// A produced downloadable blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(file_name, "application/pdf", bytes)
    }
}

/// Date-stamped save-point name, e.g. `budget-session-2024-03-01.btsp`.
pub fn save_point_file_name(date: NaiveDate) -> String {
    format!("budget-session-{}.btsp", date.format("%Y-%m-%d"))
}
