//! Session façade
//!
//! Ties the engine crates together behind one-call pipelines: load a budget
//! spreadsheet, attach supporting documents, generate the report, and
//! persist/restore the session through either container. Every load
//! pipeline stages its result and only swaps the current session on full
//! success, so a failed load leaves the previous state untouched.
//!
//! There is exactly one session and one caller: pipelines take `&mut self`,
//! so the borrow checker enforces the at-most-one-in-flight contract.

pub mod download;
pub mod error;

pub use download::{save_point_file_name, Download, PROGRESS_FILE_NAME, REPORT_FILE_NAME};
pub use error::BinderError;

use chrono::Local;
use shared_types::{ExpenseSession, FileRef, TemplateVersion};

/// Owner of the current working session.
#[derive(Debug)]
pub struct Binder {
    session: ExpenseSession,
}

impl Binder {
    /// Start with an empty session for the given template version.
    pub fn new(version: TemplateVersion) -> Self {
        Self {
            session: ExpenseSession::empty(version),
        }
    }

    /// Adopt an existing session wholesale.
    pub fn with_session(session: ExpenseSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ExpenseSession {
        &self.session
    }

    /// Extract expenses from spreadsheet bytes and replace the session.
    ///
    /// Returns the number of loaded expenses. On any failure the current
    /// session is left as it was.
    pub fn load_budget(
        &mut self,
        bytes: &[u8],
        version: TemplateVersion,
    ) -> Result<usize, BinderError> {
        let records = sheet_extract::extract_expenses(bytes, version)?;
        let staged = ExpenseSession::new(version, records);
        let count = staged.len();
        self.session = staged;
        tracing::info!("Loaded {} expense(s) from spreadsheet", count);
        Ok(count)
    }

    /// Attach (or clear) the invoice for one expense.
    pub fn attach_invoice(
        &mut self,
        index: usize,
        file: Option<FileRef>,
    ) -> Result<(), BinderError> {
        self.session.set_invoice(index, file)?;
        Ok(())
    }

    /// Attach (or clear) the proof of payment for one expense.
    pub fn attach_proof(&mut self, index: usize, file: Option<FileRef>) -> Result<(), BinderError> {
        self.session.set_proof(index, file)?;
        Ok(())
    }

    /// Drop all records and attachments.
    pub fn reset(&mut self) {
        self.session.clear();
    }

    /// Compose the expense report for download.
    pub fn generate_report(&self) -> Result<Download, BinderError> {
        let bytes = report_core::compose_report(&self.session)?;
        Ok(Download::pdf(REPORT_FILE_NAME, bytes))
    }

    /// Serialize the session into a date-stamped save-point archive.
    pub fn write_save_point(&self) -> Result<Download, BinderError> {
        let today = Local::now().date_naive();
        let report = report_core::compose_report(&self.session)?;
        let bytes = savepoint_core::write_save_point(
            &self.session,
            &report,
            Some(today.format("%Y-%m-%d").to_string()),
        )?;
        Ok(Download::new(
            save_point_file_name(today),
            "application/zip",
            bytes,
        ))
    }

    /// Restore the session from a save-point archive (staging swap).
    pub fn restore_save_point(&mut self, bytes: &[u8]) -> Result<usize, BinderError> {
        let staged = savepoint_core::read_save_point(bytes)?;
        let count = staged.len();
        self.session = staged;
        tracing::info!("Restored {} expense(s) from save point", count);
        Ok(count)
    }

    /// Render the progress PDF with the embedded session payload.
    pub fn write_progress_pdf(&self) -> Result<Download, BinderError> {
        let bytes = report_core::write_progress_pdf(&self.session)?;
        Ok(Download::pdf(PROGRESS_FILE_NAME, bytes))
    }

    /// Restore the session from a progress PDF (staging swap).
    pub fn restore_progress_pdf(&mut self, bytes: &[u8]) -> Result<usize, BinderError> {
        let staged = report_core::read_progress_pdf(bytes)?;
        let count = staged.len();
        self.session = staged;
        tracing::info!("Restored {} expense(s) from progress PDF", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::ExpenseRecord;

    fn record(name: &str, amount: f64) -> ExpenseRecord {
        ExpenseRecord {
            id: format!("Expenses||{}||{}||1", name, amount),
            name: name.to_string(),
            amount,
            sheet: "Expenses".to_string(),
        }
    }

    fn loaded_binder() -> Binder {
        Binder::with_session(ExpenseSession::new(
            TemplateVersion::V1Generic,
            vec![record("Travel - Lodging", 1200.0), record("Equipment", 300.0)],
        ))
    }

    #[test]
    fn test_failed_budget_load_leaves_session_untouched() {
        let mut binder = loaded_binder();
        let before = binder.session().clone();

        let err = binder
            .load_budget(b"not a workbook", TemplateVersion::V1Generic)
            .unwrap_err();
        assert!(matches!(err, BinderError::Extract(_)));
        assert_eq!(binder.session(), &before);
    }

    #[test]
    fn test_failed_save_point_restore_leaves_session_untouched() {
        let mut binder = loaded_binder();
        let before = binder.session().clone();

        let err = binder.restore_save_point(b"not a zip").unwrap_err();
        assert!(matches!(err, BinderError::SavePoint(_)));
        assert_eq!(binder.session(), &before);
    }

    #[test]
    fn test_save_point_round_trip_through_binder() {
        let mut binder = loaded_binder();
        binder
            .attach_invoice(
                0,
                Some(FileRef::new("inv.pdf", "application/pdf", vec![5, 6, 7])),
            )
            .unwrap();

        let download = binder.write_save_point().unwrap();
        assert!(download.file_name.starts_with("budget-session-"));
        assert!(download.file_name.ends_with(".btsp"));

        let mut restored = Binder::new(TemplateVersion::V1Generic);
        let count = restored.restore_save_point(&download.bytes).unwrap();
        assert_eq!(count, 2);
        assert_eq!(restored.session(), binder.session());
    }

    #[test]
    fn test_progress_pdf_round_trip_through_binder() {
        let mut binder = loaded_binder();
        binder
            .attach_proof(
                1,
                Some(FileRef::new("receipt.pdf", "application/pdf", {
                    // A real single-page PDF so report composition succeeds.
                    report_core::compose_report(&ExpenseSession::new(
                        TemplateVersion::V1Generic,
                        vec![record("Receipt body", 1.0)],
                    ))
                    .unwrap()
                })),
            )
            .unwrap();

        let download = binder.write_progress_pdf().unwrap();
        assert_eq!(download.file_name, PROGRESS_FILE_NAME);

        let mut restored = Binder::new(TemplateVersion::V1Generic);
        restored.restore_progress_pdf(&download.bytes).unwrap();
        assert_eq!(restored.session(), binder.session());
    }

    #[test]
    fn test_generate_report_on_empty_session_fails() {
        let binder = Binder::new(TemplateVersion::V1Generic);
        let err = binder.generate_report().unwrap_err();
        assert!(matches!(err, BinderError::Report(_)));
    }

    #[test]
    fn test_reset_clears_the_session() {
        let mut binder = loaded_binder();
        binder.reset();
        assert!(binder.session().is_empty());
    }
}
