use report_core::ReportError;
use savepoint_core::SavePointError;
use sheet_extract::ExtractError;
use shared_types::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BinderError {
    #[error("Spreadsheet load failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Report generation failed: {0}")]
    Report(#[from] ReportError),

    #[error("Save point failed: {0}")]
    SavePoint(#[from] SavePointError),

    #[error("Session update failed: {0}")]
    Session(#[from] SessionError),
}
