use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Expected sheet \"{0}\" was not found in the workbook")]
    MissingSheet(String),
}
