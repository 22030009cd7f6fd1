use thiserror::Error;

#[derive(Error, Debug)]
pub enum SavePointError {
    #[error("Failed to read save-point archive: {0}")]
    Archive(String),

    #[error("Failed to write save-point archive: {0}")]
    Write(String),

    #[error("Archive entry \"{0}\" is missing")]
    MissingEntry(String),

    #[error("Invalid state.json: {0}")]
    InvalidState(String),

    #[error("Unsupported save schema version {0}")]
    UnsupportedSchemaVersion(u32),

    #[error("Failed to restore session: {0}")]
    Restore(String),
}
