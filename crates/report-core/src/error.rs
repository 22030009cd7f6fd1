use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF composition failed: {0}")]
    ComposeError(String),

    #[error("Failed to decode image attachment: {0}")]
    ImageError(String),

    #[error("Unsupported attachment type: {0}")]
    UnsupportedAttachment(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("No session payload found in PDF")]
    MissingPayload,

    #[error("Save payload kind \"{0}\" is not a budget binder session")]
    KindMismatch(String),

    #[error("Unsupported save schema version {0}")]
    UnsupportedSchemaVersion(u32),

    #[error("Failed to restore session: {0}")]
    RestoreError(String),
}
