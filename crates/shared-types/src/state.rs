//! Versioned save-state wire schema
//!
//! One canonical schema shared by every persistence container. The zip
//! save-point references attachment payloads by archive path; the PDF
//! variant inlines them as base64 `data`. `schemaVersion` is the sole
//! compatibility gate: any value other than [`SCHEMA_VERSION`] is a hard
//! load failure, never a best-effort upgrade.

use crate::types::{ExpenseRecord, TemplateVersion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current wire schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Discriminator tag carried by PDF-embedded payloads.
pub const SAVE_KIND: &str = "budget-binder-session";

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Unsupported save schema version {found} (expected {SCHEMA_VERSION})")]
    UnsupportedSchemaVersion { found: u32 },
}

/// Serialized form of a full working session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub schema_version: u32,
    pub template_version: TemplateVersion,
    pub expenses: Vec<ExpenseRecord>,
    pub attachments: Vec<SlotManifest>,
    /// Informational save date (YYYY-MM-DD); not used on restore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl SaveState {
    /// Fail unless the payload carries the one schema version we understand.
    pub fn check_schema(&self) -> Result<(), StateError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(StateError::UnsupportedSchemaVersion {
                found: self.schema_version,
            });
        }
        Ok(())
    }
}

/// Manifest for one attachment slot; absent sides get no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<AttachmentManifestEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<AttachmentManifestEntry>,
}

/// One attached file: original name, MIME type, and the payload reference.
///
/// Exactly one of `path` (container-relative, zip variant) and `data`
/// (base64, PDF variant) is populated by each codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentManifestEntry {
    pub name: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl AttachmentManifestEntry {
    pub fn with_path(name: impl Into<String>, mime_type: impl Into<String>, path: String) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            path: Some(path),
            data: None,
        }
    }

    pub fn with_data(name: impl Into<String>, mime_type: impl Into<String>, data: String) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            path: None,
            data: Some(data),
        }
    }
}
