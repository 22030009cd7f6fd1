use serde::{Deserialize, Serialize};

/// One normalized expense extracted from a budget spreadsheet.
///
/// `name` is an opaque composed string joined with [`crate::FACET_SEPARATOR`];
/// `sheet` names the template section the row came from. Records are immutable
/// once created -- a fresh extraction or restore replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub sheet: String,
}

impl ExpenseRecord {
    /// Display name, substituting a placeholder for empty composed names.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(unnamed)"
        } else {
            &self.name
        }
    }
}

/// An uploaded supporting document held in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileRef {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == "application/pdf"
    }

    pub fn is_png(&self) -> bool {
        self.mime_type == "image/png"
    }

    pub fn is_jpeg(&self) -> bool {
        self.mime_type == "image/jpeg"
    }
}

/// The pair of optional attachments associated with one expense by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentSlot {
    pub invoice: Option<FileRef>,
    pub proof: Option<FileRef>,
}

impl AttachmentSlot {
    pub fn is_empty(&self) -> bool {
        self.invoice.is_none() && self.proof.is_none()
    }
}

/// Spreadsheet layout convention, selected explicitly by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TemplateVersion {
    /// Single "Expenses" sheet, header row located by fuzzy phrase match.
    V1Generic,
    /// Personnel_Expenses / NonPersonnel_Expenses split with fixed columns.
    V2SplitSheets,
}

impl TemplateVersion {
    pub fn as_number(self) -> u8 {
        match self {
            TemplateVersion::V1Generic => 1,
            TemplateVersion::V2SplitSheets => 2,
        }
    }
}

impl From<TemplateVersion> for u8 {
    fn from(version: TemplateVersion) -> u8 {
        version.as_number()
    }
}

impl TryFrom<u8> for TemplateVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TemplateVersion::V1Generic),
            2 => Ok(TemplateVersion::V2SplitSheets),
            other => Err(format!("Unknown template version: {}", other)),
        }
    }
}

impl std::fmt::Display for TemplateVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_number())
    }
}
