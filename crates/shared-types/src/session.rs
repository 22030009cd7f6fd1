//! In-memory session aggregate
//!
//! The session owns the ordered expense list and the parallel attachment
//! slots. Construction keeps the two lists the same length; callers can only
//! replace slot contents, never resize them, so the parallel-array invariant
//! cannot be broken from outside.

use crate::types::{AttachmentSlot, ExpenseRecord, FileRef, TemplateVersion};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Expense index {index} out of bounds ({len} expenses loaded)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Attachment slot count {slots} does not match expense count {expenses}")]
    SlotCountMismatch { slots: usize, expenses: usize },
}

/// The single source of truth for the rest of the system.
///
/// Record order is stable and defines both display order and detail-page
/// order in any generated document. A session is replaced wholesale on
/// load/restore and cleared on reset -- it is never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSession {
    version: TemplateVersion,
    expenses: Vec<ExpenseRecord>,
    attachments: Vec<AttachmentSlot>,
}

impl ExpenseSession {
    /// Create a session from freshly extracted records, with empty slots.
    pub fn new(version: TemplateVersion, expenses: Vec<ExpenseRecord>) -> Self {
        let attachments = expenses.iter().map(|_| AttachmentSlot::default()).collect();
        Self {
            version,
            expenses,
            attachments,
        }
    }

    /// Create an empty session.
    pub fn empty(version: TemplateVersion) -> Self {
        Self::new(version, Vec::new())
    }

    /// Reassemble a session from restored parts.
    ///
    /// Fails if the slot list does not line up with the expense list; restore
    /// codecs must produce one slot per record.
    pub fn from_parts(
        version: TemplateVersion,
        expenses: Vec<ExpenseRecord>,
        attachments: Vec<AttachmentSlot>,
    ) -> Result<Self, SessionError> {
        if attachments.len() != expenses.len() {
            return Err(SessionError::SlotCountMismatch {
                slots: attachments.len(),
                expenses: expenses.len(),
            });
        }
        Ok(Self {
            version,
            expenses,
            attachments,
        })
    }

    pub fn version(&self) -> TemplateVersion {
        self.version
    }

    pub fn expenses(&self) -> &[ExpenseRecord] {
        &self.expenses
    }

    pub fn attachments(&self) -> &[AttachmentSlot] {
        &self.attachments
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Iterate records with their slots, in display order.
    pub fn entries(&self) -> impl Iterator<Item = (&ExpenseRecord, &AttachmentSlot)> + '_ {
        self.expenses.iter().zip(self.attachments.iter())
    }

    /// Replace the invoice attachment for one expense.
    pub fn set_invoice(
        &mut self,
        index: usize,
        file: Option<FileRef>,
    ) -> Result<(), SessionError> {
        let slot = self.slot_mut(index)?;
        slot.invoice = file;
        Ok(())
    }

    /// Replace the proof-of-payment attachment for one expense.
    pub fn set_proof(&mut self, index: usize, file: Option<FileRef>) -> Result<(), SessionError> {
        let slot = self.slot_mut(index)?;
        slot.proof = file;
        Ok(())
    }

    /// Drop all records and attachments, keeping the template version.
    pub fn clear(&mut self) {
        self.expenses.clear();
        self.attachments.clear();
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut AttachmentSlot, SessionError> {
        let len = self.attachments.len();
        self.attachments
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfBounds { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ExpenseRecord {
        ExpenseRecord {
            id: format!("Expenses||{}||10||1", name),
            name: name.to_string(),
            amount: 10.0,
            sheet: "Expenses".to_string(),
        }
    }

    #[test]
    fn test_new_session_has_one_slot_per_record() {
        let session = ExpenseSession::new(
            TemplateVersion::V1Generic,
            vec![record("a"), record("b"), record("c")],
        );
        assert_eq!(session.len(), 3);
        assert_eq!(session.attachments().len(), 3);
        assert!(session.attachments().iter().all(AttachmentSlot::is_empty));
    }

    #[test]
    fn test_set_invoice_replaces_slot_contents() {
        let mut session = ExpenseSession::new(TemplateVersion::V1Generic, vec![record("a")]);
        let file = FileRef::new("inv.pdf", "application/pdf", vec![1, 2, 3]);
        session.set_invoice(0, Some(file.clone())).unwrap();
        assert_eq!(session.attachments()[0].invoice, Some(file));

        session.set_invoice(0, None).unwrap();
        assert!(session.attachments()[0].invoice.is_none());
    }

    #[test]
    fn test_set_attachment_out_of_bounds_fails() {
        let mut session = ExpenseSession::new(TemplateVersion::V1Generic, vec![record("a")]);
        let err = session.set_proof(5, None).unwrap_err();
        assert!(matches!(err, SessionError::IndexOutOfBounds { index: 5, .. }));
    }

    #[test]
    fn test_from_parts_rejects_mismatched_lengths() {
        let err = ExpenseSession::from_parts(
            TemplateVersion::V2SplitSheets,
            vec![record("a"), record("b")],
            vec![AttachmentSlot::default()],
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::SlotCountMismatch { .. }));
    }

    #[test]
    fn test_clear_empties_both_lists() {
        let mut session = ExpenseSession::new(TemplateVersion::V1Generic, vec![record("a")]);
        session.clear();
        assert!(session.is_empty());
        assert!(session.attachments().is_empty());
    }
}
