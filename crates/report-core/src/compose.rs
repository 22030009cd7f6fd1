//! Report composition
//!
//! One detail page per expense, followed by the invoice content (or a
//! placeholder page) and the proof content (or its placeholder), repeated
//! in record order. Uploaded PDFs contribute their pages verbatim; images
//! are drawn centered under a caption.

use crate::assemble::assemble_segments;
use crate::error::ReportError;
use crate::images::{jpeg_xobject, png_xobject};
use crate::page::{build_image_page, build_text_page, line, TextLine};
use shared_types::{decompose_name, format_usd, ExpenseRecord, ExpenseSession, FileRef};

/// Which side of an attachment slot a page belongs to.
#[derive(Debug, Clone, Copy)]
enum AttachmentSide {
    Invoice,
    Proof,
}

impl AttachmentSide {
    fn caption(self, ordinal: usize) -> String {
        match self {
            AttachmentSide::Invoice => format!("Invoice for expense {}", ordinal),
            AttachmentSide::Proof => format!("Proof of payment for expense {}", ordinal),
        }
    }

    fn placeholder(self, ordinal: usize) -> String {
        match self {
            AttachmentSide::Invoice => format!("Expense {}: no invoice uploaded.", ordinal),
            AttachmentSide::Proof => {
                format!("Expense {}: no proof of payment uploaded.", ordinal)
            }
        }
    }
}

/// Compose the full progress report for a session.
pub fn compose_report(session: &ExpenseSession) -> Result<Vec<u8>, ReportError> {
    if session.is_empty() {
        return Err(ReportError::ComposeError(
            "Session has no expenses to report".into(),
        ));
    }

    let mut segments = Vec::with_capacity(session.len() * 3);
    for (index, (record, slot)) in session.entries().enumerate() {
        let ordinal = index + 1;
        segments.push(detail_page(ordinal, record)?);
        segments.push(attachment_segment(
            ordinal,
            AttachmentSide::Invoice,
            slot.invoice.as_ref(),
        )?);
        segments.push(attachment_segment(
            ordinal,
            AttachmentSide::Proof,
            slot.proof.as_ref(),
        )?);
    }

    tracing::debug!("Assembling report from {} segments", segments.len());
    assemble_segments(segments)
}

fn detail_page(ordinal: usize, record: &ExpenseRecord) -> Result<Vec<u8>, ReportError> {
    let facets = decompose_name(&record.name);

    let mut lines: Vec<TextLine> = vec![line(40.0, 780.0, 18.0, format!("Expense {}", ordinal))];

    let fields = [
        ("Name", record.display_name().to_string()),
        ("Category", facets.category),
        ("Sub-category", facets.sub_category),
        ("Project phase", facets.phase),
        ("Details", facets.details),
        ("Amount", format_usd(record.amount)),
        ("Sheet", record.sheet.clone()),
    ];

    let mut y = 740.0;
    for (label, value) in fields {
        lines.push(line(40.0, y, 11.0, label));
        lines.push(line(40.0, y - 18.0, 12.0, value));
        y -= 45.0;
    }

    build_text_page(&lines)
}

fn attachment_segment(
    ordinal: usize,
    side: AttachmentSide,
    file: Option<&FileRef>,
) -> Result<Vec<u8>, ReportError> {
    let Some(file) = file else {
        return build_text_page(&[line(50.0, 760.0, 14.0, side.placeholder(ordinal))]);
    };

    if file.is_pdf() {
        // Appended as-is; assembly re-parses and merges its pages.
        return Ok(file.bytes.clone());
    }

    let image = if file.is_png() {
        png_xobject(&file.bytes)?
    } else if file.is_jpeg() {
        jpeg_xobject(&file.bytes)?
    } else {
        return Err(ReportError::UnsupportedAttachment(file.mime_type.clone()));
    };

    build_image_page(&[line(40.0, 780.0, 14.0, side.caption(ordinal))], image)
}
