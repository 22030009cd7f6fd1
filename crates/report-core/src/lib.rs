//! PDF report composition and the PDF-embedded save format
//!
//! Builds the per-expense progress report with lopdf: one detail page per
//! record, followed by the invoice and proof attachments (PDF pages appended
//! in place, images drawn centered on captioned pages, placeholders when
//! nothing was uploaded). The same document doubles as a save container: the
//! full session state rides along as an embedded file, with a reduced copy
//! in the document's subject metadata for readers that cannot reach
//! embedded files.

pub mod assemble;
pub mod compose;
pub mod error;
pub mod images;
pub mod page;
pub mod progress;

pub use assemble::assemble_segments;
pub use compose::compose_report;
pub use error::ReportError;
pub use progress::{read_progress_pdf, write_progress_pdf, DOC_TITLE, EMBEDDED_STATE_FILE};
