//! PDF-embedded save format
//!
//! The progress PDF is both the human-readable report and a save container.
//! The full session state (attachment bytes inlined as base64) rides in a
//! named embedded file; a reduced copy without payloads is mirrored into
//! the document's Subject metadata for readers that cannot reach embedded
//! files. Restoring from the Subject path loses attachments by design.

use crate::compose::compose_report;
use crate::error::ReportError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use lopdf::{dictionary, Document, Object, Stream};
use serde::{Deserialize, Serialize};
use shared_types::{
    AttachmentManifestEntry, AttachmentSlot, ExpenseRecord, ExpenseSession, FileRef, SaveState,
    SlotManifest, TemplateVersion, SAVE_KIND, SCHEMA_VERSION,
};

/// Name of the embedded file holding the full session payload.
pub const EMBEDDED_STATE_FILE: &str = "expense-session.json";

/// Fixed document title for generated progress PDFs.
pub const DOC_TITLE: &str = "Expense progress report";

/// Full save payload embedded as a PDF file attachment.
#[derive(Debug, Serialize, Deserialize)]
struct PdfSavePayload {
    kind: String,
    #[serde(flatten)]
    state: SaveState,
}

/// Reduced payload mirrored into the Subject metadata field.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectPayload {
    kind: String,
    schema_version: u32,
    template_version: TemplateVersion,
    expenses: Vec<ExpenseRecord>,
}

/// Render the progress report and embed the full session state in it.
pub fn write_progress_pdf(session: &ExpenseSession) -> Result<Vec<u8>, ReportError> {
    let report = compose_report(session)?;
    let mut doc =
        Document::load_mem(&report).map_err(|e| ReportError::ParseError(e.to_string()))?;

    let payload = PdfSavePayload {
        kind: SAVE_KIND.to_string(),
        state: inline_state(session),
    };
    let json = serde_json::to_vec(&payload)
        .map_err(|e| ReportError::SerializationError(e.to_string()))?;
    attach_session_file(&mut doc, &json)?;

    let subject = subject_json(session)?;
    set_document_info(&mut doc, subject);

    doc.compress();
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ReportError::ComposeError(format!("Failed to save progress PDF: {}", e)))?;

    tracing::info!(
        "Wrote progress PDF with {} expense(s), {} byte payload",
        session.len(),
        json.len()
    );
    Ok(buffer)
}

/// Restore a session from a progress PDF.
///
/// Prefers the embedded file; falls back to the Subject metadata (attachment
/// slots restore empty). Fails if neither payload is present and parseable,
/// if the kind discriminator does not match, or on any schema version other
/// than the current one.
pub fn read_progress_pdf(bytes: &[u8]) -> Result<ExpenseSession, ReportError> {
    let doc = Document::load_mem(bytes).map_err(|e| ReportError::ParseError(e.to_string()))?;

    if let Some(json) = find_embedded_session(&doc) {
        let payload: PdfSavePayload = serde_json::from_slice(&json)
            .map_err(|e| ReportError::RestoreError(format!("Invalid embedded payload: {}", e)))?;
        if payload.kind != SAVE_KIND {
            return Err(ReportError::KindMismatch(payload.kind));
        }
        payload
            .state
            .check_schema()
            .map_err(|_| ReportError::UnsupportedSchemaVersion(payload.state.schema_version))?;
        return session_from_state(payload.state);
    }

    if let Some(subject) = read_subject(&doc) {
        tracing::warn!("No embedded session file; restoring from Subject metadata without attachments");
        let payload: SubjectPayload = serde_json::from_str(&subject)
            .map_err(|e| ReportError::RestoreError(format!("Invalid subject payload: {}", e)))?;
        if payload.kind != SAVE_KIND {
            return Err(ReportError::KindMismatch(payload.kind));
        }
        if payload.schema_version != SCHEMA_VERSION {
            return Err(ReportError::UnsupportedSchemaVersion(payload.schema_version));
        }
        return Ok(ExpenseSession::new(
            payload.template_version,
            payload.expenses,
        ));
    }

    Err(ReportError::MissingPayload)
}

/// Session state with every attachment payload inlined as base64.
fn inline_state(session: &ExpenseSession) -> SaveState {
    let attachments = session
        .attachments()
        .iter()
        .map(|slot| SlotManifest {
            invoice: slot.invoice.as_ref().map(inline_entry),
            proof: slot.proof.as_ref().map(inline_entry),
        })
        .collect();

    SaveState {
        schema_version: SCHEMA_VERSION,
        template_version: session.version(),
        expenses: session.expenses().to_vec(),
        attachments,
        saved_at: None,
    }
}

fn inline_entry(file: &FileRef) -> AttachmentManifestEntry {
    AttachmentManifestEntry::with_data(&file.name, &file.mime_type, BASE64.encode(&file.bytes))
}

fn subject_json(session: &ExpenseSession) -> Result<String, ReportError> {
    serde_json::to_string(&SubjectPayload {
        kind: SAVE_KIND.to_string(),
        schema_version: SCHEMA_VERSION,
        template_version: session.version(),
        expenses: session.expenses().to_vec(),
    })
    .map_err(|e| ReportError::SerializationError(e.to_string()))
}

fn session_from_state(state: SaveState) -> Result<ExpenseSession, ReportError> {
    let mut slots = Vec::with_capacity(state.attachments.len());
    for manifest in &state.attachments {
        slots.push(AttachmentSlot {
            invoice: decode_entry(manifest.invoice.as_ref())?,
            proof: decode_entry(manifest.proof.as_ref())?,
        });
    }

    ExpenseSession::from_parts(state.template_version, state.expenses, slots)
        .map_err(|e| ReportError::RestoreError(e.to_string()))
}

fn decode_entry(
    entry: Option<&AttachmentManifestEntry>,
) -> Result<Option<FileRef>, ReportError> {
    let Some(entry) = entry else {
        return Ok(None);
    };
    let data = entry.data.as_ref().ok_or_else(|| {
        ReportError::RestoreError(format!("Attachment \"{}\" has no inline data", entry.name))
    })?;
    let bytes = BASE64.decode(data).map_err(|e| {
        ReportError::RestoreError(format!("Attachment \"{}\": invalid base64: {}", entry.name, e))
    })?;
    Ok(Some(FileRef::new(&entry.name, &entry.mime_type, bytes)))
}

/// Register `EMBEDDED_STATE_FILE` in the catalog's embedded-files name tree.
fn attach_session_file(doc: &mut Document, json: &[u8]) -> Result<(), ReportError> {
    let file_stream = Stream::new(
        dictionary! {
            "Type" => "EmbeddedFile",
            "Subtype" => Object::Name(b"application/json".to_vec()),
            "Params" => dictionary! { "Size" => json.len() as i64 },
        },
        json.to_vec(),
    );
    let file_id = doc.add_object(Object::Stream(file_stream));

    let filespec = dictionary! {
        "Type" => "Filespec",
        "F" => Object::string_literal(EMBEDDED_STATE_FILE),
        "UF" => Object::string_literal(EMBEDDED_STATE_FILE),
        "EF" => dictionary! { "F" => Object::Reference(file_id) },
    };
    let filespec_id = doc.add_object(filespec);

    let name_tree = dictionary! {
        "Names" => vec![
            Object::string_literal(EMBEDDED_STATE_FILE),
            Object::Reference(filespec_id),
        ],
    };
    let name_tree_id = doc.add_object(name_tree);

    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| ReportError::ComposeError("No Root reference in trailer".into()))?;

    match doc.objects.get_mut(&catalog_id) {
        Some(Object::Dictionary(catalog)) => {
            catalog.set(
                "Names",
                dictionary! { "EmbeddedFiles" => Object::Reference(name_tree_id) },
            );
            Ok(())
        }
        _ => Err(ReportError::ComposeError("Catalog not found".into())),
    }
}

fn set_document_info(doc: &mut Document, subject: String) {
    let info = dictionary! {
        "Title" => Object::string_literal(DOC_TITLE),
        "Subject" => Object::string_literal(subject),
    };
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", Object::Reference(info_id));
}

/// Follow a reference to its object; non-references pass through.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Locate the embedded session payload, decompressing if needed.
fn find_embedded_session(doc: &Document) -> Option<Vec<u8>> {
    let catalog_id = doc.trailer.get(b"Root").ok()?.as_reference().ok()?;
    let catalog = doc.get_object(catalog_id).ok()?.as_dict().ok()?;

    let names = resolve(doc, catalog.get(b"Names").ok()?).as_dict().ok()?;
    let embedded = resolve(doc, names.get(b"EmbeddedFiles").ok()?)
        .as_dict()
        .ok()?;
    let pairs = resolve(doc, embedded.get(b"Names").ok()?).as_array().ok()?;

    for pair in pairs.chunks(2) {
        let [name_obj, spec_obj] = pair else {
            continue;
        };
        let Object::String(name, _) = resolve(doc, name_obj) else {
            continue;
        };
        if name.as_slice() != EMBEDDED_STATE_FILE.as_bytes() {
            continue;
        }

        let spec = resolve(doc, spec_obj).as_dict().ok()?;
        let ef = resolve(doc, spec.get(b"EF").ok()?).as_dict().ok()?;
        let Object::Stream(stream) = resolve(doc, ef.get(b"F").ok()?) else {
            continue;
        };
        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        return Some(content);
    }

    None
}

/// Read the Subject string from the document info dictionary.
fn read_subject(doc: &Document) -> Option<String> {
    let info_ref = doc.trailer.get(b"Info").ok()?;
    let info = resolve(doc, info_ref).as_dict().ok()?;
    let Object::String(subject, _) = resolve(doc, info.get(b"Subject").ok()?) else {
        return None;
    };
    Some(String::from_utf8_lossy(subject).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::test_fixtures::tiny_png;
    use crate::page::test_fixtures::single_text_page_pdf;
    use pretty_assertions::assert_eq;

    fn record(name: &str, amount: f64) -> ExpenseRecord {
        ExpenseRecord {
            id: format!("Expenses||{}||{}||1", name, amount),
            name: name.to_string(),
            amount,
            sheet: "Expenses".to_string(),
        }
    }

    fn session_with_attachments() -> ExpenseSession {
        let mut session = ExpenseSession::new(
            TemplateVersion::V1Generic,
            vec![record("Travel - Lodging", 1200.0), record("Equipment", 300.0)],
        );
        session
            .set_invoice(
                0,
                Some(FileRef::new("scan.png", "image/png", tiny_png(6, 4))),
            )
            .unwrap();
        session
            .set_proof(
                1,
                Some(FileRef::new(
                    "receipt.pdf",
                    "application/pdf",
                    single_text_page_pdf("Receipt"),
                )),
            )
            .unwrap();
        session
    }

    #[test]
    fn test_round_trip_through_embedded_file() {
        let session = session_with_attachments();
        let pdf = write_progress_pdf(&session).unwrap();
        let restored = read_progress_pdf(&pdf).unwrap();

        assert_eq!(restored.expenses(), session.expenses());
        assert_eq!(restored.version(), session.version());
        // Byte-identical payloads for present slots, None for absent ones.
        assert_eq!(restored.attachments(), session.attachments());
    }

    #[test]
    fn test_title_is_the_fixed_constant() {
        let pdf = write_progress_pdf(&session_with_attachments()).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        let info = resolve(&doc, doc.trailer.get(b"Info").unwrap())
            .as_dict()
            .unwrap();
        let Object::String(title, _) = info.get(b"Title").unwrap() else {
            panic!("Title is not a string");
        };
        assert_eq!(title.as_slice(), DOC_TITLE.as_bytes());
    }

    #[test]
    fn test_subject_fallback_restores_records_without_attachments() {
        let session = session_with_attachments();
        // A document carrying only the Subject metadata, no embedded file.
        let mut doc = Document::load_mem(&single_text_page_pdf("Report")).unwrap();
        set_document_info(&mut doc, subject_json(&session).unwrap());
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let restored = read_progress_pdf(&bytes).unwrap();
        assert_eq!(restored.expenses(), session.expenses());
        assert!(restored.attachments().iter().all(AttachmentSlot::is_empty));
    }

    #[test]
    fn test_pdf_without_any_payload_is_rejected() {
        let err = read_progress_pdf(&single_text_page_pdf("Plain")).unwrap_err();
        assert!(matches!(err, ReportError::MissingPayload));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let mut doc = Document::load_mem(&single_text_page_pdf("Report")).unwrap();
        let payload = serde_json::json!({
            "kind": "someone-elses-save",
            "schemaVersion": 1,
            "templateVersion": 1,
            "expenses": [],
            "attachments": [],
        });
        attach_session_file(&mut doc, payload.to_string().as_bytes()).unwrap();
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let err = read_progress_pdf(&bytes).unwrap_err();
        assert!(matches!(err, ReportError::KindMismatch(_)));
    }

    #[test]
    fn test_future_schema_version_is_rejected() {
        let mut doc = Document::load_mem(&single_text_page_pdf("Report")).unwrap();
        let payload = serde_json::json!({
            "kind": SAVE_KIND,
            "schemaVersion": 2,
            "templateVersion": 1,
            "expenses": [],
            "attachments": [],
        });
        attach_session_file(&mut doc, payload.to_string().as_bytes()).unwrap();
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let err = read_progress_pdf(&bytes).unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedSchemaVersion(2)));
    }

    #[test]
    fn test_garbage_bytes_are_a_parse_error() {
        let err = read_progress_pdf(b"not a pdf").unwrap_err();
        assert!(matches!(err, ReportError::ParseError(_)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Each case renders a full report, so keep the case count low.
            #![proptest_config(ProptestConfig::with_cases(16))]
            #[test]
            fn prop_records_round_trip_through_embedded_payload(
                seeds in proptest::collection::vec(
                    (1u32..1_000_000, "[A-Za-z][A-Za-z ().-]{0,23}"),
                    1..4,
                ),
            ) {
                let records: Vec<ExpenseRecord> = seeds
                    .iter()
                    .enumerate()
                    .map(|(i, (cents, name))| {
                        let amount = *cents as f64 / 100.0;
                        ExpenseRecord {
                            id: format!("Expenses||{}||{}||{}", name, amount, i + 1),
                            name: name.clone(),
                            amount,
                            sheet: "Expenses".to_string(),
                        }
                    })
                    .collect();
                let session = ExpenseSession::new(TemplateVersion::V2SplitSheets, records);

                let pdf = write_progress_pdf(&session).unwrap();
                let restored = read_progress_pdf(&pdf).unwrap();
                prop_assert_eq!(restored.expenses(), session.expenses());
                prop_assert_eq!(restored.version(), session.version());
            }
        }
    }
}
