//! Save-point archive read/write
//!
//! Entry layout: `state.json` first, then `progress-report.pdf`, then one
//! entry per present attachment under `attachments/<1-based-index>/`.
//! Entries are written in slot order so identical sessions produce
//! identically laid out archives.

use crate::error::SavePointError;
use shared_types::{
    AttachmentManifestEntry, AttachmentSlot, ExpenseSession, FileRef, SaveState, SlotManifest,
    SCHEMA_VERSION,
};
use std::io::{Cursor, Read, Write};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Canonical session state entry.
pub const STATE_ENTRY: &str = "state.json";

/// Rendered progress report entry.
pub const REPORT_ENTRY: &str = "progress-report.pdf";

/// Serialize the full session into a save-point archive.
///
/// `report_pdf` is the pre-rendered progress report to carry along;
/// `saved_at` is an informational date stamp recorded in `state.json`.
pub fn write_save_point(
    session: &ExpenseSession,
    report_pdf: &[u8],
    saved_at: Option<String>,
) -> Result<Vec<u8>, SavePointError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let state = manifest_state(session, saved_at);
    let state_json = serde_json::to_vec_pretty(&state)
        .map_err(|e| SavePointError::Write(e.to_string()))?;

    add_entry(&mut writer, STATE_ENTRY, &state_json, options)?;
    add_entry(&mut writer, REPORT_ENTRY, report_pdf, options)?;

    for (index, slot) in session.attachments().iter().enumerate() {
        if let Some(file) = &slot.invoice {
            add_entry(
                &mut writer,
                &attachment_path(index, "invoice", &file.name),
                &file.bytes,
                options,
            )?;
        }
        if let Some(file) = &slot.proof {
            add_entry(
                &mut writer,
                &attachment_path(index, "proof", &file.name),
                &file.bytes,
                options,
            )?;
        }
    }

    let cursor = writer
        .finish()
        .map_err(|e| SavePointError::Write(e.to_string()))?;

    tracing::info!(
        "Wrote save point with {} expense(s), {} bytes",
        session.len(),
        cursor.get_ref().len()
    );
    Ok(cursor.into_inner())
}

/// Restore a session from a save-point archive.
///
/// All-or-nothing: the session is assembled in full before being returned,
/// so a failed load never leaves a partially restored state behind.
pub fn read_save_point(bytes: &[u8]) -> Result<ExpenseSession, SavePointError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SavePointError::Archive(e.to_string()))?;

    let state_json = read_entry(&mut archive, STATE_ENTRY)?
        .ok_or_else(|| SavePointError::MissingEntry(STATE_ENTRY.to_string()))?;
    let state: SaveState = serde_json::from_slice(&state_json)
        .map_err(|e| SavePointError::InvalidState(e.to_string()))?;
    state
        .check_schema()
        .map_err(|_| SavePointError::UnsupportedSchemaVersion(state.schema_version))?;

    let mut slots = Vec::with_capacity(state.attachments.len());
    for manifest in &state.attachments {
        slots.push(AttachmentSlot {
            invoice: load_attachment(&mut archive, manifest.invoice.as_ref())?,
            proof: load_attachment(&mut archive, manifest.proof.as_ref())?,
        });
    }

    ExpenseSession::from_parts(state.template_version, state.expenses, slots)
        .map_err(|e| SavePointError::Restore(e.to_string()))
}

/// Session state with every attachment referenced by archive path.
fn manifest_state(session: &ExpenseSession, saved_at: Option<String>) -> SaveState {
    let attachments = session
        .attachments()
        .iter()
        .enumerate()
        .map(|(index, slot)| SlotManifest {
            invoice: slot.invoice.as_ref().map(|file| {
                AttachmentManifestEntry::with_path(
                    &file.name,
                    &file.mime_type,
                    attachment_path(index, "invoice", &file.name),
                )
            }),
            proof: slot.proof.as_ref().map(|file| {
                AttachmentManifestEntry::with_path(
                    &file.name,
                    &file.mime_type,
                    attachment_path(index, "proof", &file.name),
                )
            }),
        })
        .collect();

    SaveState {
        schema_version: SCHEMA_VERSION,
        template_version: session.version(),
        expenses: session.expenses().to_vec(),
        attachments,
        saved_at,
    }
}

fn attachment_path(index: usize, prefix: &str, file_name: &str) -> String {
    format!(
        "attachments/{}/{}_{}",
        index + 1,
        prefix,
        sanitize_file_name(file_name)
    )
}

/// Replace anything outside `[A-Za-z0-9_.\-() ]` with an underscore.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '.' | '-' | '(' | ')' | ' ' => c,
            _ => '_',
        })
        .collect()
}

fn add_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
    options: FileOptions,
) -> Result<(), SavePointError> {
    writer
        .start_file(name, options)
        .map_err(|e| SavePointError::Write(format!("{}: {}", name, e)))?;
    writer
        .write_all(bytes)
        .map_err(|e| SavePointError::Write(format!("{}: {}", name, e)))?;
    Ok(())
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<Vec<u8>>, SavePointError> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| SavePointError::Archive(format!("{}: {}", name, e)))?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(SavePointError::Archive(e.to_string())),
    }
}

fn load_attachment(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    entry: Option<&AttachmentManifestEntry>,
) -> Result<Option<FileRef>, SavePointError> {
    let Some(entry) = entry else {
        return Ok(None);
    };
    let path = entry.path.as_ref().ok_or_else(|| {
        SavePointError::InvalidState(format!("Attachment \"{}\" has no archive path", entry.name))
    })?;
    let bytes = read_entry(archive, path)?
        .ok_or_else(|| SavePointError::MissingEntry(path.clone()))?;
    Ok(Some(FileRef::new(&entry.name, &entry.mime_type, bytes)))
}
