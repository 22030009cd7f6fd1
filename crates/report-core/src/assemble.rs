//! Document assembly
//!
//! Concatenates independently produced PDF segments (detail pages, image
//! pages, uploaded attachment documents) into one document, in order.
//! Object ids from each segment are shifted past the destination's max id
//! so nothing collides, then the destination page tree is rebuilt with the
//! combined page list.

use crate::error::ReportError;
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;

/// Concatenate PDF segments into a single document, preserving order.
pub fn assemble_segments(segments: Vec<Vec<u8>>) -> Result<Vec<u8>, ReportError> {
    if segments.is_empty() {
        return Err(ReportError::ComposeError("No segments to assemble".into()));
    }

    if segments.len() == 1 {
        return Ok(segments.into_iter().next().unwrap());
    }

    let mut loaded = Vec::with_capacity(segments.len());
    for (index, bytes) in segments.iter().enumerate() {
        let doc = Document::load_mem(bytes).map_err(|e| {
            ReportError::ParseError(format!("Failed to load segment {}: {}", index, e))
        })?;
        loaded.push(doc);
    }

    let mut dest = loaded.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut page_refs = page_references(&dest);

    for source in loaded {
        let source_pages = page_references(&source);
        let id_offset = dest_max_id;

        // Shift every object id in the source past the destination's ids.
        let mut shifted: BTreeMap<ObjectId, Object> = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            shifted.insert(new_id, shift_object_refs(object, id_offset));
        }
        dest.objects.extend(shifted);

        for old_page in source_pages {
            page_refs.push((old_page.0 + id_offset, old_page.1));
        }

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    rebuild_page_tree(&mut dest, page_refs)?;
    dest.max_id = dest_max_id;
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| ReportError::ComposeError(format!("Failed to save assembled PDF: {}", e)))?;

    Ok(buffer)
}

/// Page object references of a document, in page order.
fn page_references(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Recursively shift object references by the id offset.
fn shift_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|o| shift_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_object_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_object_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's page tree at the combined page list.
fn rebuild_page_tree(doc: &mut Document, page_refs: Vec<ObjectId>) -> Result<(), ReportError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| ReportError::ComposeError("No Root reference in trailer".into()))?;

    let pages_id = doc
        .objects
        .get(&catalog_id)
        .ok_or_else(|| ReportError::ComposeError("Catalog not found".into()))?
        .as_dict()
        .map_err(|_| ReportError::ComposeError("Invalid catalog".into()))?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| ReportError::ComposeError("No Pages reference in catalog".into()))?;

    if let Some(Object::Dictionary(pages_dict)) = doc.objects.get_mut(&pages_id) {
        let kids: Vec<Object> = page_refs.iter().map(|&id| Object::Reference(id)).collect();
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
        Ok(())
    } else {
        Err(ReportError::ComposeError("Invalid pages dictionary".into()))
    }
}
