// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page content editing: add content streams before or after the existing
// ones and register named resources on a page.

use folio_core::error::{FolioError, Result};
use lopdf::{Dictionary, Object, ObjectId, Stream};

use crate::model::Document;
use crate::model::document::content_stream_ids;
use crate::model::page::{inherited, resolve};

/// Draw `content` after the page's existing content.
///
/// Existing content is bracketed by `q`/`Q` in two new streams so its
/// graphics state cannot leak into the overlay. The original streams are
/// referenced, never rewritten.
pub(crate) fn append_content(doc: &mut Document, page_id: ObjectId, content: &[u8]) -> Result<()> {
    let existing = content_stream_ids(doc.raw(), page_id);

    let mut contents = Vec::with_capacity(existing.len() + 2);
    let overlay = if existing.is_empty() {
        content.to_vec()
    } else {
        let save = doc.add_stream(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(save));
        contents.extend(existing.into_iter().map(Object::Reference));
        let mut restored = b"\nQ\n".to_vec();
        restored.extend_from_slice(content);
        restored
    };
    let overlay_id = doc.add_stream(Stream::new(Dictionary::new(), overlay));
    contents.push(Object::Reference(overlay_id));

    set_contents(doc, page_id, contents)
}

/// Draw `content` beneath the page's existing content.
pub(crate) fn prepend_content(doc: &mut Document, page_id: ObjectId, content: &[u8]) -> Result<()> {
    let existing = content_stream_ids(doc.raw(), page_id);

    let mut body = content.to_vec();
    body.push(b'\n');
    let underlay_id = doc.add_stream(Stream::new(Dictionary::new(), body));

    let mut contents = Vec::with_capacity(existing.len() + 1);
    contents.push(Object::Reference(underlay_id));
    contents.extend(existing.into_iter().map(Object::Reference));
    set_contents(doc, page_id, contents)
}

fn set_contents(doc: &mut Document, page_id: ObjectId, contents: Vec<Object>) -> Result<()> {
    let page = doc
        .raw_mut()
        .get_dictionary_mut(page_id)
        .map_err(|err| FolioError::Pdf(format!("page {page_id:?} unreadable: {err}")))?;
    let value = match <[Object; 1]>::try_from(contents) {
        Ok([single]) => single,
        Err(many) => Object::Array(many),
    };
    page.set("Contents", value);
    Ok(())
}

/// Add `value` to the page's `/Resources/<category>` under a fresh name
/// starting with `prefix`, and return that name.
///
/// The page gets its own copy of the effective resources so siblings that
/// shared them (directly or through the page tree) are unaffected.
pub(crate) fn register_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    prefix: &str,
    value: Object,
) -> Result<String> {
    let raw = doc.raw();
    let mut resources = match inherited(raw, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    let mut entries = match resources
        .get(category.as_bytes())
        .ok()
        .and_then(|object| resolve(raw, object))
    {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let mut counter = 1usize;
    let name = loop {
        let candidate = format!("{prefix}{counter}");
        if !entries.has(candidate.as_bytes()) {
            break candidate;
        }
        counter += 1;
    };

    entries.set(name.as_str(), value);
    resources.set(category, Object::Dictionary(entries));

    let page = doc
        .raw_mut()
        .get_dictionary_mut(page_id)
        .map_err(|err| FolioError::Pdf(format!("page {page_id:?} unreadable: {err}")))?;
    page.set("Resources", Object::Dictionary(resources));
    Ok(name)
}
