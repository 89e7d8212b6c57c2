// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cross-document page import.
//
// A page copied into another document takes every object it transitively
// references along with it, so the destination never aliases the source.
// Objects shared between pages (fonts, images) are copied once per importer.

use std::collections::HashMap;

use folio_core::error::{FolioError, Result};
use lopdf::{Dictionary, Document as RawDocument, Object, ObjectId};
use tracing::{debug, warn};

use crate::model::Document;
use crate::model::page::{INHERITABLE_KEYS, inherited};

/// Copies pages out of one source document into any number of targets.
///
/// The id map is per target: use one importer per (source, target) pair.
pub(crate) struct PageImporter<'s> {
    source: &'s RawDocument,
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'s> PageImporter<'s> {
    pub(crate) fn new(source: &'s Document) -> Self {
        Self {
            source: source.raw(),
            copied: HashMap::new(),
        }
    }

    /// Deep-copy page `page_id` into `target` and append it as the last page.
    pub(crate) fn append_page(&mut self, target: &mut Document, page_id: ObjectId) -> Result<ObjectId> {
        let new_id = self.import_page(target.raw_mut(), page_id)?;
        target.push_page(new_id)?;
        Ok(new_id)
    }

    /// Deep-copy page `page_id` into `target` without linking it into the
    /// page tree. Inherited attributes are materialised on the copy.
    fn import_page(&mut self, target: &mut RawDocument, page_id: ObjectId) -> Result<ObjectId> {
        let page = self.source.get_dictionary(page_id).map_err(|err| {
            FolioError::Pdf(format!("cannot read page object {page_id:?}: {err}"))
        })?;

        let mut page = page.clone();
        // The caller links the copy into its new tree.
        page.remove(b"Parent");
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Some(value) = inherited(self.source, page_id, key) {
                    page.set(key, value.clone());
                }
            }
        }

        // Reserve the id first so back-references (e.g. an annotation's /P)
        // resolve to the copy.
        let new_id = target.new_object_id();
        self.copied.insert(page_id, new_id);

        let cloned = self.clone_dictionary(target, &page);
        target.objects.insert(new_id, Object::Dictionary(cloned));

        debug!(?page_id, ?new_id, "Page imported");
        Ok(new_id)
    }

    fn clone_object(&mut self, target: &mut RawDocument, object: &Object) -> Object {
        match object {
            Object::Reference(id) => match self.clone_reference(target, *id) {
                Some(new_id) => Object::Reference(new_id),
                None => Object::Null,
            },
            Object::Dictionary(dict) => Object::Dictionary(self.clone_dictionary(target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.clone_object(target, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.clone_dictionary(target, &stream.dict);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn clone_dictionary(&mut self, target: &mut RawDocument, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            copy.set(key.clone(), self.clone_object(target, value));
        }
        copy
    }

    fn clone_reference(&mut self, target: &mut RawDocument, id: ObjectId) -> Option<ObjectId> {
        if let Some(&new_id) = self.copied.get(&id) {
            return Some(new_id);
        }

        let object = match self.source.get_object(id) {
            Ok(object) => object,
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using Null");
                return None;
            }
        };

        // Links to pages that were not imported would otherwise drag the
        // whole page tree along.
        if is_page_tree_node(object) {
            debug!(?id, "Dropping reference to a page outside the import");
            return None;
        }

        let new_id = target.new_object_id();
        self.copied.insert(id, new_id);
        let cloned = self.clone_object(target, object);
        target.objects.insert(new_id, cloned);
        Some(new_id)
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type"),
            Ok(Object::Name(name)) if name == b"Page" || name == b"Pages"
        ),
        _ => false,
    }
}
