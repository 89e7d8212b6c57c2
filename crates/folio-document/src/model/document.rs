// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory document: an ordered page tree plus the information dictionary,
// backed by a `lopdf::Document`.

use folio_core::error::{FolioError, Result};
use folio_core::{Metadata, PageDimensions, ParseMode};
use lopdf::{Dictionary, Document as RawDocument, Object, ObjectId, Stream};
use sha2::{Digest, Sha256};
use tracing::warn;

use super::info::{self, CREATION_DATE, MOD_DATE, TEXT_KEYS};
use super::page::{Page, resolve};

/// A PDF held in memory for the duration of one operation.
///
/// Page order is document order: page number `n` is `pages()[n - 1]`.
#[derive(Debug, Clone)]
pub struct Document {
    raw: RawDocument,
    mode: ParseMode,
}

impl Document {
    // -- Construction ---------------------------------------------------------

    pub(crate) fn from_raw(raw: RawDocument, mode: ParseMode) -> Self {
        Self { raw, mode }
    }

    /// A writable document with an empty page tree, used as the accumulation
    /// target for merge, split and extract.
    pub fn new_empty() -> Self {
        Self::with_version("1.5")
    }

    /// Like [`Document::new_empty`] with an explicit PDF header version.
    pub fn with_version(version: &str) -> Self {
        let mut raw = RawDocument::with_version(version);
        let pages_id = raw.new_object_id();
        raw.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(Vec::new())),
                ("Count", Object::Integer(0)),
            ])),
        );
        let catalog_id = raw.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        raw.trailer.set("Root", Object::Reference(catalog_id));

        Self::from_raw(raw, ParseMode::Modify)
    }

    /// A writable deep copy, for "in place over a copy" edits.
    pub fn to_writable(&self) -> Self {
        Self::from_raw(self.raw.clone(), ParseMode::Modify)
    }

    // -- Inspection -----------------------------------------------------------

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// PDF header version, e.g. `"1.7"`.
    pub fn version(&self) -> &str {
        &self.raw.version
    }

    pub fn page_count(&self) -> usize {
        self.raw.get_pages().len()
    }

    /// All pages in document order.
    pub fn pages(&self) -> Vec<Page> {
        self.raw
            .get_pages()
            .into_iter()
            .map(|(number, id)| Page::read(&self.raw, number, id))
            .collect()
    }

    /// Page `number` (1-based), if it exists.
    pub fn page(&self, number: u32) -> Option<Page> {
        let id = *self.raw.get_pages().get(&number)?;
        Some(Page::read(&self.raw, number, id))
    }

    pub fn page_dimensions(&self) -> Vec<PageDimensions> {
        self.pages().iter().map(Page::dimensions).collect()
    }

    /// SHA-256 (hex) of each page's decoded content streams, in page order.
    /// Two pages with equal fingerprints draw the same content.
    pub fn page_fingerprints(&self) -> Vec<String> {
        self.page_ids()
            .into_iter()
            .map(|id| hex::encode(Sha256::digest(self.page_content(id))))
            .collect()
    }

    /// Concatenated, decoded content of one page (empty for a blank page).
    pub(crate) fn page_content(&self, page_id: ObjectId) -> Vec<u8> {
        let mut content = Vec::new();
        for stream_id in content_stream_ids(&self.raw, page_id) {
            let Ok(Object::Stream(stream)) = self.raw.get_object(stream_id) else {
                continue;
            };
            match stream.decompressed_content() {
                Ok(bytes) => content.extend_from_slice(&bytes),
                Err(_) => content.extend_from_slice(&stream.content),
            }
        }
        content
    }

    /// Page dictionary ids in document order.
    pub(crate) fn page_ids(&self) -> Vec<ObjectId> {
        self.raw.get_pages().into_values().collect()
    }

    // -- Metadata -------------------------------------------------------------

    /// An owned copy of the information dictionary.
    pub fn metadata(&self) -> Metadata {
        let Some(dict) = self.info_dictionary() else {
            return Metadata::default();
        };

        let text = |key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|value| resolve(&self.raw, value))
                .and_then(info::text_value)
        };
        let date = |key: &[u8]| text(key).and_then(|raw| info::parse_pdf_date(&raw));

        Metadata {
            title: text(TEXT_KEYS[0]),
            author: text(TEXT_KEYS[1]),
            subject: text(TEXT_KEYS[2]),
            keywords: text(TEXT_KEYS[3]),
            creator: text(TEXT_KEYS[4]),
            producer: text(TEXT_KEYS[5]),
            creation_date: date(CREATION_DATE),
            modification_date: date(MOD_DATE),
        }
    }

    /// Overwrite every field that is `Some` in `partial`; leave the rest.
    pub fn set_metadata(&mut self, partial: &Metadata) -> Result<()> {
        self.ensure_writable("set metadata")?;

        let mut updates: Vec<(&[u8], Object)> = Vec::new();
        let fields = [
            &partial.title,
            &partial.author,
            &partial.subject,
            &partial.keywords,
            &partial.creator,
            &partial.producer,
        ];
        for (key, value) in TEXT_KEYS.iter().zip(fields) {
            if let Some(value) = value {
                updates.push((*key, info::encode_text(value)));
            }
        }
        if let Some(date) = &partial.creation_date {
            updates.push((CREATION_DATE, info::encode_text(&info::format_pdf_date(date))));
        }
        if let Some(date) = &partial.modification_date {
            updates.push((MOD_DATE, info::encode_text(&info::format_pdf_date(date))));
        }

        let dict = self.info_dictionary_mut()?;
        for (key, value) in updates {
            dict.set(key, value);
        }
        Ok(())
    }

    /// Blank every text field (empty string, not absent) and drop both dates.
    pub fn remove_metadata(&mut self) -> Result<()> {
        self.set_metadata(&Metadata::cleared())?;
        let dict = self.info_dictionary_mut()?;
        dict.remove(CREATION_DATE);
        dict.remove(MOD_DATE);
        Ok(())
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        match self.raw.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.raw.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// The info dictionary, created (as an indirect object) if missing.
    fn info_dictionary_mut(&mut self) -> Result<&mut Dictionary> {
        let existing = match self.raw.trailer.get(b"Info") {
            Ok(Object::Reference(id)) if self.raw.get_dictionary(*id).is_ok() => Some(*id),
            Ok(Object::Dictionary(dict)) => {
                let dict = dict.clone();
                Some(self.raw.add_object(dict))
            }
            _ => None,
        };
        let info_id = match existing {
            Some(id) => id,
            None => self.raw.add_object(Dictionary::new()),
        };
        self.raw.trailer.set("Info", Object::Reference(info_id));

        self.raw
            .get_dictionary_mut(info_id)
            .map_err(|err| FolioError::Pdf(format!("info dictionary unavailable: {err}")))
    }

    // -- Page tree (crate internal) -------------------------------------------

    pub(crate) fn ensure_writable(&self, action: &str) -> Result<()> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(FolioError::invalid(format!(
                "cannot {action}: document was opened in {:?} mode",
                self.mode
            )))
        }
    }

    pub(crate) fn raw(&self) -> &RawDocument {
        &self.raw
    }

    pub(crate) fn raw_mut(&mut self) -> &mut RawDocument {
        &mut self.raw
    }

    /// Object id of the root `/Pages` node.
    pub(crate) fn pages_root(&self) -> Result<ObjectId> {
        let catalog = self
            .raw
            .catalog()
            .map_err(|err| FolioError::Pdf(format!("no catalog: {err}")))?;
        match catalog.get(b"Pages") {
            Ok(Object::Reference(id)) => Ok(*id),
            Ok(_) => Err(FolioError::Pdf("/Pages is not a reference".into())),
            Err(err) => Err(FolioError::Pdf(format!("no /Pages: {err}"))),
        }
    }

    /// Append an already-imported page dictionary as the last page.
    pub(crate) fn push_page(&mut self, page_id: ObjectId) -> Result<()> {
        let pages_id = self.pages_root()?;

        let pages = self
            .raw
            .get_dictionary_mut(pages_id)
            .map_err(|err| FolioError::Pdf(format!("page tree root unreadable: {err}")))?;
        if let Ok(Object::Array(kids)) = pages.get_mut(b"Kids") {
            kids.push(Object::Reference(page_id));
        } else {
            pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        }
        let count = match pages.get(b"Count") {
            Ok(Object::Integer(count)) => *count,
            _ => 0,
        };
        pages.set("Count", Object::Integer(count + 1));

        if let Ok(page) = self.raw.get_dictionary_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
        Ok(())
    }

    /// Add a page dictionary with a MediaBox and empty resources, no content.
    pub(crate) fn new_blank_page(&mut self, width: f32, height: f32) -> ObjectId {
        self.raw.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::from(width),
                    Object::from(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
        ]))
    }

    /// Add a standalone stream object and return its id.
    pub(crate) fn add_stream(&mut self, stream: Stream) -> ObjectId {
        self.raw.add_object(stream)
    }
}

/// Ids of the content streams of a page, in drawing order.
pub(crate) fn content_stream_ids(doc: &RawDocument, page_id: ObjectId) -> Vec<ObjectId> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Vec::new(),
    };

    let flatten = |items: &[Object]| -> Vec<ObjectId> {
        items
            .iter()
            .filter_map(|item| match item {
                Object::Reference(id) => Some(*id),
                _ => None,
            })
            .collect()
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => flatten(items),
            Ok(Object::Stream(_)) => vec![*id],
            Ok(_) | Err(_) => {
                warn!(?id, "page /Contents does not resolve to a stream");
                Vec::new()
            }
        },
        Object::Array(items) => flatten(items),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{document_with_pages, pdf_with_pages};
    use crate::{encode, parse};
    use chrono::DateTime;

    #[test]
    fn new_empty_has_no_pages() {
        let doc = Document::new_empty();
        assert_eq!(doc.page_count(), 0);
        assert!(doc.pages().is_empty());
        assert_eq!(doc.mode(), ParseMode::Modify);
    }

    #[test]
    fn pages_report_geometry_in_order() {
        let doc = document_with_pages(3);
        let pages = doc.pages();
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages.iter().map(|p| p.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(pages.iter().all(|p| p.width == 595.0 && p.height == 842.0));
        assert!(pages.iter().all(|p| p.rotation == 0));
    }

    #[test]
    fn fingerprints_distinguish_pages() {
        let doc = document_with_pages(3);
        let prints = doc.page_fingerprints();
        assert_eq!(prints.len(), 3);
        assert_ne!(prints[0], prints[1]);
        assert_ne!(prints[1], prints[2]);
    }

    #[test]
    fn metadata_partial_update_leaves_other_fields() {
        let mut doc = document_with_pages(1);
        doc.set_metadata(&Metadata {
            title: Some("Quarterly".into()),
            author: Some("Ops".into()),
            ..Default::default()
        })
        .unwrap();
        doc.set_metadata(&Metadata {
            title: Some("Annual".into()),
            ..Default::default()
        })
        .unwrap();

        let meta = doc.metadata();
        assert_eq!(meta.title.as_deref(), Some("Annual"));
        assert_eq!(meta.author.as_deref(), Some("Ops"));
        assert_eq!(meta.subject, None);
    }

    #[test]
    fn metadata_copy_is_detached() {
        let mut doc = document_with_pages(1);
        let mut copy = doc.metadata();
        copy.title = Some("changed".into());
        assert_eq!(doc.metadata().title, None);

        doc.set_metadata(&copy).unwrap();
        assert_eq!(doc.metadata().title.as_deref(), Some("changed"));
    }

    #[test]
    fn remove_metadata_leaves_empty_strings() {
        let mut doc = document_with_pages(1);
        doc.set_metadata(&Metadata {
            title: Some("Secret".into()),
            creation_date: DateTime::parse_from_rfc3339("2024-05-01T10:00:00+02:00").ok(),
            ..Default::default()
        })
        .unwrap();

        doc.remove_metadata().unwrap();

        let meta = doc.metadata();
        assert_eq!(meta.title.as_deref(), Some(""));
        assert_eq!(meta.author.as_deref(), Some(""));
        assert_eq!(meta.creation_date, None);
    }

    #[test]
    fn read_only_and_import_documents_refuse_writes() {
        for mode in [ParseMode::ReadOnly, ParseMode::Import] {
            let mut doc = parse(&pdf_with_pages(1), mode).unwrap();
            let err = doc
                .set_metadata(&Metadata {
                    title: Some("Blocked".into()),
                    ..Default::default()
                })
                .unwrap_err();
            assert!(matches!(err, FolioError::InvalidArgument(_)), "{mode:?}");
            assert!(doc.remove_metadata().is_err(), "{mode:?}");
            assert_eq!(doc.metadata().title, None, "{mode:?}");
        }
    }

    #[test]
    fn metadata_survives_encode_and_parse() {
        let mut doc = document_with_pages(2);
        let created = DateTime::parse_from_rfc3339("2023-11-02T08:30:00-05:00").ok();
        doc.set_metadata(&Metadata {
            title: Some("Ünïcode title".into()),
            keywords: Some("a, b".into()),
            creation_date: created,
            ..Default::default()
        })
        .unwrap();

        let bytes = encode(&doc, &Default::default()).unwrap();
        let reparsed = parse(&bytes, ParseMode::ReadOnly).unwrap();
        assert_eq!(reparsed.metadata(), doc.metadata());
        assert_eq!(reparsed.metadata().creation_date, created);
    }
}
