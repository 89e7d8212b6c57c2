// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-tree operator — merge, split, extract, delete, reorder, rotate,
// reverse, and blank-page insertion.
//
// Every operation takes parsed documents and returns a new document; sources
// are never modified. Page numbers are 1-based and out-of-range numbers in a
// selection are skipped, not reported.

use std::collections::BTreeSet;

use folio_core::error::{FolioError, Result};
use folio_core::OpContext;
use lopdf::{Object, ObjectId};
use tracing::{debug, info, instrument};

use crate::model::Document;
use crate::model::page::{self, normalize_rotation};
use crate::pdf::import::PageImporter;

/// Concatenate the pages of `documents` in list order.
///
/// Progress advances once per fully appended document.
#[instrument(skip_all, fields(documents = documents.len()))]
pub fn merge(documents: &[Document], ctx: &OpContext<'_>) -> Result<Document> {
    if documents.is_empty() {
        return Err(FolioError::invalid("no documents to merge"));
    }

    let version = documents
        .iter()
        .map(Document::version)
        .max()
        .unwrap_or("1.5");
    let mut merged = Document::with_version(version);
    let mut tracker = ctx.tracker(documents.len());

    for (index, source) in documents.iter().enumerate() {
        let mut importer = PageImporter::new(source);
        for page_id in source.page_ids() {
            tracker.checkpoint()?;
            importer.append_page(&mut merged, page_id)?;
        }
        debug!(document = index + 1, pages = source.page_count(), "Document appended");
        tracker.advance();
    }

    tracker.finish();
    info!(pages = merged.page_count(), "Merge complete");
    Ok(merged)
}

/// Copy pages `start..=end`. An `end` past the last page stops at the last
/// page; a `start` below 1 starts at page 1.
#[instrument(skip(document, ctx))]
pub fn split(document: &Document, start: u32, end: u32, ctx: &OpContext<'_>) -> Result<Document> {
    let count = document.page_count() as u32;
    let start = start.max(1);
    let end = end.min(count);
    let numbers: Vec<u32> = if start <= end { (start..=end).collect() } else { Vec::new() };
    copy_pages(document, &numbers, ctx)
}

/// Copy the named pages in the order given (duplicates allowed).
#[instrument(skip(document, ctx), fields(selected = numbers.len()))]
pub fn extract_pages(document: &Document, numbers: &[u32], ctx: &OpContext<'_>) -> Result<Document> {
    copy_pages(document, numbers, ctx)
}

/// Copy every page whose number is not in `numbers`, preserving order.
#[instrument(skip(document, ctx), fields(selected = numbers.len()))]
pub fn delete_pages(
    document: &Document,
    numbers: &BTreeSet<u32>,
    ctx: &OpContext<'_>,
) -> Result<Document> {
    let count = document.page_count() as u32;
    let kept: Vec<u32> = (1..=count).filter(|n| !numbers.contains(n)).collect();
    copy_pages(document, &kept, ctx)
}

/// Rearrange pages. `order` must name every page exactly once.
#[instrument(skip(document, ctx))]
pub fn reorder_pages(document: &Document, order: &[u32], ctx: &OpContext<'_>) -> Result<Document> {
    let count = document.page_count();
    let unique: BTreeSet<u32> = order.iter().copied().collect();
    let is_permutation = order.len() == count
        && unique.len() == count
        && unique.iter().all(|&n| n >= 1 && n as usize <= count);
    if !is_permutation {
        return Err(FolioError::invalid(format!(
            "page order must list each of the {count} pages exactly once"
        )));
    }
    copy_pages(document, order, ctx)
}

/// Output pages are the input pages back to front.
#[instrument(skip_all)]
pub fn reverse_pages(document: &Document, ctx: &OpContext<'_>) -> Result<Document> {
    let count = document.page_count() as u32;
    let numbers: Vec<u32> = (1..=count).rev().collect();
    copy_pages(document, &numbers, ctx)
}

/// Turn pages clockwise by `degrees` (a multiple of 90, may be negative).
/// `numbers == None` rotates every page.
///
/// Works in place on a writable copy of `document`.
#[instrument(skip(document, numbers, ctx))]
pub fn rotate_pages(
    document: &Document,
    degrees: i32,
    numbers: Option<&BTreeSet<u32>>,
    ctx: &OpContext<'_>,
) -> Result<Document> {
    if degrees % 90 != 0 {
        return Err(FolioError::invalid(format!(
            "rotation must be a multiple of 90, got {degrees}"
        )));
    }

    let mut rotated = document.to_writable();
    let pages = rotated.raw().get_pages();
    let mut tracker = ctx.tracker(pages.len());

    for (number, page_id) in pages {
        tracker.checkpoint()?;
        if numbers.is_none_or(|set| set.contains(&number)) {
            let existing = page::rotation(rotated.raw(), page_id);
            let new_rotation = normalize_rotation(existing as i64 + degrees as i64);
            set_page_entry(&mut rotated, page_id, "Rotate", Object::Integer(new_rotation as i64))?;
            debug!(number, existing, new_rotation, "Page rotated");
        }
        tracker.advance();
    }

    tracker.finish();
    Ok(rotated)
}

/// Insert one empty `width` x `height` page so that it becomes page
/// `position`. Positions past the end append; `position <= 1` prepends.
#[instrument(skip(document, ctx))]
pub fn add_blank_page(
    document: &Document,
    position: u32,
    width: f32,
    height: f32,
    ctx: &OpContext<'_>,
) -> Result<Document> {
    if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
        return Err(FolioError::invalid(format!(
            "blank page size must be positive, got {width} x {height}"
        )));
    }

    let mut output = derived_document(document)?;
    let mut importer = PageImporter::new(document);
    let page_ids = document.page_ids();
    let mut tracker = ctx.tracker(page_ids.len() + 1);
    let mut inserted = false;

    for (index, page_id) in page_ids.into_iter().enumerate() {
        tracker.checkpoint()?;
        if !inserted && position as usize <= index + 1 {
            let blank = output.new_blank_page(width, height);
            output.push_page(blank)?;
            inserted = true;
            tracker.advance();
        }
        importer.append_page(&mut output, page_id)?;
        tracker.advance();
    }
    if !inserted {
        let blank = output.new_blank_page(width, height);
        output.push_page(blank)?;
    }

    tracker.finish();
    Ok(output)
}

/// One single-page document per in-range page number, in the order given.
#[instrument(skip(document, ctx), fields(selected = numbers.len()))]
pub fn split_to_separate_files(
    document: &Document,
    numbers: &[u32],
    ctx: &OpContext<'_>,
) -> Result<Vec<Document>> {
    let pages = document.raw().get_pages();
    let mut tracker = ctx.tracker(numbers.len());
    let mut outputs = Vec::new();

    for &number in numbers {
        tracker.checkpoint()?;
        match pages.get(&number) {
            Some(&page_id) => {
                let mut single = derived_document(document)?;
                PageImporter::new(document).append_page(&mut single, page_id)?;
                outputs.push(single);
            }
            None => debug!(number, "Skipping out-of-range page"),
        }
        tracker.advance();
    }

    tracker.finish();
    info!(files = outputs.len(), "Split into separate documents");
    Ok(outputs)
}

/// Drop every page's `/Annots` (and the form that points at them).
#[instrument(skip_all)]
pub fn remove_annotations(document: &Document, ctx: &OpContext<'_>) -> Result<Document> {
    let mut cleaned = document.to_writable();
    let page_ids = cleaned.page_ids();
    let mut tracker = ctx.tracker(page_ids.len());
    let mut removed = 0usize;

    for page_id in page_ids {
        tracker.checkpoint()?;
        if let Ok(page) = cleaned.raw_mut().get_dictionary_mut(page_id) {
            if page.remove(b"Annots").is_some() {
                removed += 1;
            }
        }
        tracker.advance();
    }

    let catalog_id = match cleaned.raw().trailer.get(b"Root") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };
    if let Some(catalog_id) = catalog_id {
        if let Ok(catalog) = cleaned.raw_mut().get_dictionary_mut(catalog_id) {
            catalog.remove(b"AcroForm");
        }
    }

    tracker.finish();
    info!(pages_with_annotations = removed, "Annotations removed");
    Ok(cleaned)
}

// -- Helpers ------------------------------------------------------------------

/// Copy the named pages of `source` (in the given order) into a new
/// document. Numbers outside `1..=page_count` are skipped.
fn copy_pages(source: &Document, numbers: &[u32], ctx: &OpContext<'_>) -> Result<Document> {
    let pages = source.raw().get_pages();
    let mut output = derived_document(source)?;
    let mut importer = PageImporter::new(source);
    let mut tracker = ctx.tracker(numbers.len());

    for &number in numbers {
        tracker.checkpoint()?;
        match pages.get(&number) {
            Some(&page_id) => {
                importer.append_page(&mut output, page_id)?;
            }
            None => debug!(number, "Skipping out-of-range page"),
        }
        tracker.advance();
    }

    tracker.finish();
    debug!(
        requested = numbers.len(),
        copied = output.page_count(),
        "Pages copied"
    );
    Ok(output)
}

/// A fresh document with the source's version and information dictionary.
fn derived_document(source: &Document) -> Result<Document> {
    let mut output = Document::with_version(source.version());
    let metadata = source.metadata();
    if metadata != Default::default() {
        output.set_metadata(&metadata)?;
    }
    Ok(output)
}

fn set_page_entry(doc: &mut Document, page_id: ObjectId, key: &str, value: Object) -> Result<()> {
    let page = doc
        .raw_mut()
        .get_dictionary_mut(page_id)
        .map_err(|err| FolioError::Pdf(format!("cannot update page {page_id:?}: {err}")))?;
    page.set(key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{document_with_inherited_attributes, document_with_pages};
    use folio_core::{CancelToken, Metadata};
    use std::sync::Mutex;

    fn ctx() -> OpContext<'static> {
        OpContext::default()
    }

    fn set(numbers: &[u32]) -> BTreeSet<u32> {
        numbers.iter().copied().collect()
    }

    #[test]
    fn merge_concatenates_in_order() {
        let docs = vec![document_with_pages(2), document_with_pages(3), document_with_pages(1)];
        let merged = merge(&docs, &ctx()).unwrap();

        assert_eq!(merged.page_count(), 6);
        let expected: Vec<String> = docs.iter().flat_map(|d| d.page_fingerprints()).collect();
        assert_eq!(merged.page_fingerprints(), expected);
    }

    #[test]
    fn merge_reports_progress_per_document() {
        let seen = Mutex::new(Vec::new());
        let sink = |p: u8| seen.lock().unwrap().push(p);
        let docs = vec![document_with_pages(1), document_with_pages(1), document_with_pages(1), document_with_pages(1)];

        merge(&docs, &OpContext::default().with_progress(&sink)).unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, vec![25, 50, 75, 100]);
    }

    #[test]
    fn merge_of_nothing_is_invalid() {
        assert!(matches!(merge(&[], &ctx()), Err(FolioError::InvalidArgument(_))));
    }

    #[test]
    fn merge_stops_when_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let docs = vec![document_with_pages(2)];
        let err = merge(&docs, &OpContext::default().with_cancel(&token)).unwrap_err();
        assert!(matches!(err, FolioError::Cancelled));
    }

    #[test]
    fn split_clamps_the_end_page() {
        let doc = document_with_pages(5);
        let part = split(&doc, 4, 99, &ctx()).unwrap();
        assert_eq!(part.page_count(), 2);
        assert_eq!(part.page_fingerprints(), doc.page_fingerprints()[3..].to_vec());
    }

    #[test]
    fn split_with_inverted_range_is_empty() {
        let doc = document_with_pages(5);
        assert_eq!(split(&doc, 4, 2, &ctx()).unwrap().page_count(), 0);
    }

    #[test]
    fn extract_keeps_the_requested_order() {
        let doc = document_with_pages(5);
        let out = extract_pages(&doc, &[5, 2, 2], &ctx()).unwrap();
        let prints = doc.page_fingerprints();
        assert_eq!(
            out.page_fingerprints(),
            vec![prints[4].clone(), prints[1].clone(), prints[1].clone()]
        );
    }

    #[test]
    fn out_of_range_numbers_are_dropped_silently() {
        let doc = document_with_pages(5);
        let out = extract_pages(&doc, &[0, 99999], &ctx()).unwrap();
        assert_eq!(out.page_count(), 0);

        let out = delete_pages(&doc, &set(&[0, 6, 99999]), &ctx()).unwrap();
        assert_eq!(out.page_count(), 5);
    }

    #[test]
    fn extract_and_delete_are_complementary() {
        let doc = document_with_pages(7);
        let selection = set(&[2, 3, 6]);
        let as_list: Vec<u32> = selection.iter().copied().collect();

        let extracted = extract_pages(&doc, &as_list, &ctx()).unwrap();
        let deleted = delete_pages(&doc, &selection, &ctx()).unwrap();
        assert_eq!(extracted.page_count() + deleted.page_count(), doc.page_count());

        let prints = doc.page_fingerprints();
        let kept: Vec<String> = [1usize, 4, 5, 7].iter().map(|n| prints[n - 1].clone()).collect();
        assert_eq!(deleted.page_fingerprints(), kept);
    }

    #[test]
    fn rotation_composes_modulo_360() {
        let doc = document_with_pages(2);
        for (d1, d2) in [(90, 90), (270, 180), (-90, 90), (450, -810), (180, 180)] {
            let twice = rotate_pages(&rotate_pages(&doc, d1, None, &ctx()).unwrap(), d2, None, &ctx()).unwrap();
            let once = rotate_pages(&doc, d1 + d2, None, &ctx()).unwrap();
            let a: Vec<i32> = twice.pages().iter().map(|p| p.rotation).collect();
            let b: Vec<i32> = once.pages().iter().map(|p| p.rotation).collect();
            assert_eq!(a, b, "{d1} then {d2}");
            assert!(a.iter().all(|r| [0, 90, 180, 270].contains(r)));
        }
    }

    #[test]
    fn rotate_only_touches_selected_pages() {
        let doc = document_with_pages(3);
        let out = rotate_pages(&doc, -90, Some(&set(&[2, 42])), &ctx()).unwrap();
        let rotations: Vec<i32> = out.pages().iter().map(|p| p.rotation).collect();
        assert_eq!(rotations, vec![0, 270, 0]);
        // The source is untouched.
        assert!(doc.pages().iter().all(|p| p.rotation == 0));
    }

    #[test]
    fn rotate_builds_on_inherited_rotation() {
        let doc = document_with_inherited_attributes(2, 90);
        let out = rotate_pages(&doc, 90, None, &ctx()).unwrap();
        assert!(out.pages().iter().all(|p| p.rotation == 180));
    }

    #[test]
    fn rotate_rejects_odd_angles() {
        let doc = document_with_pages(1);
        assert!(matches!(
            rotate_pages(&doc, 45, None, &ctx()),
            Err(FolioError::InvalidArgument(_))
        ));
    }

    #[test]
    fn reverse_is_an_involution() {
        let doc = document_with_pages(4);
        let once = reverse_pages(&doc, &ctx()).unwrap();
        let mut expected = doc.page_fingerprints();
        expected.reverse();
        assert_eq!(once.page_fingerprints(), expected);

        let twice = reverse_pages(&once, &ctx()).unwrap();
        assert_eq!(twice.page_fingerprints(), doc.page_fingerprints());
    }

    #[test]
    fn reorder_requires_a_permutation() {
        let doc = document_with_pages(3);
        let out = reorder_pages(&doc, &[3, 1, 2], &ctx()).unwrap();
        let prints = doc.page_fingerprints();
        assert_eq!(
            out.page_fingerprints(),
            vec![prints[2].clone(), prints[0].clone(), prints[1].clone()]
        );

        for bad in [&[1, 2][..], &[1, 1, 2], &[1, 2, 4], &[1, 2, 3, 3]] {
            assert!(matches!(
                reorder_pages(&doc, bad, &ctx()),
                Err(FolioError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn blank_page_past_the_end_is_appended() {
        let doc = document_with_pages(3);
        let out = add_blank_page(&doc, 10, 595.0, 842.0, &ctx()).unwrap();

        assert_eq!(out.page_count(), 4);
        let last = out.page(4).unwrap();
        assert_eq!((last.width, last.height), (595.0, 842.0));
        assert!(out.page_content(last.content_ref).is_empty());
        assert_eq!(out.page_fingerprints()[..3], doc.page_fingerprints()[..]);
    }

    #[test]
    fn blank_page_at_position_one_comes_first() {
        let doc = document_with_pages(2);
        let out = add_blank_page(&doc, 1, 300.0, 400.0, &ctx()).unwrap();

        assert_eq!(out.page_count(), 3);
        let first = out.page(1).unwrap();
        assert_eq!((first.width, first.height), (300.0, 400.0));
        assert_eq!(out.page_fingerprints()[1..], doc.page_fingerprints()[..]);
    }

    #[test]
    fn blank_page_in_the_middle() {
        let doc = document_with_pages(3);
        let out = add_blank_page(&doc, 2, 100.0, 100.0, &ctx()).unwrap();
        let widths: Vec<f32> = out.pages().iter().map(|p| p.width).collect();
        assert_eq!(widths, vec![595.0, 100.0, 595.0, 595.0]);
    }

    #[test]
    fn blank_page_needs_a_real_size() {
        let doc = document_with_pages(1);
        assert!(add_blank_page(&doc, 1, 0.0, 842.0, &ctx()).is_err());
        assert!(add_blank_page(&doc, 1, 595.0, f32::NAN, &ctx()).is_err());
    }

    #[test]
    fn split_to_files_keeps_request_order() {
        let doc = document_with_pages(10);
        let files = split_to_separate_files(&doc, &[3, 1, 7], &ctx()).unwrap();
        let prints = doc.page_fingerprints();

        assert_eq!(files.len(), 3);
        for (file, number) in files.iter().zip([3usize, 1, 7]) {
            assert_eq!(file.page_count(), 1);
            assert_eq!(file.page_fingerprints()[0], prints[number - 1]);
        }
    }

    #[test]
    fn split_to_files_skips_unknown_pages() {
        let doc = document_with_pages(2);
        let files = split_to_separate_files(&doc, &[0, 2, 3], &ctx()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn derived_documents_keep_metadata() {
        let mut doc = document_with_pages(2);
        doc.set_metadata(&Metadata {
            title: Some("Handbook".into()),
            ..Default::default()
        })
        .unwrap();
        let out = extract_pages(&doc, &[2], &ctx()).unwrap();
        assert_eq!(out.metadata().title.as_deref(), Some("Handbook"));

        let blank = add_blank_page(&doc, 1, 100.0, 100.0, &ctx()).unwrap();
        assert_eq!(blank.metadata(), doc.metadata());
        for file in split_to_separate_files(&doc, &[1, 2], &ctx()).unwrap() {
            assert_eq!(file.metadata(), doc.metadata());
        }
        let fresh = derived_document(&doc).unwrap();
        assert_eq!(fresh.page_count(), 0);
        assert_eq!(fresh.version(), doc.version());
    }

    #[test]
    fn remove_annotations_strips_annots() {
        let mut doc = document_with_pages(1);
        let page_id = doc.page_ids()[0];
        let annot = doc.raw_mut().add_object(lopdf::Dictionary::from_iter([
            ("Type", Object::Name(b"Annot".to_vec())),
            ("Subtype", Object::Name(b"Text".to_vec())),
        ]));
        doc.raw_mut()
            .get_dictionary_mut(page_id)
            .unwrap()
            .set("Annots", Object::Array(vec![Object::Reference(annot)]));

        let out = remove_annotations(&doc, &ctx()).unwrap();
        let page = out.raw().get_dictionary(out.page_ids()[0]).unwrap();
        assert!(!page.has(b"Annots"));
        assert_eq!(out.page_fingerprints(), doc.page_fingerprints());
    }
}
