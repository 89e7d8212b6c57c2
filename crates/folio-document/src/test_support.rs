// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixture PDFs built directly with lopdf for unit tests.

use folio_core::ParseMode;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as RawDocument, Object, SaveOptions, Stream};

use crate::model::Document;
use crate::pdf::reader::parse;

/// Serialised A4 PDF with `count` pages. Page `n` shows the text "Page n";
/// every page shares one Helvetica font through one Resources dictionary.
pub(crate) fn pdf_with_pages(count: usize) -> Vec<u8> {
    let sizes = vec![(595.0, 842.0); count];
    save(build(&sizes, None))
}

/// Like [`pdf_with_pages`], but written the way modern producers do: flate
/// content streams, object streams and a cross-reference stream.
pub(crate) fn packed_pdf_with_pages(count: usize) -> Vec<u8> {
    let mut raw = build(&vec![(595.0, 842.0); count], None);
    raw.compress();
    let options = SaveOptions::builder()
        .use_object_streams(true)
        .use_xref_streams(true)
        .compression_level(1)
        .build();
    let mut bytes = Vec::new();
    raw.save_with_options(&mut bytes, options).expect("fixture saves");
    bytes
}

/// [`pdf_with_pages`] parsed in `Modify` mode.
pub(crate) fn document_with_pages(count: usize) -> Document {
    reparse(build(&vec![(595.0, 842.0); count], None))
}

/// Pages of the given sizes, otherwise like [`document_with_pages`].
pub(crate) fn document_with_sizes(sizes: &[(f32, f32)]) -> Document {
    reparse(build(sizes, None))
}

/// Letter-sized pages whose MediaBox, Resources and Rotate live only on the
/// Pages root and have to be inherited.
pub(crate) fn document_with_inherited_attributes(count: usize, rotate: i64) -> Document {
    reparse(build(&vec![(612.0, 792.0); count], Some(rotate)))
}

fn reparse(raw: RawDocument) -> Document {
    parse(&save(raw), ParseMode::Modify).expect("fixture parses")
}

fn save(mut raw: RawDocument) -> Vec<u8> {
    let mut bytes = Vec::new();
    raw.save_to(&mut bytes).expect("fixture saves");
    bytes
}

fn build(sizes: &[(f32, f32)], inherited_rotation: Option<i64>) -> RawDocument {
    let mut doc = RawDocument::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
    )]));

    let mut kids = Vec::new();
    for (index, &(width, height)) in sizes.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Page {}", index + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().expect("fixture content encodes"),
        ));

        let mut page = Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        if inherited_rotation.is_none() {
            page.set(
                "MediaBox",
                vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            );
            page.set("Resources", Object::Reference(resources_id));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(sizes.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    if let Some(rotate) = inherited_rotation {
        let (width, height) = sizes.first().copied().unwrap_or((612.0, 792.0));
        pages.set(
            "MediaBox",
            vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
        );
        pages.set("Resources", Object::Reference(resources_id));
        pages.set("Rotate", Object::Integer(rotate));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}
