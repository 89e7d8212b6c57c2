// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise a `Document` back to bytes, applying the requested
// stream compression with `flate2` and packing objects into object streams.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use folio_core::error::{FolioError, Result};
use folio_core::{CompressionLevel, EncodeOptions, ParseMode};
use lopdf::{Document as RawDocument, Object, SaveOptions};
use tracing::{debug, instrument};

use crate::model::Document;

/// Encode `document` as a PDF byte stream.
///
/// The document itself is not modified: unreachable objects are pruned and
/// streams compressed on a private copy.
#[instrument(skip_all, fields(pages = document.page_count(), compression = ?options.compression))]
pub fn encode(document: &Document, options: &EncodeOptions) -> Result<Vec<u8>> {
    if document.mode() == ParseMode::ReadOnly {
        return Err(FolioError::invalid(
            "cannot encode a document opened in ReadOnly mode",
        ));
    }

    let mut raw = document.raw().clone();
    let pruned = raw.prune_objects();
    debug!(pruned = pruned.len(), "Unreachable objects removed");

    let mut output = Vec::new();
    let written = match options.compression {
        CompressionLevel::None => raw.save_to(&mut output),
        CompressionLevel::Fast => {
            compress_streams(&mut raw, Compression::fast(), options.auto_detect_compressed_images)?;
            raw.save_with_options(&mut output, packed(Compression::fast()))
        }
        CompressionLevel::Best => {
            compress_streams(&mut raw, Compression::best(), options.auto_detect_compressed_images)?;
            raw.save_with_options(&mut output, packed(Compression::best()))
        }
    };
    written.map_err(|err| FolioError::Pdf(format!("failed to serialise PDF: {err}")))?;

    debug!(output_bytes = output.len(), "PDF encoded");
    Ok(output)
}

/// Object streams plus a cross-reference stream. Raises the header to 1.5
/// when it is older.
fn packed(level: Compression) -> SaveOptions {
    SaveOptions::builder()
        .use_object_streams(true)
        .use_xref_streams(true)
        .compression_level(level.level())
        .build()
}

/// Bytes a `/Filter /FlateDecode` entry adds to a stream dictionary.
const FILTER_OVERHEAD: usize = 20;

/// Deflate every unfiltered stream that gets smaller for it. Streams that
/// already carry a `/Filter` are left alone. Image streams are deflated
/// regardless unless `skip_incompressible_images` is set.
fn compress_streams(raw: &mut RawDocument, level: Compression, skip_incompressible_images: bool) -> Result<()> {
    let mut compressed_count = 0usize;
    let mut kept_raw = 0usize;

    for object in raw.objects.values_mut() {
        let Object::Stream(stream) = object else {
            continue;
        };
        if !stream.allows_compression || stream.dict.has(b"Filter") || stream.content.is_empty() {
            continue;
        }

        let is_image = matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image");
        let deflated = deflate(&stream.content, level)?;
        let shrinks = deflated.len() + FILTER_OVERHEAD < stream.content.len();

        if !shrinks && (!is_image || skip_incompressible_images) {
            kept_raw += 1;
            continue;
        }

        stream.dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        stream.set_content(deflated);
        compressed_count += 1;
    }

    debug!(compressed_count, kept_raw, "Streams compressed");
    Ok(())
}

/// zlib-wrapped deflate, which is what `/FlateDecode` expects.
pub(crate) fn deflate(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
