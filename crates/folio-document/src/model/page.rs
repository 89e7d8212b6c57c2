// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page view — geometry and rotation of a single page, resolved through the
// page tree (MediaBox, Rotate and friends may be inherited from ancestors).

use folio_core::{Orientation, PageDimensions};
use lopdf::{Document as RawDocument, Object, ObjectId};

/// Attributes a page may inherit from its `/Pages` ancestors.
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Used when a page (and every ancestor) lacks a usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Guard against cyclic `/Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 32;

/// Snapshot of one page: where it is, how big it is, and how it is turned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    /// 1-based position in the document.
    pub number: u32,
    /// Width in PDF points.
    pub width: f32,
    /// Height in PDF points.
    pub height: f32,
    /// Clockwise display rotation; always one of 0, 90, 180, 270.
    pub rotation: i32,
    /// The page dictionary inside the document this view was taken from.
    /// Only meaningful while that document is alive.
    pub content_ref: ObjectId,
    /// Lower-left corner of the MediaBox (usually the origin).
    pub(crate) origin: (f32, f32),
}

impl Page {
    pub(crate) fn read(doc: &RawDocument, number: u32, page_id: ObjectId) -> Self {
        let [x0, y0, x1, y1] = media_box(doc, page_id);
        Self {
            number,
            width: x1 - x0,
            height: y1 - y0,
            rotation: rotation(doc, page_id),
            content_ref: page_id,
            origin: (x0, y0),
        }
    }

    /// Width and height as the page is displayed (rotation applied).
    pub fn displayed_size(&self) -> (f32, f32) {
        if self.rotation % 180 == 0 {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        }
    }

    pub fn orientation(&self) -> Orientation {
        let (w, h) = self.displayed_size();
        if h >= w {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    pub fn dimensions(&self) -> PageDimensions {
        PageDimensions {
            page_number: self.number,
            width: self.width,
            height: self.height,
            orientation: self.orientation(),
        }
    }
}

/// Normalise any multiple-of-90 (or near it) into `{0, 90, 180, 270}`.
pub fn normalize_rotation(degrees: i64) -> i32 {
    let quarter_turns = (degrees as f64 / 90.0).round() as i64;
    (quarter_turns * 90).rem_euclid(360) as i32
}

/// Resolve a possibly-indirect object, one level deep.
pub(crate) fn resolve<'a>(doc: &'a RawDocument, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(crate) fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Look up `key` on the page dictionary, walking `/Parent` links upward.
pub(crate) fn inherited<'a>(
    doc: &'a RawDocument,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return resolve(doc, value);
        }
        let parent = match current.get(b"Parent") {
            Ok(Object::Reference(id)) => *id,
            _ => return None,
        };
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Effective MediaBox as `[x0, y0, x1, y1]` with `x0 < x1` and `y0 < y1`.
pub(crate) fn media_box(doc: &RawDocument, page_id: ObjectId) -> [f32; 4] {
    let parsed = inherited(doc, page_id, b"MediaBox").and_then(|object| match object {
        Object::Array(items) if items.len() == 4 => {
            let mut values = [0.0f32; 4];
            for (slot, item) in values.iter_mut().zip(items) {
                *slot = resolve(doc, item).and_then(number)?;
            }
            Some(values)
        }
        _ => None,
    });

    match parsed {
        Some([a, b, c, d]) => {
            let rect = [a.min(c), b.min(d), a.max(c), b.max(d)];
            if rect[2] - rect[0] > 0.0 && rect[3] - rect[1] > 0.0 {
                rect
            } else {
                DEFAULT_MEDIA_BOX
            }
        }
        None => DEFAULT_MEDIA_BOX,
    }
}

pub(crate) fn rotation(doc: &RawDocument, page_id: ObjectId) -> i32 {
    inherited(doc, page_id, b"Rotate")
        .and_then(number)
        .map(|deg| normalize_rotation(deg.round() as i64))
        .unwrap_or(0)
}
