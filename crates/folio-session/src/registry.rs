// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The table of tools a front end can offer, built once and shared.

use std::sync::Arc;

/// Whether a tool does real work or only reports that it is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Implemented,
    Placeholder,
}

/// Static description of one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub availability: Availability,
}

const fn tool(
    id: &'static str,
    label: &'static str,
    description: &'static str,
    availability: Availability,
) -> ToolDescriptor {
    ToolDescriptor {
        id,
        label,
        description,
        availability,
    }
}

use Availability::{Implemented, Placeholder};

const STANDARD_TOOLS: &[ToolDescriptor] = &[
    tool("merge", "Merge PDFs", "Combine several documents into one, in order", Implemented),
    tool("split", "Split by range", "Keep a contiguous range of pages", Implemented),
    tool("split_to_files", "Split into pages", "Write each selected page as its own document", Implemented),
    tool("extract_pages", "Extract pages", "Copy selected pages into a new document", Implemented),
    tool("delete_pages", "Delete pages", "Remove selected pages", Implemented),
    tool("reorder_pages", "Reorder pages", "Put pages in a new order", Implemented),
    tool("rotate", "Rotate pages", "Turn pages by quarter turns", Implemented),
    tool("reverse", "Reverse pages", "Put the last page first", Implemented),
    tool("add_blank_page", "Insert blank page", "Add an empty page at any position", Implemented),
    tool("metadata", "Edit properties", "View or change title, author and other properties", Implemented),
    tool("remove_metadata", "Strip properties", "Blank every document property", Implemented),
    tool("watermark", "Watermark", "Stamp diagonal text across every page", Implemented),
    tool("page_numbers", "Page numbers", "Number every page", Implemented),
    tool("background", "Background colour", "Fill the page behind its content", Implemented),
    tool("flatten", "Flatten annotations", "Burn ink and images into the pages", Implemented),
    tool("remove_annotations", "Remove annotations", "Drop comments, links and form fields", Implemented),
    tool("compress", "Compress", "Re-encode streams to reduce file size", Implemented),
    tool("images_to_pdf", "Images to PDF", "Make a document with one image per page", Implemented),
    tool("grayscale", "Grayscale", "Convert every page to shades of grey", Placeholder),
    tool("invert_colors", "Invert colours", "Invert the colours of every page", Placeholder),
    tool("remove_blank_pages", "Remove blank pages", "Drop pages without visible content", Placeholder),
];

/// Immutable tool table. Clone the `Arc` from [`ToolRegistry::shared`] to
/// hand it around.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    /// Every tool the engine knows about, in menu order.
    pub fn standard() -> Self {
        Self {
            tools: STANDARD_TOOLS.to_vec(),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::standard())
    }

    pub fn get(&self, id: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.id == id)
    }

    pub fn all(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Tools that do real work.
    pub fn implemented(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools
            .iter()
            .filter(|tool| tool.availability == Implemented)
    }
}
