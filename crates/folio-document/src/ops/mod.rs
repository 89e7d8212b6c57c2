// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-tree operations and the explicitly unimplemented placeholder transforms.

pub mod page_tree;
pub mod placeholders;

pub use page_tree::{
    add_blank_page, delete_pages, extract_pages, merge, remove_annotations, reorder_pages,
    reverse_pages, rotate_pages, split, split_to_separate_files,
};
