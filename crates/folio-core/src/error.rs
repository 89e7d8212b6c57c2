// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Input errors --
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Processing errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },

    #[error("operation cancelled")]
    Cancelled,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    /// Shorthand for building an [`FolioError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Short, user-facing description of an error, suitable for a message box.
///
/// The full error text (via `Display`) is still what gets logged; this only
/// picks wording the user can act on.
pub fn describe(err: &FolioError) -> String {
    match err {
        FolioError::Parse(_) => {
            "This file could not be opened as a PDF. It may be damaged or password protected."
                .into()
        }
        FolioError::InvalidArgument(detail) => format!("Please check your input: {detail}"),
        FolioError::Pdf(_) => "The PDF could not be processed. Try a different file.".into(),
        FolioError::Image(_) => {
            "The image could not be read. Try saving it as PNG or JPEG first.".into()
        }
        FolioError::NotImplemented { operation } => {
            format!("\"{operation}\" is not available yet.")
        }
        FolioError::Cancelled => "The operation was cancelled.".into(),
        FolioError::Io(io) => format!("The file could not be read or written ({io})."),
        FolioError::Serialization(_) => "Saved settings could not be read.".into(),
    }
}
