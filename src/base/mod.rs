//! Foundation types for the vellum toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`DocumentId`], [`DocumentPath`] - Document identity
//! - [`TextRange`], [`TextSize`] - Source positions
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//!
//! This module has NO dependencies on other vellum modules.

mod document_id;
mod span;

pub use document_id::{DocumentId, DocumentPath};
pub use span::{LineCol, LineColRange, LineIndex, TextRange, TextSize, range_at, shift_range};

// Re-export text-size types for convenience
pub use text_size;
