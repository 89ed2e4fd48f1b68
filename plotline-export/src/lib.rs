//! Manuscript export for Plotline.
//!
//! The store assembles a [`Manuscript`] from a story's chain; this crate turns
//! it into paragraphs and hands them to a [`ManuscriptSink`]. Document
//! formats (DOCX and friends) live behind that trait.

mod error;
mod manuscript;
mod sink;

pub use error::{ExportError, ExportResult};
pub use manuscript::{CastEntry, Manuscript, ManuscriptStyle};
pub use sink::{render, ManuscriptSink, PlainTextSink};
