//! Output sinks for manuscripts.

use crate::error::{ExportError, ExportResult};
use crate::manuscript::Manuscript;
use std::io::Write;
use tracing::debug;

/// Receives a manuscript one paragraph at a time.
pub trait ManuscriptSink {
    fn paragraph(&mut self, text: &str) -> ExportResult<()>;

    /// Called once after the last paragraph.
    fn finish(&mut self) -> ExportResult<()> {
        Ok(())
    }
}

/// Feed every paragraph of `manuscript` into `sink`, then finish it.
/// Returns the number of paragraphs written.
pub fn render(manuscript: &Manuscript, sink: &mut dyn ManuscriptSink) -> ExportResult<usize> {
    let paragraphs = manuscript.paragraphs();
    for (index, text) in paragraphs.iter().enumerate() {
        sink.paragraph(text).map_err(|e| match e {
            ExportError::Rejected(reason) => ExportError::Sink { index, reason },
            other => other,
        })?;
    }
    sink.finish()?;
    debug!(paragraphs = paragraphs.len(), title = %manuscript.title, "Manuscript rendered");
    Ok(paragraphs.len())
}

/// Writes paragraphs as plain text separated by a blank line.
pub struct PlainTextSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> PlainTextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ManuscriptSink for PlainTextSink<W> {
    fn paragraph(&mut self, text: &str) -> ExportResult<()> {
        if self.written > 0 {
            self.writer.write_all(b"\n\n")?;
        }
        self.writer.write_all(text.as_bytes())?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> ExportResult<()> {
        if self.written > 0 {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
