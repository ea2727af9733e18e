//! # Page Sinks
//!
//! The downstream boundary of the encoding layer. A `PageSink` receives
//! filled pages from a [`super::BufferedPageWriter`]; what happens next
//! (network transfer, disk spooling, format conversion) is the consumer's
//! business.

use eyre::Result;
use parking_lot::Mutex;
use std::sync::Arc;

use super::Page;

/// Receives completed pages. `emit` may block while handing a page to a
/// slower consumer; the writer inherits that contract transparently.
pub trait PageSink {
    fn emit(&mut self, page: Page) -> Result<()>;
}

/// In-memory sink collecting every emitted page. Clones share the same
/// backing store, so a test can keep a handle while the writer owns the
/// sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pages: Arc<Mutex<Vec<Page>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the pages emitted so far.
    pub fn collected(&self) -> Vec<Page> {
        self.pages.lock().clone()
    }

    pub fn page_count(&self) -> usize {
        self.pages.lock().len()
    }
}

impl PageSink for MemorySink {
    fn emit(&mut self, page: Page) -> Result<()> {
        self.pages.lock().push(page);
        Ok(())
    }
}
