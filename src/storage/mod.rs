//! Export sinks for collected rows.

pub mod csv;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ExportRow;

// Re-export for convenience
pub use csv::CsvExporter;

/// Destination for completed export rows.
///
/// Rows are buffered as the crawl progresses; `finish` persists the artifact
/// and returns its location. A run with zero rows still produces an
/// artifact.
#[async_trait]
pub trait ExportSink: Send {
    /// Buffer one completed row.
    fn push(&mut self, row: ExportRow);

    /// Number of rows buffered so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist the export artifact and return its location.
    async fn finish(&mut self) -> Result<String>;
}
