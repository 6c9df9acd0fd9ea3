//! CSV export writer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::ExportRow;
use crate::storage::ExportSink;

/// Buffers rows in memory and writes a single CSV document on `finish`.
pub struct CsvExporter {
    path: PathBuf,
    rows: Vec<ExportRow>,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rows: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self) -> String {
        // UTF-8 BOM so spreadsheet apps detect the encoding of Korean text.
        let mut out = String::from("\u{feff}");
        write_record(
            &mut out,
            &ExportRow::HEADER.map(str::to_string),
        );
        for row in &self.rows {
            write_record(&mut out, &row.to_record());
        }
        out
    }
}

#[async_trait]
impl ExportSink for CsvExporter {
    fn push(&mut self, row: ExportRow) {
        self.rows.push(row);
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    /// Write atomically: temp file first, then rename into place.
    async fn finish(&mut self) -> Result<String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(self.render().as_bytes()).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(self.path.display().to_string())
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_record(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(field) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
