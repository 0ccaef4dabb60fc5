// 📄 Sheet Loader - tabular files as headers + raw text cells
// Every cell stays a string; the normalizer decides later what is a phone

use anyhow::{Context, Result};
use std::path::Path;

/// A loaded tabular file. Headers keep their original casing and order.
/// Rows are padded (or truncated) to header width so column indexing is safe
/// even when the source file has ragged lines.
#[derive(Debug, Clone)]
pub struct SheetTable {
    /// Column names, exactly as the file claims them
    pub headers: Vec<String>,

    /// Cell values, row-major, one Vec per data row
    pub rows: Vec<Vec<String>>,

    /// Original filename (for provenance in reports and the run history)
    pub source_file: String,
}

impl SheetTable {
    /// Create a table, forcing every row to header width
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<String>>, source_file: String) -> Self {
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
        SheetTable {
            headers,
            rows,
            source_file,
        }
    }

    /// Load a CSV file into a table
    pub fn load_csv(path: &Path) -> Result<SheetTable> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header row")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(SheetTable::new(headers, rows, source_file))
    }

    /// Write the table back out as CSV
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;

        wtr.write_record(&self.headers)
            .context("Failed to write CSV header row")?;
        for row in &self.rows {
            wtr.write_record(row).context("Failed to write CSV row")?;
        }
        wtr.flush().context("Failed to flush CSV output")?;

        Ok(())
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All values of one column, in row order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(move |row| row.get(index).map(|c| c.as_str()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
