// 📊 Report Assembler - join enrichment results back onto the sheet
// One record per unique key in the flat report; the annotated copy flags
// rows by their FIRST phone column only (known limitation, kept deliberately)

use crate::columns::PhoneColumn;
use crate::driver::EnrichmentRecord;
use crate::normalize::{normalize, KeyConvention};
use crate::table::SheetTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Appended column: canonical key of the row's first phone column
pub const CANONICAL_COLUMN: &str = "Canonical_Phone";

/// Appended column: "yes" when the canonical key earned High confidence
pub const MOBILE_FLAG_COLUMN: &str = "Mobile_Flag";

// ============================================================================
// RUN STATS
// ============================================================================

/// Summary counters for one completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Unique keys sent to the provider
    pub keys_scanned: usize,

    /// Keys the provider confirmed as valid numbers
    pub valid_count: usize,

    /// Valid keys classified as mobile lines
    pub mobile_count: usize,

    /// Lookups that came back as errors
    pub error_count: usize,

    /// Original rows flagged in the annotated copy
    pub rows_flagged: usize,
}

// ============================================================================
// RUN REPORT
// ============================================================================

/// Everything a run produces, before any of it touches disk
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Flat enrichment report: one row per unique key, driver order
    pub records: Vec<EnrichmentRecord>,

    /// Copy of the original table with canonical-key and flag columns appended
    pub annotated: SheetTable,

    pub stats: RunStats,
}

// ============================================================================
// REPORT ASSEMBLER
// ============================================================================

pub struct ReportAssembler {
    /// Must match the convention used during collection or the join breaks
    pub convention: KeyConvention,
}

impl ReportAssembler {
    pub fn new(convention: KeyConvention) -> Self {
        ReportAssembler { convention }
    }

    /// Join records back against the original table.
    ///
    /// A single record may correspond to many original cells (dedup collapsed
    /// them); each such row is tagged independently. Tagging reads only the
    /// first phone column of each row.
    pub fn assemble(
        &self,
        table: &SheetTable,
        phone_columns: &[PhoneColumn],
        records: Vec<EnrichmentRecord>,
    ) -> RunReport {
        let high_confidence: HashSet<&str> = records
            .iter()
            .filter(|r| r.is_high_confidence())
            .map(|r| r.phone.as_str())
            .collect();

        let first_column = phone_columns.first().map(|c| c.index);

        let mut headers = table.headers.clone();
        headers.push(CANONICAL_COLUMN.to_string());
        headers.push(MOBILE_FLAG_COLUMN.to_string());

        let mut rows_flagged = 0;
        let mut rows = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let canonical = first_column
                .and_then(|index| row.get(index))
                .and_then(|cell| normalize(cell, self.convention))
                .unwrap_or_default();

            let flagged = !canonical.is_empty() && high_confidence.contains(canonical.as_str());
            if flagged {
                rows_flagged += 1;
            }

            let flag_cell = if flagged { "yes" } else { "" };
            let mut annotated_row = row.clone();
            annotated_row.push(canonical);
            annotated_row.push(flag_cell.to_string());
            rows.push(annotated_row);
        }

        let annotated = SheetTable::new(headers, rows, table.source_file.clone());

        let stats = RunStats {
            keys_scanned: records.len(),
            valid_count: records.iter().filter(|r| r.valid).count(),
            mobile_count: records.iter().filter(|r| r.is_mobile()).count(),
            error_count: records.iter().filter(|r| r.is_error()).count(),
            rows_flagged,
        };

        RunReport {
            records,
            annotated,
            stats,
        }
    }
}

/// Write the flat enrichment report as CSV
pub fn write_report_csv(path: &Path, records: &[EnrichmentRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;

    for record in records {
        wtr.serialize(record).context("Failed to write report row")?;
    }
    wtr.flush().context("Failed to flush report file")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
