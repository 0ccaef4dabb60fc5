// 🚦 Enrichment Pipeline - one run, start to finish
// Load sheet → find phone columns → dedup keys → rate-limited lookups →
// report + annotated copy → best-effort history append

use crate::columns::ColumnSelector;
use crate::config::RunConfig;
use crate::dedup::collect_unique_keys;
use crate::driver::{EnrichmentDriver, ProgressSink};
use crate::history::{HistoryLog, RunSummary};
use crate::lookup::PhoneLookup;
use crate::report::{write_report_csv, ReportAssembler, RunStats};
use crate::table::SheetTable;
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// What a completed run reports back to the caller
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub stats: RunStats,

    /// Names of the phone-bearing columns that were used
    pub phone_columns: Vec<String>,

    pub summary: RunSummary,

    /// Set when the history append failed. The enrichment report is the
    /// primary deliverable; a logging failure never withholds it.
    pub history_error: Option<String>,
}

/// Run the whole pipeline against one input sheet.
///
/// The only condition that halts the run before provider calls is a sheet
/// with no phone-bearing columns; per-key failures always continue the batch.
pub fn run_enrichment(
    config: &RunConfig,
    client: &dyn PhoneLookup,
    progress: &mut dyn ProgressSink,
) -> Result<RunOutcome> {
    let table = SheetTable::load_csv(&config.input)?;

    let selector = ColumnSelector::with_keywords(config.keywords.clone());
    let phone_columns = selector.require(&table.headers)?;
    tracing::info!(
        columns = ?phone_columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "phone columns selected"
    );

    let keys = collect_unique_keys(&table, &phone_columns, config.convention);
    tracing::info!(unique_keys = keys.len(), rows = table.row_count(), "keys collected");

    let driver = EnrichmentDriver::new(config.min_interval);
    let records = driver.run(&keys, client, progress);

    let assembler = ReportAssembler::new(config.convention);
    let report = assembler.assemble(&table, &phone_columns, records);

    write_report_csv(&config.report_out, &report.records)?;
    if let Some(path) = &config.annotated_out {
        report.annotated.write_csv(path)?;
    }

    let digest = source_digest(&config.input);
    let summary = RunSummary::new(&config.actor, &table.source_file, &digest, &report.stats);
    let history_error = match HistoryLog::new(&config.history_path).append(&summary) {
        Ok(()) => None,
        Err(err) => {
            tracing::warn!("history append failed: {:#}", err);
            Some(format!("{:#}", err))
        }
    };

    Ok(RunOutcome {
        stats: report.stats,
        phone_columns: phone_columns.into_iter().map(|c| c.name).collect(),
        summary,
        history_error,
    })
}

/// SHA-256 of the input bytes, for provenance in the run history
fn source_digest(path: &Path) -> String {
    match fs::read(path) {
        Ok(bytes) => {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            format!("{:x}", hasher.finalize())
        }
        Err(_) => "unknown".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
