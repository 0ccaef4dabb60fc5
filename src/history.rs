// 🗂️ Run History - append-only log of completed runs
// Append = read existing rows, add one, rewrite through a temp file and an
// atomic rename; interleaved writers can never truncate each other's rows

use crate::report::RunStats;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

// ============================================================================
// RUN SUMMARY
// ============================================================================

/// One completed run. Appended once, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(rename = "Run_ID")]
    pub run_id: String,

    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Who started the run
    #[serde(rename = "Actor")]
    pub actor: String,

    #[serde(rename = "Source_File")]
    pub source_file: String,

    /// SHA-256 of the input bytes, "unknown" when unreadable
    #[serde(rename = "Source_Digest")]
    pub source_digest: String,

    #[serde(rename = "Keys_Scanned")]
    pub keys_scanned: usize,

    #[serde(rename = "Valid_Count")]
    pub valid_count: usize,

    #[serde(rename = "Mobile_Count")]
    pub mobile_count: usize,
}

impl RunSummary {
    pub fn new(actor: &str, source_file: &str, source_digest: &str, stats: &RunStats) -> Self {
        RunSummary {
            run_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            actor: actor.to_string(),
            source_file: source_file.to_string(),
            source_digest: source_digest.to_string(),
            keys_scanned: stats.keys_scanned,
            valid_count: stats.valid_count,
            mobile_count: stats.mobile_count,
        }
    }
}

// ============================================================================
// HISTORY LOG
// ============================================================================

pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one summary. The first run creates the file. An unreadable
    /// existing log is an error, not a silent overwrite.
    pub fn append(&self, summary: &RunSummary) -> Result<()> {
        let mut entries = if self.path.exists() {
            self.read_all()?
        } else {
            Vec::new()
        };
        entries.push(summary.clone());

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp = NamedTempFile::new_in(dir)
            .context("Failed to create temp file for history log")?;

        {
            let mut wtr = csv::Writer::from_writer(tmp.as_file());
            for entry in &entries {
                wtr.serialize(entry).context("Failed to write history row")?;
            }
            wtr.flush().context("Failed to flush history log")?;
        }

        tmp.persist(&self.path)
            .map_err(|err| err.error)
            .with_context(|| format!("Failed to replace history log: {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), rows = entries.len(), "history log updated");
        Ok(())
    }

    /// All recorded runs, oldest first. Missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<RunSummary>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut rdr = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open history log: {}", self.path.display()))?;

        let mut entries = Vec::new();
        for result in rdr.deserialize() {
            let entry: RunSummary = result.context("Failed to parse history row")?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The `count` most recent runs, newest first
    pub fn recent(&self, count: usize) -> Result<Vec<RunSummary>> {
        let mut entries = self.read_all()?;
        entries.reverse();
        entries.truncate(count);
        Ok(entries)
    }
}

// ============================================================================
// TESTS
// ============================================================================
