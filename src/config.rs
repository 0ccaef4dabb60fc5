// ⚙️ Run Configuration - explicit settings for one enrichment run
// Credentials and knobs are threaded through the pipeline as values;
// nothing reads ambient state once a run has started

use crate::lookup::Credentials;
use crate::normalize::KeyConvention;
use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ACCOUNT_SID_VAR: &str = "DIALCHECK_ACCOUNT_SID";
pub const AUTH_TOKEN_VAR: &str = "DIALCHECK_AUTH_TOKEN";

/// Provider-friendly default: just under one call per second
pub const DEFAULT_INTERVAL_MS: u64 = 1_100;

pub const DEFAULT_HISTORY_FILE: &str = "dialcheck_history.csv";

/// Everything one run needs, resolved before the pipeline starts
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Input sheet (CSV)
    pub input: PathBuf,

    /// Flat enrichment report destination
    pub report_out: PathBuf,

    /// Annotated copy destination; None skips the annotated output
    pub annotated_out: Option<PathBuf>,

    /// Append-only run history location
    pub history_path: PathBuf,

    /// Identity recorded in the run history
    pub actor: String,

    /// Header keywords marking phone-bearing columns
    pub keywords: Vec<String>,

    pub convention: KeyConvention,

    /// Minimum pause between provider calls
    pub min_interval: Duration,
}

impl RunConfig {
    /// Defaults derived from the input filename:
    /// `contacts.csv` → `contacts_enriched.csv` + `contacts_annotated.csv`
    pub fn new(input: PathBuf) -> Self {
        let report_out = sibling_with_suffix(&input, "_enriched");
        let annotated_out = Some(sibling_with_suffix(&input, "_annotated"));

        RunConfig {
            input,
            report_out,
            annotated_out,
            history_path: PathBuf::from(DEFAULT_HISTORY_FILE),
            actor: default_actor(),
            keywords: vec!["phone".to_string()],
            convention: KeyConvention::E164,
            min_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
        }
    }
}

fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}{}.csv", stem, suffix))
}

/// Actor identity for the run history: $USER, or "unknown"
pub fn default_actor() -> String {
    env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

/// Provider credentials from the environment
pub fn credentials_from_env() -> Result<Credentials> {
    let account_sid = env::var(ACCOUNT_SID_VAR)
        .map_err(|_| anyhow!("{} is not set (provider account SID)", ACCOUNT_SID_VAR))?;
    let auth_token = env::var(AUTH_TOKEN_VAR)
        .map_err(|_| anyhow!("{} is not set (provider auth token)", AUTH_TOKEN_VAR))?;
    Ok(Credentials::new(account_sid, auth_token))
}

// ============================================================================
// TESTS
// ============================================================================
