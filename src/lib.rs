// Dialcheck - Phone Sheet Cleaning & Carrier Enrichment
// Exposes all modules for use in the CLI and tests

pub mod table;      // Sheet loading: headers + raw text cells
pub mod normalize;  // Raw cell → canonical phone key
pub mod columns;    // Phone-bearing column detection
pub mod dedup;      // Order-stable unique key collection
pub mod lookup;     // Provider client + confidence derivation
pub mod driver;     // Rate-limited sequential enrichment loop
pub mod report;     // Join results back onto the sheet
pub mod history;    // Append-only run log
pub mod config;     // Explicit per-run configuration
pub mod pipeline;   // One run, start to finish

// Re-export commonly used types
pub use table::SheetTable;
pub use normalize::{normalize, normalize_e164, KeyConvention};
pub use columns::{ColumnSelector, NoPhoneColumns, PhoneColumn};
pub use dedup::collect_unique_keys;
pub use lookup::{
    Confidence, Credentials, HttpClientConfig, HttpLookupClient,
    LineType, LookupFailure, LookupSuccess, PhoneLookup,
};
pub use driver::{
    EnrichmentDriver, EnrichmentRecord, NullProgress, ProgressSink,
    Sleeper, ThreadSleeper,
};
pub use report::{write_report_csv, ReportAssembler, RunReport, RunStats};
pub use history::{HistoryLog, RunSummary};
pub use config::{credentials_from_env, default_actor, RunConfig};
pub use pipeline::{run_enrichment, RunOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
