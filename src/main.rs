use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dialcheck::{
    credentials_from_env, run_enrichment, HistoryLog, HttpClientConfig, HttpLookupClient,
    KeyConvention, ProgressSink, RunConfig,
};

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("enrich") => run_enrich(&args[2..]),
        Some("history") => run_history(&args[2..]),
        Some("--version") => {
            println!("dialcheck {}", dialcheck::VERSION);
            Ok(())
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!("dialcheck {} - phone sheet cleaning & carrier enrichment", dialcheck::VERSION);
    println!();
    println!("USAGE:");
    println!("  dialcheck enrich <input.csv> [options]");
    println!("  dialcheck history [count] [--history PATH]");
    println!();
    println!("ENRICH OPTIONS:");
    println!("  --report PATH        Enrichment report destination (default: <input>_enriched.csv)");
    println!("  --annotated PATH     Annotated copy destination (default: <input>_annotated.csv)");
    println!("  --no-annotated       Skip the annotated copy");
    println!("  --history PATH       Run-history log (default: dialcheck_history.csv)");
    println!("  --interval-ms N      Minimum pause between provider calls (default: 1100)");
    println!("  --keywords a,b,c     Phone-column header keywords (default: phone)");
    println!("  --extended-keywords  Shorthand for --keywords phone,cell,mobile");
    println!("  --bare-digits        Use bare 10/11-digit keys instead of E.164");
    println!("  --actor NAME         Identity recorded in the run history (default: $USER)");
    println!();
    println!("CREDENTIALS:");
    println!("  DIALCHECK_ACCOUNT_SID / DIALCHECK_AUTH_TOKEN environment variables");
}

// ============================================================================
// ENRICH COMMAND
// ============================================================================

/// Per-lookup console progress
struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn report(&mut self, completed: usize, total: usize) {
        println!("  [{}/{}] looked up", completed, total);
    }
}

fn run_enrich(args: &[String]) -> Result<()> {
    let mut input: Option<PathBuf> = None;
    let mut report_out: Option<PathBuf> = None;
    let mut annotated_out: Option<PathBuf> = None;
    let mut no_annotated = false;
    let mut history_path: Option<PathBuf> = None;
    let mut interval_ms: Option<u64> = None;
    let mut keywords: Option<Vec<String>> = None;
    let mut convention = KeyConvention::E164;
    let mut actor: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--report" => report_out = Some(PathBuf::from(require_value(&mut iter, arg)?)),
            "--annotated" => annotated_out = Some(PathBuf::from(require_value(&mut iter, arg)?)),
            "--no-annotated" => no_annotated = true,
            "--history" => history_path = Some(PathBuf::from(require_value(&mut iter, arg)?)),
            "--interval-ms" => {
                let value = require_value(&mut iter, arg)?;
                interval_ms = Some(
                    value
                        .parse()
                        .map_err(|_| anyhow!("--interval-ms expects a number, got: {}", value))?,
                );
            }
            "--keywords" => {
                let value = require_value(&mut iter, arg)?;
                keywords = Some(value.split(',').map(|k| k.trim().to_string()).collect());
            }
            "--extended-keywords" => {
                keywords = Some(vec![
                    "phone".to_string(),
                    "cell".to_string(),
                    "mobile".to_string(),
                ]);
            }
            "--bare-digits" => convention = KeyConvention::BareDigits,
            "--actor" => actor = Some(require_value(&mut iter, arg)?),
            other if !other.starts_with("--") && input.is_none() => {
                input = Some(PathBuf::from(other));
            }
            other => return Err(anyhow!("Unknown argument: {}", other)),
        }
    }

    let input = input.ok_or_else(|| anyhow!("Usage: dialcheck enrich <input.csv> [options]"))?;

    let mut config = RunConfig::new(input);
    if let Some(path) = report_out {
        config.report_out = path;
    }
    if let Some(path) = annotated_out {
        config.annotated_out = Some(path);
    }
    if no_annotated {
        config.annotated_out = None;
    }
    if let Some(path) = history_path {
        config.history_path = path;
    }
    if let Some(ms) = interval_ms {
        config.min_interval = Duration::from_millis(ms);
    }
    if let Some(words) = keywords {
        config.keywords = words;
    }
    config.convention = convention;
    if let Some(name) = actor {
        config.actor = name;
    }

    println!("📞 Phone Enrichment - {}", config.input.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "  Keys: {} | Interval: {}ms | Columns matching: {}",
        config.convention.name(),
        config.min_interval.as_millis(),
        config.keywords.join(", ")
    );

    let credentials = credentials_from_env()?;
    let client = HttpLookupClient::new(&credentials, HttpClientConfig::default());

    let outcome = run_enrichment(&config, &client, &mut ConsoleProgress)?;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Phone columns: {}", outcome.phone_columns.join(", "));
    println!(
        "✓ {} unique numbers | {} valid | {} mobile | {} errors",
        outcome.stats.keys_scanned,
        outcome.stats.valid_count,
        outcome.stats.mobile_count,
        outcome.stats.error_count
    );
    println!("✓ Report written: {}", config.report_out.display());
    if let Some(path) = &config.annotated_out {
        println!(
            "✓ Annotated copy: {} ({} rows flagged)",
            path.display(),
            outcome.stats.rows_flagged
        );
    }
    match &outcome.history_error {
        None => println!("✓ Run recorded: {}", config.history_path.display()),
        Some(detail) => eprintln!("⚠️  Run history not updated: {}", detail),
    }

    Ok(())
}

fn require_value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String> {
    iter.next()
        .map(|v| v.to_string())
        .ok_or_else(|| anyhow!("{} expects a value", flag))
}

// ============================================================================
// HISTORY COMMAND
// ============================================================================

fn run_history(args: &[String]) -> Result<()> {
    let mut count = 10usize;
    let mut path = PathBuf::from(dialcheck::config::DEFAULT_HISTORY_FILE);

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--history" => path = PathBuf::from(require_value(&mut iter, arg)?),
            other if !other.starts_with("--") => {
                count = other
                    .parse()
                    .map_err(|_| anyhow!("history expects a count, got: {}", other))?;
            }
            other => return Err(anyhow!("Unknown argument: {}", other)),
        }
    }

    let log = HistoryLog::new(&path);
    let entries = log.recent(count)?;

    if entries.is_empty() {
        println!("No runs recorded yet ({})", path.display());
        return Ok(());
    }

    println!("🗂️  Last {} run(s) - {}", entries.len(), path.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for entry in entries {
        println!(
            "{} | {} | {} | keys={} valid={} mobile={}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.actor,
            entry.source_file,
            entry.keys_scanned,
            entry.valid_count,
            entry.mobile_count
        );
    }

    Ok(())
}
