// ⏱️ Rate-Limited Enrichment Driver - strict sequential lookups
// Fixed-delay throttle, not a token bucket: the provider enforces a hard
// per-second cap and runs are tens to low thousands of keys

use crate::lookup::{Confidence, LineType, LookupFailure, LookupSuccess, PhoneLookup, UNKNOWN_FIELD};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// INJECTABLE SEAMS
// ============================================================================

/// Sleep seam so tests run without wall-clock delay
pub trait Sleeper {
    fn pause(&self, interval: Duration);
}

/// Production sleeper: blocks the calling thread
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn pause(&self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// Incremental progress receiver, called after every key
pub trait ProgressSink {
    fn report(&mut self, completed: usize, total: usize);
}

/// Progress sink that discards everything
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _completed: usize, _total: usize) {}
}

// ============================================================================
// ENRICHMENT RECORD
// ============================================================================

/// One row of the enrichment report: a canonical key plus everything the
/// provider said about it. Failed lookups become error rows in the same
/// position, so the output always has one record per input key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    #[serde(rename = "Phone")]
    pub phone: String,

    #[serde(rename = "Valid")]
    pub valid: bool,

    #[serde(rename = "Line_Type")]
    pub line_type: LineType,

    #[serde(rename = "Carrier")]
    pub carrier: String,

    #[serde(rename = "Location")]
    pub location: String,

    #[serde(rename = "Ported")]
    pub ported: String,

    #[serde(rename = "International")]
    pub international: String,

    #[serde(rename = "Confidence")]
    pub confidence: Confidence,

    #[serde(rename = "Status")]
    pub status: String,

    #[serde(rename = "Error")]
    pub error: String,
}

pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";

impl EnrichmentRecord {
    pub fn from_success(success: LookupSuccess) -> Self {
        let confidence = Confidence::derive(success.valid, success.line_type);
        EnrichmentRecord {
            phone: success.phone,
            valid: success.valid,
            line_type: success.line_type,
            carrier: success.carrier,
            location: success.location,
            ported: success.ported,
            international: success.international.unwrap_or_default(),
            confidence,
            status: STATUS_OK.to_string(),
            error: String::new(),
        }
    }

    /// Placeholder row for a failed lookup
    pub fn from_failure(failure: LookupFailure) -> Self {
        EnrichmentRecord {
            phone: failure.phone,
            valid: false,
            line_type: LineType::Unknown,
            carrier: UNKNOWN_FIELD.to_string(),
            location: UNKNOWN_FIELD.to_string(),
            ported: UNKNOWN_FIELD.to_string(),
            international: String::new(),
            confidence: Confidence::Low,
            status: STATUS_ERROR.to_string(),
            error: failure.detail,
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.valid && self.line_type == LineType::Mobile
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence == Confidence::High
    }

    pub fn is_error(&self) -> bool {
        self.status == STATUS_ERROR
    }
}

// ============================================================================
// DRIVER
// ============================================================================

pub struct EnrichmentDriver {
    /// Minimum pause between consecutive provider calls
    pub min_interval: Duration,

    sleeper: Box<dyn Sleeper>,
}

impl EnrichmentDriver {
    pub fn new(min_interval: Duration) -> Self {
        EnrichmentDriver {
            min_interval,
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Driver with an injected sleeper (tests use a recording no-op)
    pub fn with_sleeper(min_interval: Duration, sleeper: Box<dyn Sleeper>) -> Self {
        EnrichmentDriver {
            min_interval,
            sleeper,
        }
    }

    /// Look up every key in order, one record per key, never dropping one.
    ///
    /// Pauses at least `min_interval` between consecutive calls; no pause
    /// after the last, so N keys cost at least (N-1) intervals of wall clock.
    /// Progress is reported after each key.
    pub fn run(
        &self,
        keys: &[String],
        client: &dyn PhoneLookup,
        progress: &mut dyn ProgressSink,
    ) -> Vec<EnrichmentRecord> {
        let total = keys.len();
        let mut records = Vec::with_capacity(total);

        for (index, key) in keys.iter().enumerate() {
            let record = match client.lookup(key) {
                Ok(success) => EnrichmentRecord::from_success(success),
                Err(failure) => {
                    tracing::warn!(phone = %failure.phone, "lookup failed: {}", failure.detail);
                    EnrichmentRecord::from_failure(failure)
                }
            };
            records.push(record);
            progress.report(index + 1, total);

            if index + 1 < total {
                self.sleeper.pause(self.min_interval);
            }
        }

        records
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupResult;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Scripted lookup: keys not in the script fail
    struct ScriptedLookup {
        responses: HashMap<String, LookupSuccess>,
    }

    impl ScriptedLookup {
        fn new(responses: Vec<LookupSuccess>) -> Self {
            ScriptedLookup {
                responses: responses.into_iter().map(|s| (s.phone.clone(), s)).collect(),
            }
        }
    }

    impl PhoneLookup for ScriptedLookup {
        fn lookup(&self, phone: &str) -> LookupResult {
            match self.responses.get(phone) {
                Some(success) => Ok(success.clone()),
                None => Err(LookupFailure::new(phone, "scripted failure")),
            }
        }
    }

    struct RecordingSleeper {
        pauses: Rc<RefCell<Vec<Duration>>>,
    }

    impl Sleeper for RecordingSleeper {
        fn pause(&self, interval: Duration) {
            self.pauses.borrow_mut().push(interval);
        }
    }

    struct RecordingProgress {
        seen: Vec<(usize, usize)>,
    }

    impl ProgressSink for RecordingProgress {
        fn report(&mut self, completed: usize, total: usize) {
            self.seen.push((completed, total));
        }
    }

    fn mobile_success(phone: &str) -> LookupSuccess {
        LookupSuccess {
            phone: phone.to_string(),
            valid: true,
            line_type: LineType::Mobile,
            carrier: "Example Wireless".to_string(),
            location: "US".to_string(),
            ported: "false".to_string(),
            international: Some(phone.to_string()),
        }
    }

    fn keys(phones: &[&str]) -> Vec<String> {
        phones.iter().map(|p| p.to_string()).collect()
    }

    fn zero_delay_driver(pauses: Rc<RefCell<Vec<Duration>>>, interval_ms: u64) -> EnrichmentDriver {
        EnrichmentDriver::with_sleeper(
            Duration::from_millis(interval_ms),
            Box::new(RecordingSleeper { pauses }),
        )
    }

    #[test]
    fn test_output_preserves_length_and_order_including_failures() {
        let client = ScriptedLookup::new(vec![
            mobile_success("+15551110001"),
            mobile_success("+15551110003"),
        ]);
        let pauses = Rc::new(RefCell::new(Vec::new()));
        let driver = zero_delay_driver(pauses, 100);

        let input = keys(&["+15551110001", "+15551110002", "+15551110003"]);
        let records = driver.run(&input, &client, &mut NullProgress);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].phone, "+15551110001");
        assert_eq!(records[0].status, STATUS_OK);
        // Failed key keeps its slot as an error placeholder
        assert_eq!(records[1].phone, "+15551110002");
        assert!(records[1].is_error());
        assert_eq!(records[1].confidence, Confidence::Low);
        assert_eq!(records[2].phone, "+15551110003");
    }

    #[test]
    fn test_pause_between_calls_but_not_after_last() {
        let client = ScriptedLookup::new(vec![]);
        let pauses = Rc::new(RefCell::new(Vec::new()));
        let driver = zero_delay_driver(pauses.clone(), 250);

        driver.run(&keys(&["+1", "+2", "+3", "+4"]), &client, &mut NullProgress);

        // N keys, N-1 pauses, each at least the configured interval
        let recorded = pauses.borrow();
        assert_eq!(recorded.len(), 3);
        let total: Duration = recorded.iter().sum();
        assert!(total >= Duration::from_millis(3 * 250));
    }

    #[test]
    fn test_no_pause_for_single_key() {
        let client = ScriptedLookup::new(vec![mobile_success("+15551110001")]);
        let pauses = Rc::new(RefCell::new(Vec::new()));
        let driver = zero_delay_driver(pauses.clone(), 250);

        driver.run(&keys(&["+15551110001"]), &client, &mut NullProgress);
        assert!(pauses.borrow().is_empty());
    }

    #[test]
    fn test_progress_reported_after_each_key() {
        let client = ScriptedLookup::new(vec![]);
        let pauses = Rc::new(RefCell::new(Vec::new()));
        let driver = zero_delay_driver(pauses, 0);
        let mut progress = RecordingProgress { seen: Vec::new() };

        driver.run(&keys(&["+1", "+2", "+3"]), &client, &mut progress);
        assert_eq!(progress.seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_empty_key_sequence() {
        let client = ScriptedLookup::new(vec![]);
        let pauses = Rc::new(RefCell::new(Vec::new()));
        let driver = zero_delay_driver(pauses.clone(), 100);

        let records = driver.run(&[], &client, &mut NullProgress);
        assert!(records.is_empty());
        assert!(pauses.borrow().is_empty());
    }

    #[test]
    fn test_failure_row_carries_error_detail() {
        let record = EnrichmentRecord::from_failure(LookupFailure::new(
            "+15551234567",
            "provider returned http status 503",
        ));

        assert_eq!(record.phone, "+15551234567");
        assert!(!record.valid);
        assert_eq!(record.line_type, LineType::Unknown);
        assert_eq!(record.carrier, UNKNOWN_FIELD);
        assert!(record.error.contains("503"));
    }
}
