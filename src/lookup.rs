// 📡 Carrier Lookup Client - one provider call per canonical key
// A failed lookup is data, not a fault: every error path becomes a
// LookupFailure so one bad number never poisons the batch

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Sentinel for provider fields that came back absent or empty
pub const UNKNOWN_FIELD: &str = "unknown";

// ============================================================================
// LINE TYPE
// ============================================================================

/// Provider-reported classification of a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Mobile,
    Landline,
    Voip,
    Unknown,
}

impl LineType {
    /// Parse the provider's line-type string; anything unrecognized is Unknown
    pub fn parse(raw: &str) -> LineType {
        match raw.trim().to_lowercase().as_str() {
            "mobile" => LineType::Mobile,
            "landline" => LineType::Landline,
            "voip" => LineType::Voip,
            _ => LineType::Unknown,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LineType::Mobile => "mobile",
            LineType::Landline => "landline",
            LineType::Voip => "voip",
            LineType::Unknown => "unknown",
        }
    }
}

// ============================================================================
// CONFIDENCE TIER
// ============================================================================

/// How likely a number is reachable, derived from validity + line type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Derivation table:
    /// invalid → Low; valid mobile → High; valid landline/voip → Medium;
    /// valid but unclassified → Low
    pub fn derive(valid: bool, line_type: LineType) -> Confidence {
        if !valid {
            return Confidence::Low;
        }
        match line_type {
            LineType::Mobile => Confidence::High,
            LineType::Landline | LineType::Voip => Confidence::Medium,
            LineType::Unknown => Confidence::Low,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

// ============================================================================
// CREDENTIALS
// ============================================================================

/// Provider credentials, passed explicitly into each client (never ambient)
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl Credentials {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Credentials {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }

    /// HTTP Basic auth header value
    pub fn basic_auth_header(&self) -> String {
        let token = BASE64.encode(format!("{}:{}", self.account_sid, self.auth_token));
        format!("Basic {}", token)
    }
}

// ============================================================================
// LOOKUP RESULT
// ============================================================================

/// Attributes extracted from one successful provider response.
/// Missing fields are filled with the unknown sentinel, never a crash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupSuccess {
    pub phone: String,
    pub valid: bool,
    pub line_type: LineType,
    pub carrier: String,
    pub location: String,
    /// "true" / "false" / "unknown" - providers disagree on the wire type
    pub ported: String,
    /// Provider's international-format rendering, when offered
    pub international: Option<String>,
}

/// One lookup that could not produce attributes: transport error, timeout,
/// non-2xx status, or malformed body. Carries the key so the driver can emit
/// a placeholder row in the right position.
#[derive(Debug, Clone)]
pub struct LookupFailure {
    pub phone: String,
    pub detail: String,
}

impl LookupFailure {
    pub fn new(phone: impl Into<String>, detail: impl Into<String>) -> Self {
        LookupFailure {
            phone: phone.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lookup failed for {}: {}", self.phone, self.detail)
    }
}

impl std::error::Error for LookupFailure {}

pub type LookupResult = Result<LookupSuccess, LookupFailure>;

/// The seam between the pipeline and the outside world. Tests inject a
/// scripted fake; production uses HttpLookupClient.
pub trait PhoneLookup: Send + Sync {
    fn lookup(&self, phone: &str) -> LookupResult;
}

// ============================================================================
// PROVIDER WIRE FORMAT
// ============================================================================

/// Subset of the provider's JSON body we care about. Everything is optional;
/// absence maps to sentinels downstream.
#[derive(Debug, Clone, Default, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    valid: Option<bool>,

    #[serde(default)]
    country_code: Option<String>,

    /// International-format rendering of the number
    #[serde(default)]
    phone_number: Option<String>,

    #[serde(default)]
    carrier: Option<CarrierBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CarrierBlock {
    #[serde(rename = "type", default)]
    line_type: Option<String>,

    #[serde(default)]
    name: Option<String>,

    /// Some provider versions send a bool, some a string
    #[serde(default)]
    ported: Option<serde_json::Value>,
}

fn ported_label(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_lowercase(),
        _ => UNKNOWN_FIELD.to_string(),
    }
}

fn non_empty(value: Option<String>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => UNKNOWN_FIELD.to_string(),
    }
}

fn success_from_response(phone: &str, response: ProviderResponse) -> LookupSuccess {
    let carrier = response.carrier.unwrap_or_default();
    let line_type = carrier
        .line_type
        .as_deref()
        .map(LineType::parse)
        .unwrap_or(LineType::Unknown);

    LookupSuccess {
        phone: phone.to_string(),
        valid: response.valid.unwrap_or(false),
        line_type,
        carrier: non_empty(carrier.name),
        location: non_empty(response.country_code),
        ported: ported_label(carrier.ported),
        international: response.phone_number.filter(|s| !s.trim().is_empty()),
    }
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

/// Connection settings for the provider endpoint
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Lookup endpoint; the canonical key is appended as a path segment
    pub base_url: String,

    /// Country hint sent with every request
    pub country_hint: String,

    pub connect_timeout_ms: u64,

    /// Read/write timeout. Bounds a single lookup so one unresponsive call
    /// cannot stall the whole run; expiry becomes a LookupFailure.
    pub request_timeout_ms: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        HttpClientConfig {
            base_url: "https://lookups.twilio.com/v2/PhoneNumbers".to_string(),
            country_hint: "US".to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
        }
    }
}

/// Blocking provider client. One GET per canonical key, Basic auth,
/// carrier fields requested explicitly.
pub struct HttpLookupClient {
    agent: ureq::Agent,
    base_url: String,
    country_hint: String,
    auth_header: String,
}

impl HttpLookupClient {
    pub fn new(credentials: &Credentials, config: HttpClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(config.connect_timeout_ms))
            .timeout_read(Duration::from_millis(config.request_timeout_ms))
            .timeout_write(Duration::from_millis(config.request_timeout_ms))
            .build();

        HttpLookupClient {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_hint: config.country_hint,
            auth_header: credentials.basic_auth_header(),
        }
    }

    fn parse_body(phone: &str, body: &str) -> LookupResult {
        let response: ProviderResponse = serde_json::from_str(body)
            .map_err(|err| LookupFailure::new(phone, format!("malformed response body: {}", err)))?;
        Ok(success_from_response(phone, response))
    }
}

impl PhoneLookup for HttpLookupClient {
    fn lookup(&self, phone: &str) -> LookupResult {
        let url = format!("{}/{}", self.base_url, phone);
        tracing::debug!(phone, "issuing provider lookup");

        let result = self
            .agent
            .get(&url)
            .query("Type", "carrier")
            .query("CountryCode", &self.country_hint)
            .set("authorization", &self.auth_header)
            .call();

        match result {
            Ok(response) => {
                let body = response.into_string().map_err(|err| {
                    LookupFailure::new(phone, format!("unreadable response body: {}", err))
                })?;
                Self::parse_body(phone, &body)
            }
            Err(ureq::Error::Status(code, _)) => Err(LookupFailure::new(
                phone,
                format!("provider returned http status {}", code),
            )),
            Err(ureq::Error::Transport(err)) => {
                Err(LookupFailure::new(phone, format!("transport error: {}", err)))
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_type_parsing() {
        assert_eq!(LineType::parse("mobile"), LineType::Mobile);
        assert_eq!(LineType::parse(" Mobile "), LineType::Mobile);
        assert_eq!(LineType::parse("landline"), LineType::Landline);
        assert_eq!(LineType::parse("voip"), LineType::Voip);
        assert_eq!(LineType::parse("satellite"), LineType::Unknown);
        assert_eq!(LineType::parse(""), LineType::Unknown);
    }

    #[test]
    fn test_confidence_derivation_table() {
        // Invalid is Low regardless of line type
        assert_eq!(Confidence::derive(false, LineType::Mobile), Confidence::Low);
        assert_eq!(Confidence::derive(false, LineType::Landline), Confidence::Low);
        assert_eq!(Confidence::derive(false, LineType::Voip), Confidence::Low);
        assert_eq!(Confidence::derive(false, LineType::Unknown), Confidence::Low);

        // Valid splits on line type
        assert_eq!(Confidence::derive(true, LineType::Mobile), Confidence::High);
        assert_eq!(
            Confidence::derive(true, LineType::Landline),
            Confidence::Medium
        );
        assert_eq!(Confidence::derive(true, LineType::Voip), Confidence::Medium);
        assert_eq!(Confidence::derive(true, LineType::Unknown), Confidence::Low);
    }

    #[test]
    fn test_basic_auth_header() {
        let credentials = Credentials::new("sid", "token");
        // base64("sid:token")
        assert_eq!(credentials.basic_auth_header(), "Basic c2lkOnRva2Vu");
    }

    #[test]
    fn test_parse_full_body() {
        let body = r#"{
            "valid": true,
            "country_code": "US",
            "phone_number": "+15551234567",
            "carrier": {"type": "mobile", "name": "Example Wireless", "ported": true}
        }"#;

        let success = HttpLookupClient::parse_body("+15551234567", body).unwrap();
        assert!(success.valid);
        assert_eq!(success.line_type, LineType::Mobile);
        assert_eq!(success.carrier, "Example Wireless");
        assert_eq!(success.location, "US");
        assert_eq!(success.ported, "true");
        assert_eq!(success.international.as_deref(), Some("+15551234567"));
    }

    #[test]
    fn test_parse_missing_fields_map_to_sentinels() {
        let success = HttpLookupClient::parse_body("+15551234567", "{}").unwrap();
        assert!(!success.valid);
        assert_eq!(success.line_type, LineType::Unknown);
        assert_eq!(success.carrier, UNKNOWN_FIELD);
        assert_eq!(success.location, UNKNOWN_FIELD);
        assert_eq!(success.ported, UNKNOWN_FIELD);
        assert_eq!(success.international, None);
    }

    #[test]
    fn test_parse_string_ported_flag() {
        let body = r#"{"valid": true, "carrier": {"type": "landline", "ported": "False"}}"#;
        let success = HttpLookupClient::parse_body("+15551234567", body).unwrap();
        assert_eq!(success.ported, "false");
        assert_eq!(success.carrier, UNKNOWN_FIELD);
    }

    #[test]
    fn test_parse_malformed_body_is_failure() {
        let failure = HttpLookupClient::parse_body("+15551234567", "not json").unwrap_err();
        assert_eq!(failure.phone, "+15551234567");
        assert!(failure.detail.contains("malformed"));
    }
}
