// ☎️ Phone Normalizer - raw cell text → canonical phone key
// Digit-stripping merges extension suffixes into the base number (accepted
// lossy behavior, see DESIGN.md)

/// Canonical-key convention for one run.
///
/// Source sheets arrive with both shapes in the wild; a single convention is
/// threaded through collection, dedup and the report join so they never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyConvention {
    /// `+` followed by country code and digits, e.g. "+15551234567" (default)
    E164,

    /// Bare 10/11-digit string, e.g. "5551234567"
    BareDigits,
}

impl KeyConvention {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            KeyConvention::E164 => "E.164",
            KeyConvention::BareDigits => "bare digits",
        }
    }
}

/// Normalize one raw cell into a canonical phone key.
///
/// Returns None for anything that cannot be read as a North-American or
/// `+`-prefixed international number: empty cells, too few/too many digits,
/// letters-only garbage. Rejects are silently dropped by callers; a dirty
/// cell never fails a run.
pub fn normalize(raw: &str, convention: KeyConvention) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    match convention {
        KeyConvention::E164 => {
            if digits.len() == 10 {
                // National number, assume NANP
                Some(format!("+1{}", digits))
            } else if digits.len() == 11 && digits.starts_with('1') {
                Some(format!("+{}", digits))
            } else if trimmed.starts_with('+') && digits.len() > 10 {
                // Already international, pass through
                Some(format!("+{}", digits))
            } else {
                None
            }
        }
        KeyConvention::BareDigits => {
            if digits.len() == 10 || digits.len() == 11 {
                Some(digits)
            } else {
                None
            }
        }
    }
}

/// Normalize with the default E.164 convention
pub fn normalize_e164(raw: &str) -> Option<String> {
    normalize(raw, KeyConvention::E164)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_digits_get_plus_one() {
        assert_eq!(
            normalize("(555) 123-4567", KeyConvention::E164),
            Some("+15551234567".to_string())
        );
        assert_eq!(
            normalize("555.123.4567", KeyConvention::E164),
            Some("+15551234567".to_string())
        );
    }

    #[test]
    fn test_eleven_digits_leading_one() {
        assert_eq!(
            normalize("15551234567", KeyConvention::E164),
            Some("+15551234567".to_string())
        );
        assert_eq!(
            normalize("1-555-123-4567", KeyConvention::E164),
            Some("+15551234567".to_string())
        );
    }

    #[test]
    fn test_international_passthrough() {
        assert_eq!(
            normalize("+44 7911 123456", KeyConvention::E164),
            Some("+447911123456".to_string())
        );
    }

    #[test]
    fn test_rejects() {
        assert_eq!(normalize("", KeyConvention::E164), None);
        assert_eq!(normalize("   ", KeyConvention::E164), None);
        assert_eq!(normalize("123", KeyConvention::E164), None);
        assert_eq!(normalize("bad", KeyConvention::E164), None);
        // 11 digits not starting with 1
        assert_eq!(normalize("25551234567", KeyConvention::E164), None);
        // 12 digits without a + prefix
        assert_eq!(normalize("155512345678", KeyConvention::E164), None);
    }

    #[test]
    fn test_idempotent_on_canonical_keys() {
        for key in ["+15551234567", "+447911123456"] {
            assert_eq!(normalize(key, KeyConvention::E164), Some(key.to_string()));
        }
    }

    #[test]
    fn test_same_number_same_key() {
        // Different renderings of one number collapse to one key
        let a = normalize("555-123-4567", KeyConvention::E164);
        let b = normalize("(555) 123 4567", KeyConvention::E164);
        let c = normalize("+1 555 123 4567", KeyConvention::E164);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_extension_suffix_discarded() {
        // Lossy by design: extensions merge into the base number
        assert_eq!(
            normalize("555-123-4567 x89", KeyConvention::E164),
            None // 12 digits, no + prefix
        );
        assert_eq!(
            normalize("555-123-4567 ext", KeyConvention::E164),
            Some("+15551234567".to_string())
        );
    }

    #[test]
    fn test_bare_digit_convention() {
        assert_eq!(
            normalize("(555) 123-4567", KeyConvention::BareDigits),
            Some("5551234567".to_string())
        );
        assert_eq!(
            normalize("1-555-123-4567", KeyConvention::BareDigits),
            Some("15551234567".to_string())
        );
        // International numbers are out of scope for the bare convention
        assert_eq!(normalize("+44 7911 123456", KeyConvention::BareDigits), None);
        assert_eq!(normalize("123", KeyConvention::BareDigits), None);
    }

    #[test]
    fn test_default_helper_uses_e164() {
        assert_eq!(normalize_e164("5551234567"), Some("+15551234567".to_string()));
    }
}
