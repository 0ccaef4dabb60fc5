// 🔎 Column Selector - find phone-bearing columns by header keyword
// Case-insensitive substring match, original column order preserved

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PHONE COLUMN SET
// ============================================================================

/// One detected phone-bearing column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneColumn {
    /// Position in the header row
    pub index: usize,

    /// Header name as the file spells it
    pub name: String,
}

/// No header matched the keyword set. Terminal and user-visible: the run
/// stops here, before any provider call is issued.
#[derive(Debug, Clone)]
pub struct NoPhoneColumns {
    pub keywords: Vec<String>,
}

impl fmt::Display for NoPhoneColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No phone-bearing columns found (looked for headers containing: {})",
            self.keywords.join(", ")
        )
    }
}

impl std::error::Error for NoPhoneColumns {}

// ============================================================================
// COLUMN SELECTOR
// ============================================================================

pub struct ColumnSelector {
    /// Lowercase substrings that mark a header as phone-bearing
    keywords: Vec<String>,
}

impl ColumnSelector {
    /// Default keyword set: headers containing "phone"
    pub fn new() -> Self {
        ColumnSelector {
            keywords: vec!["phone".to_string()],
        }
    }

    /// Extended keyword set: also match "cell" and "mobile" headers
    pub fn extended() -> Self {
        ColumnSelector {
            keywords: vec![
                "phone".to_string(),
                "cell".to_string(),
                "mobile".to_string(),
            ],
        }
    }

    /// Custom keyword set (stored lowercase; empty entries dropped)
    pub fn with_keywords(keywords: Vec<String>) -> Self {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return ColumnSelector::new();
        }
        ColumnSelector { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// All matching columns, in original column order. May be empty.
    pub fn select(&self, headers: &[String]) -> Vec<PhoneColumn> {
        headers
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                let lower = name.to_lowercase();
                self.keywords.iter().any(|k| lower.contains(k))
            })
            .map(|(index, name)| PhoneColumn {
                index,
                name: name.clone(),
            })
            .collect()
    }

    /// Like `select`, but an empty match is the terminal no-input condition
    pub fn require(&self, headers: &[String]) -> Result<Vec<PhoneColumn>, NoPhoneColumns> {
        let columns = self.select(headers);
        if columns.is_empty() {
            return Err(NoPhoneColumns {
                keywords: self.keywords.clone(),
            });
        }
        Ok(columns)
    }
}

impl Default for ColumnSelector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
