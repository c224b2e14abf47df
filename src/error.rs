// ⚠️ Error Taxonomy - Traversal, Query, Browser and Config failures
// Traversal errors stop the page walk, query errors stop only the command

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// BROWSER CAPABILITY ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    /// No element matched the selector
    #[error("no element matches `{selector}`")]
    NotFound { selector: String },

    /// A bounded wait on a page-state condition expired
    #[error("condition not met within {0:?}")]
    TimedOut(Duration),

    /// Anything the underlying driver reports (dead tab, protocol error, ...)
    #[error("browser driver error: {0}")]
    Driver(String),
}

impl BrowserError {
    pub fn not_found(selector: impl ToString) -> Self {
        BrowserError::NotFound {
            selector: selector.to_string(),
        }
    }
}

// ============================================================================
// TRAVERSAL ERRORS
// ============================================================================

/// Which typed value the extractor was after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Amount,
    Date,
    ProductTitles,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Amount => "amount",
            Field::Date => "date",
            Field::ProductTitles => "product titles",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    /// Neither the header nor the info marker was found in the entry
    #[error("entry structure unrecognized: {0}")]
    Classification(String),

    /// A required field was missing or malformed
    #[error("failed to extract {field}: {reason}")]
    FieldExtraction { field: Field, reason: String },

    #[error("timed out after {0:?} waiting for page content")]
    TimedOut(Duration),

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl ScrapeError {
    pub fn field(field: Field, reason: impl Into<String>) -> Self {
        ScrapeError::FieldExtraction {
            field,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// QUERY ENGINE ERRORS (recovered locally, never fatal)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid input `{0}` (type `help` for commands)")]
    InvalidInput(String),

    #[error("index {index} is out of range (1..={len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("order {0} has no detail link")]
    MissingDetailLink(usize),

    #[error("could not open order: {0}")]
    Browser(#[from] BrowserError),
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
}
