// Order History - Core Library
// Extraction and pagination engine plus the interactive query engine.
// The binary only adds argument parsing, logging and the Chrome session.

pub mod error;
pub mod order;
pub mod store;
pub mod selectors;
pub mod config;
pub mod browser;        // Browser capability + mock + Chrome driver
pub mod classifier;     // Standard vs Consolidated
pub mod extractor;      // Amount, date, titles, detail link
pub mod pagination;     // Page walk state machine
pub mod navigation;     // Home → sign-in → order history
pub mod query;          // Interactive commands

// Re-export commonly used types
pub use error::{BrowserError, ConfigError, Field, QueryError, ScrapeError};
pub use order::{DateRange, EntryVariant, OrderRecord};
pub use store::{ResultSetBuilder, SessionResultSet};
pub use selectors::{Selector, SelectorMap};
pub use config::ScrapeConfig;
pub use browser::{locate, locate_all, Browser, MockBrowser, MockNode, MockPage};
#[cfg(feature = "chrome")]
pub use browser::ChromeBrowser;
pub use classifier::{classify_entry, ClassifiedEntry};
pub use extractor::{parse_amount, parse_date, ExtractedDate, FieldExtractor};
pub use pagination::{
    decide, scrape_orders, ControllerState, DateDecision, PaginationController, TraversalOutcome,
};
pub use navigation::{enter_order_history, open_home};
pub use query::{parse_command, render, run_session, Command, Flow, QueryEngine, QueryResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default window length when no dates are given
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
