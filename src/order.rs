// 📦 Order Model - One extracted purchase record
// Values are built once during traversal and never mutated afterwards

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// ENTRY VARIANT
// ============================================================================

/// Structural layout of one listing entry, decided once by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryVariant {
    /// Typical multi-item order with a delivery box of product titles
    Standard,

    /// Single-charge order (grocery style) shown under a fixed synthetic title
    Consolidated,
}

impl EntryVariant {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            EntryVariant::Standard => "standard",
            EntryVariant::Consolidated => "consolidated",
        }
    }
}

// ============================================================================
// ORDER RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Date exactly as the page displayed it ("May 1, 2024")
    pub date_text: String,

    /// Parsed calendar date, None when the display text did not parse
    pub date: Option<NaiveDate>,

    /// Order total. Fixed-point, never negative
    pub amount: Decimal,

    /// Product titles in page order, never empty
    pub product_titles: Vec<String>,

    /// Absolute URL of the order detail page, when the entry exposes one
    pub detail_link: Option<String>,
}

impl OrderRecord {
    /// Amount as shown to the user: "$12.50"
    pub fn display_amount(&self) -> String {
        format!("${:.2}", self.amount)
    }

    /// Amount text the free-text search matches against: "12.50"
    pub fn amount_text(&self) -> String {
        format!("{:.2}", self.amount)
    }

    /// Case-insensitive substring match on date text, amount text or any title
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();

        self.date_text.to_lowercase().contains(&needle)
            || self.amount_text().contains(&needle)
            || self
                .product_titles
                .iter()
                .any(|title| title.to_lowercase().contains(&needle))
    }
}

// ============================================================================
// DATE RANGE
// ============================================================================

/// Inclusive date window. Callers guarantee `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// The default window: the last 30 days ending on `today`
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        DateRange {
            start: today - Duration::days(days),
            end: today,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Strictly older than the window
    pub fn is_before(&self, date: NaiveDate) -> bool {
        date < self.start
    }

    /// Strictly newer than the window
    pub fn is_after(&self, date: NaiveDate) -> bool {
        date > self.end
    }
}
