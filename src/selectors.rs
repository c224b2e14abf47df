// 🎯 Selectors - Structural markers of the order-history markup
// Update the defaults here (or override them in the config file) when the
// storefront changes its HTML.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SELECTOR
// ============================================================================

/// A CSS selector, validated with `scraper` when it is parsed.
///
/// The source text is kept verbatim: a live driver hands it to the page's
/// own `querySelector`, the mock compiles it with `scraper` on use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    css: String,
}

impl Selector {
    pub fn css(&self) -> &str {
        &self.css
    }

    /// Compiled form for matching against a parsed document
    pub fn compile(&self) -> Result<scraper::Selector, ConfigError> {
        scraper::Selector::parse(&self.css)
            .map_err(|err| ConfigError::InvalidSelector(format!("{} ({})", self.css, err)))
    }

    /// Built-in default; every literal is checked by the selector map tests
    fn builtin(css: &str) -> Self {
        Selector {
            css: css.to_string(),
        }
    }
}

impl FromStr for Selector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selector = Selector {
            css: s.trim().to_string(),
        };
        if selector.css.is_empty() {
            return Err(ConfigError::InvalidSelector(s.to_string()));
        }

        selector.compile()?;
        Ok(selector)
    }
}

impl TryFrom<String> for Selector {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.css
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css)
    }
}

// ============================================================================
// SELECTOR MAP
// ============================================================================

/// Every structural marker the classifier, extractor and controller look for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorMap {
    /// One rendered order listing item
    pub order_card: Selector,

    /// Header container, probed first inside a card
    pub header: Selector,

    /// Info container, the fallback probe
    pub info: Selector,

    /// Class on the chosen container that flags a consolidated order
    pub consolidated_marker: String,

    pub standard_amount: Selector,
    pub consolidated_amount: Selector,
    pub standard_date: Selector,
    pub consolidated_date: Selector,

    /// Container holding the product titles of a standard order
    pub detail_container: Selector,
    pub product_title: Selector,

    /// First element of this kind inside the card supplies the detail link
    pub detail_link: Selector,

    /// Next-page control. Absent on the last page
    pub next_page: Selector,

    /// Present once an order-history page has rendered
    pub content_marker: Selector,

    /// Sign-in entry on the storefront home page
    pub account_link: Selector,

    /// Only rendered for a signed-in user
    pub orders_link: Selector,
}

impl Default for SelectorMap {
    fn default() -> Self {
        SelectorMap {
            order_card: Selector::builtin(".order-card"),
            header: Selector::builtin(".order-header"),
            info: Selector::builtin(".order-info"),
            consolidated_marker: "order-info".to_string(),
            standard_amount: Selector::builtin(".a-span2 .a-size-base.a-color-secondary"),
            consolidated_amount: Selector::builtin(".yohtmlc-order-total .a-color-secondary.value"),
            standard_date: Selector::builtin(".a-span3 .a-size-base.a-color-secondary"),
            consolidated_date: Selector::builtin(".a-column.a-span3 .a-color-secondary.value"),
            detail_container: Selector::builtin(".delivery-box"),
            product_title: Selector::builtin(".yohtmlc-product-title"),
            detail_link: Selector::builtin("a"),
            next_page: Selector::builtin(".a-last a"),
            content_marker: Selector::builtin(".your-orders-content-container"),
            account_link: Selector::builtin("#nav-link-accountList"),
            orders_link: Selector::builtin("#nav-orders"),
        }
    }
}
