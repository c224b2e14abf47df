// 🔬 Field Extractor - One typed value out of one rendered entry
// Amount and date are read from the classified container, titles and the
// detail link from the whole entry card.

use crate::browser::{locate, locate_all, Browser};
use crate::config::ScrapeConfig;
use crate::error::{BrowserError, Field, ScrapeError};
use crate::order::EntryVariant;
use crate::selectors::SelectorMap;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};
use url::Url;

// ============================================================================
// PURE PARSERS
// ============================================================================

/// "$1,234.56" → 1234.56. Currency symbol and thousands separators are dropped
pub fn parse_amount(text: &str) -> Result<Decimal, ScrapeError> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let cleaned = cleaned.trim();

    let amount = Decimal::from_str(cleaned)
        .map_err(|e| ScrapeError::field(Field::Amount, format!("`{}` is not a decimal: {}", text.trim(), e)))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ScrapeError::field(
            Field::Amount,
            format!("`{}` is negative", text.trim()),
        ));
    }
    Ok(amount)
}

/// Parse the displayed date with the configured format ("May 1, 2024")
pub fn parse_date(text: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), format).ok()
}

/// Raw display text plus the parsed date, if the text parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDate {
    pub text: String,
    pub date: Option<NaiveDate>,
}

// ============================================================================
// FIELD EXTRACTOR
// ============================================================================

pub struct FieldExtractor<'c> {
    selectors: &'c SelectorMap,
    date_format: &'c str,
    consolidated_title: &'c str,
    home_url: &'c str,
}

impl<'c> FieldExtractor<'c> {
    pub fn new(config: &'c ScrapeConfig) -> Self {
        FieldExtractor {
            selectors: &config.selectors,
            date_format: &config.date_format,
            consolidated_title: &config.consolidated_title,
            home_url: &config.home_url,
        }
    }

    /// Order total, from the variant's amount node inside `container`
    pub fn amount<'a, B: Browser>(
        &self,
        browser: &'a B,
        container: &B::Element<'a>,
        variant: EntryVariant,
    ) -> Result<Decimal, ScrapeError> {
        let selector = match variant {
            EntryVariant::Standard => &self.selectors.standard_amount,
            EntryVariant::Consolidated => &self.selectors.consolidated_amount,
        };

        let node = locate(browser, Some(container), selector).map_err(|e| missing(Field::Amount, e))?;
        parse_amount(&browser.text(&node)?)
    }

    /// Order date. An unparsable date is returned as `date: None`, not an error;
    /// deciding what an unknown date means is the caller's job.
    pub fn date<'a, B: Browser>(
        &self,
        browser: &'a B,
        container: &B::Element<'a>,
        variant: EntryVariant,
    ) -> Result<ExtractedDate, ScrapeError> {
        let selector = match variant {
            EntryVariant::Standard => &self.selectors.standard_date,
            EntryVariant::Consolidated => &self.selectors.consolidated_date,
        };

        let node = locate(browser, Some(container), selector).map_err(|e| missing(Field::Date, e))?;
        let text = browser.text(&node)?.trim().to_string();
        let date = parse_date(&text, self.date_format);
        if date.is_none() {
            debug!(text = %text, format = self.date_format, "date text did not parse");
        }

        Ok(ExtractedDate { text, date })
    }

    /// Product titles of the entry. Never returns an empty list
    pub fn product_titles<'a, B: Browser>(
        &self,
        browser: &'a B,
        entry: &B::Element<'a>,
        variant: EntryVariant,
    ) -> Result<Vec<String>, ScrapeError> {
        if variant == EntryVariant::Consolidated {
            return Ok(vec![self.consolidated_title.to_string()]);
        }

        let container = locate(browser, Some(entry), &self.selectors.detail_container)
            .map_err(|e| missing(Field::ProductTitles, e))?;

        let mut titles = Vec::new();
        for node in locate_all(browser, Some(&container), &self.selectors.product_title)? {
            let title = browser.text(&node)?.trim().to_string();
            if !title.is_empty() {
                titles.push(title);
            }
        }

        if titles.is_empty() {
            return Err(ScrapeError::field(Field::ProductTitles, "no product titles found"));
        }
        Ok(titles)
    }

    /// Absolute URL of the first navigable link in the entry, if any
    pub fn detail_link<'a, B: Browser>(
        &self,
        browser: &'a B,
        entry: &B::Element<'a>,
    ) -> Result<Option<String>, ScrapeError> {
        for link in locate_all(browser, Some(entry), &self.selectors.detail_link)? {
            let Some(href) = browser.attribute(&link, "href")? else {
                continue;
            };
            if !is_navigable(&href) {
                continue;
            }

            let base = browser
                .current_url()
                .unwrap_or_else(|_| self.home_url.to_string());
            return Ok(resolve_link(&base, self.home_url, &href));
        }

        Ok(None)
    }
}

fn missing(field: Field, err: BrowserError) -> ScrapeError {
    match err {
        BrowserError::NotFound { selector } => {
            ScrapeError::field(field, format!("`{}` not found", selector))
        }
        other => ScrapeError::Browser(other),
    }
}

fn is_navigable(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty() && !href.starts_with('#') && !href.to_ascii_lowercase().starts_with("javascript:")
}

/// Join a possibly relative href onto the page URL, falling back to the home URL
fn resolve_link(base: &str, home_url: &str, href: &str) -> Option<String> {
    let joined = Url::parse(base)
        .and_then(|base| base.join(href.trim()))
        .or_else(|_| Url::parse(home_url).and_then(|home| home.join(href.trim())));

    match joined {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            warn!(href = %href, error = %e, "could not resolve detail link");
            None
        }
    }
}
