// 📄 Pagination Controller - Walk the newest-first listing page by page
// Scanning → AdvancingPage → Scanning | Exhausted | StoppedByDateBound |
// AbortedOnEntryFailure. Every terminal state keeps what was collected.

use crate::browser::{locate, locate_all, Browser};
use crate::classifier::classify_entry;
use crate::config::ScrapeConfig;
use crate::error::{BrowserError, Field, ScrapeError};
use crate::extractor::FieldExtractor;
use crate::order::{DateRange, OrderRecord};
use crate::store::{ResultSetBuilder, SessionResultSet};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

// ============================================================================
// STATES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerState {
    /// Processing the entries of the current page
    Scanning,

    /// Requesting the next page
    AdvancingPage,

    /// Empty page, no next-page control, or the next page never rendered
    Exhausted,

    /// An entry older than the window was reached
    StoppedByDateBound { date: NaiveDate },

    /// An entry could not be classified or extracted (1-based positions)
    AbortedOnEntryFailure {
        page: usize,
        entry: usize,
        error: ScrapeError,
    },
}

impl ControllerState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ControllerState::Scanning | ControllerState::AdvancingPage)
    }

    /// True when the walk ended before reaching the end of the window
    pub fn stopped_early(&self) -> bool {
        matches!(self, ControllerState::AbortedOnEntryFailure { .. })
    }
}

// ============================================================================
// STOP RULE
// ============================================================================

/// What the date window says about one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateDecision {
    /// Inside [start, end]: record it
    Keep,

    /// Newer than `end`: not in range yet, keep walking
    SkipNewer,

    /// Older than `start`: everything after it is older too
    Stop,
}

pub fn decide(range: &DateRange, date: NaiveDate) -> DateDecision {
    if range.is_before(date) {
        DateDecision::Stop
    } else if range.is_after(date) {
        DateDecision::SkipNewer
    } else {
        DateDecision::Keep
    }
}

enum EntryOutcome {
    Keep(OrderRecord),
    SkipNewer,
    Stop(NaiveDate),
}

// ============================================================================
// TRAVERSAL RESULT
// ============================================================================

#[derive(Debug, Clone)]
pub struct TraversalOutcome {
    /// Frozen, newest first
    pub records: SessionResultSet,

    /// Terminal state the controller ended in
    pub state: ControllerState,

    pub pages_visited: usize,
}

// ============================================================================
// CONTROLLER
// ============================================================================

pub struct PaginationController<'b, B: Browser> {
    browser: &'b B,
    config: &'b ScrapeConfig,
    extractor: FieldExtractor<'b>,
    range: DateRange,
    state: ControllerState,
    records: ResultSetBuilder,
    page: usize,
}

impl<'b, B: Browser> PaginationController<'b, B> {
    /// Starts in `Scanning` on whatever order-history page the browser shows
    pub fn new(browser: &'b B, config: &'b ScrapeConfig, range: DateRange) -> Self {
        PaginationController {
            browser,
            config,
            extractor: FieldExtractor::new(config),
            range,
            state: ControllerState::Scanning,
            records: ResultSetBuilder::new(),
            page: 1,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Drive the state machine to a terminal state
    pub fn run(mut self) -> TraversalOutcome {
        info!(start = %self.range.start, end = %self.range.end, "scraping orders");
        let mut pages_visited = 0;

        while !self.state.is_terminal() {
            self.state = if matches!(self.state, ControllerState::Scanning) {
                pages_visited += 1;
                self.scan_page()
            } else {
                self.advance_page()
            };
        }

        match &self.state {
            ControllerState::AbortedOnEntryFailure { page, entry, error } => {
                warn!(page, entry, error = %error, collected = self.records.len(), "traversal aborted");
            }
            state => {
                info!(state = ?state, collected = self.records.len(), pages_visited, "traversal finished");
            }
        }

        TraversalOutcome {
            records: self.records.freeze(),
            state: self.state,
            pages_visited,
        }
    }

    fn scan_page(&mut self) -> ControllerState {
        let browser = self.browser;
        let cards = match locate_all(browser, None, &self.config.selectors.order_card) {
            Ok(cards) => cards,
            Err(error) => {
                return ControllerState::AbortedOnEntryFailure {
                    page: self.page,
                    entry: 0,
                    error: error.into(),
                }
            }
        };

        if cards.is_empty() {
            info!(page = self.page, "no entries on page");
            return ControllerState::Exhausted;
        }
        info!(page = self.page, entries = cards.len(), "scanning page");

        for (index, card) in cards.iter().enumerate() {
            match self.process_entry(card) {
                Ok(EntryOutcome::Keep(record)) => {
                    debug!(date = %record.date_text, amount = %record.amount, "kept entry");
                    self.records.push(record);
                }
                Ok(EntryOutcome::SkipNewer) => {}
                Ok(EntryOutcome::Stop(date)) => {
                    info!(page = self.page, entry = index + 1, %date, "reached entry before window");
                    return ControllerState::StoppedByDateBound { date };
                }
                Err(error) => {
                    return ControllerState::AbortedOnEntryFailure {
                        page: self.page,
                        entry: index + 1,
                        error,
                    }
                }
            }
        }

        ControllerState::AdvancingPage
    }

    fn process_entry(&self, card: &B::Element<'b>) -> Result<EntryOutcome, ScrapeError> {
        let browser = self.browser;
        let entry = classify_entry(browser, card, &self.config.selectors)?;

        let amount = self.extractor.amount(browser, &entry.container, entry.variant)?;
        let extracted = self.extractor.date(browser, &entry.container, entry.variant)?;

        // An unknown date cannot be bounded, so it cannot be skipped either
        let date = extracted.date.ok_or_else(|| {
            ScrapeError::field(
                Field::Date,
                format!("`{}` does not match `{}`", extracted.text, self.config.date_format),
            )
        })?;

        match decide(&self.range, date) {
            DateDecision::Stop => return Ok(EntryOutcome::Stop(date)),
            DateDecision::SkipNewer => {
                debug!(%date, "skipping entry newer than window");
                return Ok(EntryOutcome::SkipNewer);
            }
            DateDecision::Keep => {}
        }

        let product_titles = self.extractor.product_titles(browser, card, entry.variant)?;
        let detail_link = self.extractor.detail_link(browser, card)?;

        Ok(EntryOutcome::Keep(OrderRecord {
            date_text: extracted.text,
            date: Some(date),
            amount,
            product_titles,
            detail_link,
        }))
    }

    fn advance_page(&mut self) -> ControllerState {
        let browser = self.browser;
        let selectors = &self.config.selectors;

        // Fingerprint of the page being left; the content marker is on it too
        let before_url = browser.current_url().ok();
        let first_card = locate(browser, None, &selectors.order_card).ok();

        let clicked = locate(browser, None, &selectors.next_page)
            .and_then(|next| browser.click(&next));
        if let Err(err) = clicked {
            match err {
                BrowserError::NotFound { .. } => info!(page = self.page, "no next-page control"),
                other => warn!(page = self.page, error = %other, "could not activate next page"),
            }
            return ControllerState::Exhausted;
        }

        let left = browser.await_condition(
            self.config.wait_timeout(),
            self.config.poll_interval(),
            |_| {
                let url_changed = match (&before_url, browser.current_url()) {
                    (Some(before), Ok(now)) => *before != now,
                    _ => false,
                };
                let card_gone = first_card
                    .as_ref()
                    .is_some_and(|card| browser.text(card).is_err());
                url_changed || card_gone
            },
        );
        if let Err(err) = left {
            warn!(page = self.page, error = %err, "page did not change after next-page click");
            return ControllerState::Exhausted;
        }

        let waited = browser.await_element(
            &selectors.content_marker,
            self.config.wait_timeout(),
            self.config.poll_interval(),
        );
        if let Err(err) = waited {
            warn!(page = self.page + 1, error = %err, "next page never rendered");
            return ControllerState::Exhausted;
        }

        self.page += 1;
        ControllerState::Scanning
    }
}

/// Walk the listing the browser currently shows and collect in-range orders
pub fn scrape_orders<B: Browser>(
    browser: &B,
    config: &ScrapeConfig,
    range: DateRange,
) -> TraversalOutcome {
    PaginationController::new(browser, config, range).run()
}
