// 🌐 Browser Capability - What the engines need from a page driver
// The driver itself (Chrome, WebDriver, a fake DOM) lives behind this trait

pub mod mock;

#[cfg(feature = "chrome")]
pub mod chrome;

use crate::error::BrowserError;
use crate::selectors::Selector;
use std::thread;
use std::time::{Duration, Instant};

pub use mock::{MockBrowser, MockNode, MockPage};

#[cfg(feature = "chrome")]
pub use chrome::ChromeBrowser;

// ============================================================================
// CAPABILITY TRAIT
// ============================================================================

/// Single exclusively-owned browser session.
///
/// Every call blocks. Element handles borrow the session, so a driver whose
/// elements point back into a live tab can hand them out directly.
pub trait Browser {
    type Element<'a>
    where
        Self: 'a;

    /// First element in the document matching `selector`
    fn find_one(&self, selector: &Selector) -> Result<Self::Element<'_>, BrowserError>;

    /// Every element in the document matching `selector`, in document order
    fn find_all(&self, selector: &Selector) -> Result<Vec<Self::Element<'_>>, BrowserError>;

    /// First descendant of `scope` matching `selector`
    fn find_one_in<'a>(
        &'a self,
        scope: &Self::Element<'a>,
        selector: &Selector,
    ) -> Result<Self::Element<'a>, BrowserError>;

    /// Every descendant of `scope` matching `selector`
    fn find_all_in<'a>(
        &'a self,
        scope: &Self::Element<'a>,
        selector: &Selector,
    ) -> Result<Vec<Self::Element<'a>>, BrowserError>;

    /// Rendered text of the element and its descendants
    fn text<'a>(&'a self, element: &Self::Element<'a>) -> Result<String, BrowserError>;

    fn attribute<'a>(
        &'a self,
        element: &Self::Element<'a>,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    fn click<'a>(&'a self, element: &Self::Element<'a>) -> Result<(), BrowserError>;

    fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    fn current_url(&self) -> Result<String, BrowserError>;

    /// Poll `condition` until it holds or `timeout` expires
    fn await_condition<F>(
        &self,
        timeout: Duration,
        poll: Duration,
        mut condition: F,
    ) -> Result<(), BrowserError>
    where
        F: FnMut(&Self) -> bool,
    {
        let deadline = Instant::now() + timeout;

        loop {
            if condition(self) {
                return Ok(());
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(BrowserError::TimedOut(timeout));
            }
            thread::sleep(poll.min(deadline - now));
        }
    }

    /// Wait until `selector` matches somewhere in the document
    fn await_element(
        &self,
        selector: &Selector,
        timeout: Duration,
        poll: Duration,
    ) -> Result<(), BrowserError>
    where
        Self: Sized,
    {
        self.await_condition(timeout, poll, |browser| browser.find_one(selector).is_ok())
    }
}

// ============================================================================
// SCOPED LOOKUP
// ============================================================================

/// First match of `selector` inside `scope`, or in the whole document
pub fn locate<'a, B: Browser>(
    browser: &'a B,
    scope: Option<&B::Element<'a>>,
    selector: &Selector,
) -> Result<B::Element<'a>, BrowserError> {
    match scope {
        Some(scope) => browser.find_one_in(scope, selector),
        None => browser.find_one(selector),
    }
}

/// Every match of `selector` inside `scope`, or in the whole document.
/// An empty result is not an error.
pub fn locate_all<'a, B: Browser>(
    browser: &'a B,
    scope: Option<&B::Element<'a>>,
    selector: &Selector,
) -> Result<Vec<B::Element<'a>>, BrowserError> {
    match scope {
        Some(scope) => browser.find_all_in(scope, selector),
        None => browser.find_all(selector),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(css: &str) -> Selector {
        css.parse().unwrap()
    }

    fn create_test_browser() -> MockBrowser {
        MockBrowser::new(vec![MockPage::from_html(
            "https://shop.test/orders",
            r#"<div class="outer">
                 <span class="inner">first</span>
                 <p><span class="inner">second</span></p>
               </div>"#,
        )])
    }

    #[test]
    fn test_locate_in_document_and_scope() {
        let browser = create_test_browser();

        let element = locate(&browser, None, &sel(".outer .inner")).unwrap();
        assert_eq!(browser.text(&element).unwrap(), "first");

        let outer = locate(&browser, None, &sel(".outer")).unwrap();
        let nested = locate(&browser, Some(&outer), &sel("p > .inner")).unwrap();
        assert_eq!(browser.text(&nested).unwrap(), "second");
    }

    #[test]
    fn test_locate_miss_names_the_selector() {
        let browser = create_test_browser();

        let err = locate(&browser, None, &sel(".outer .missing")).unwrap_err();
        assert_eq!(err, BrowserError::not_found(".outer .missing"));
    }

    #[test]
    fn test_locate_all_collects_every_match() {
        let browser = create_test_browser();

        assert_eq!(locate_all(&browser, None, &sel(".outer .inner")).unwrap().len(), 2);
        assert_eq!(locate_all(&browser, None, &sel(".outer > .inner")).unwrap().len(), 1);
        assert!(locate_all(&browser, None, &sel(".outer .missing")).unwrap().is_empty());
    }

    #[test]
    fn test_await_condition_times_out() {
        let browser = create_test_browser();
        let result = browser.await_condition(
            Duration::from_millis(20),
            Duration::from_millis(5),
            |_| false,
        );
        assert_eq!(result, Err(BrowserError::TimedOut(Duration::from_millis(20))));
    }

    #[test]
    fn test_await_element_present_returns_immediately() {
        let browser = create_test_browser();
        assert!(browser
            .await_element(&sel(".outer"), Duration::from_millis(20), Duration::from_millis(5))
            .is_ok());
    }
}
