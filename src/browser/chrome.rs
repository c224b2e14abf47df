// 🖥️ Chrome Driver - Browser capability over headless_chrome (DevTools)
// Runs with a visible window by default so a human can sign in

use super::Browser;
use crate::config::ScrapeConfig;
use crate::error::BrowserError;
use crate::selectors::Selector;
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::{Browser as Chrome, Element, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Keep the DevTools connection alive while the user signs in
const IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

fn driver_error(err: impl std::fmt::Display) -> BrowserError {
    BrowserError::Driver(err.to_string())
}

/// Only "nothing matched" is a miss; anything else is the driver failing
fn lookup_error(selector: &Selector, err: anyhow::Error) -> BrowserError {
    if err.downcast_ref::<NoElementFound>().is_some() {
        BrowserError::not_found(selector)
    } else {
        warn!(selector = %selector, error = %err, "element lookup failed");
        driver_error(err)
    }
}

/// headless_chrome reports an empty match set as `NoElementFound`
fn no_match_is_empty<T>(
    selector: &Selector,
    found: anyhow::Result<Vec<T>>,
) -> Result<Vec<T>, BrowserError> {
    match found {
        Ok(elements) => Ok(elements),
        Err(err) => match lookup_error(selector, err) {
            BrowserError::NotFound { .. } => {
                debug!(selector = %selector, "matched nothing");
                Ok(Vec::new())
            }
            other => Err(other),
        },
    }
}

pub struct ChromeBrowser {
    // Dropping the Browser closes Chrome, so it lives as long as the tab
    _chrome: Chrome,
    tab: Arc<Tab>,
}

impl ChromeBrowser {
    pub fn launch(config: &ScrapeConfig) -> Result<Self, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((1280, 1024)))
            .idle_browser_timeout(IDLE_TIMEOUT)
            .build()
            .map_err(driver_error)?;

        let chrome = Chrome::new(options).map_err(driver_error)?;
        let tab = chrome.new_tab().map_err(driver_error)?;

        Ok(ChromeBrowser {
            _chrome: chrome,
            tab,
        })
    }
}

impl Browser for ChromeBrowser {
    type Element<'a> = Element<'a> where Self: 'a;

    fn find_one(&self, selector: &Selector) -> Result<Element<'_>, BrowserError> {
        self.tab
            .find_element(selector.css())
            .map_err(|err| lookup_error(selector, err))
    }

    fn find_all(&self, selector: &Selector) -> Result<Vec<Element<'_>>, BrowserError> {
        no_match_is_empty(selector, self.tab.find_elements(selector.css()))
    }

    fn find_one_in<'a>(
        &'a self,
        scope: &Element<'a>,
        selector: &Selector,
    ) -> Result<Element<'a>, BrowserError> {
        scope
            .find_element(selector.css())
            .map_err(|err| lookup_error(selector, err))
    }

    fn find_all_in<'a>(
        &'a self,
        scope: &Element<'a>,
        selector: &Selector,
    ) -> Result<Vec<Element<'a>>, BrowserError> {
        no_match_is_empty(selector, scope.find_elements(selector.css()))
    }

    fn text<'a>(&'a self, element: &Element<'a>) -> Result<String, BrowserError> {
        element.get_inner_text().map_err(driver_error)
    }

    fn attribute<'a>(
        &'a self,
        element: &Element<'a>,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        // DevTools returns attributes as a flat [name, value, name, value, ...] list
        let attributes = element.get_attributes().map_err(driver_error)?;

        Ok(attributes.and_then(|flat| {
            flat.chunks(2)
                .find(|pair| pair.len() == 2 && pair[0] == name)
                .map(|pair| pair[1].clone())
        }))
    }

    fn click<'a>(&'a self, element: &Element<'a>) -> Result<(), BrowserError> {
        element.click().map(|_| ()).map_err(driver_error)
    }

    fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(driver_error)
    }

    fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.tab.get_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(css: &str) -> Selector {
        css.parse().unwrap()
    }

    #[test]
    fn test_no_element_found_is_a_miss() {
        let err = lookup_error(&sel(".order-card"), NoElementFound {}.into());
        assert_eq!(err, BrowserError::not_found(".order-card"));

        let empty: Vec<u8> = no_match_is_empty(&sel(".order-card"), Err(NoElementFound {}.into())).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_other_driver_failures_surface() {
        let err = lookup_error(&sel(".order-card"), anyhow::anyhow!("tab crashed"));
        assert_eq!(err, BrowserError::Driver("tab crashed".to_string()));

        let result: Result<Vec<u8>, _> =
            no_match_is_empty(&sel(".order-card"), Err(anyhow::anyhow!("connection closed")));
        assert!(matches!(result, Err(BrowserError::Driver(_))));
    }
}
