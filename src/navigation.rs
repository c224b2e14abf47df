// 🧭 Navigation - Storefront home → sign-in hand-off → order history
// Timeouts here are fatal: without the order-history page there is nothing
// to walk.

use crate::browser::{locate, Browser};
use crate::config::ScrapeConfig;
use crate::error::{BrowserError, ScrapeError};
use crate::selectors::Selector;
use tracing::info;

fn wait_for<B: Browser>(
    browser: &B,
    selector: &Selector,
    config: &ScrapeConfig,
) -> Result<(), ScrapeError> {
    browser
        .await_element(selector, config.wait_timeout(), config.poll_interval())
        .map_err(|err| match err {
            BrowserError::TimedOut(after) => ScrapeError::TimedOut(after),
            other => ScrapeError::Browser(other),
        })
}

fn click_on<B: Browser>(browser: &B, selector: &Selector) -> Result<(), ScrapeError> {
    let element = locate(browser, None, selector)?;
    browser.click(&element)?;
    Ok(())
}

/// Load the storefront and open its sign-in page. The human signs in next
pub fn open_home<B: Browser>(browser: &B, config: &ScrapeConfig) -> Result<(), ScrapeError> {
    browser.navigate(&config.home_url)?;
    wait_for(browser, &config.selectors.account_link, config)?;
    click_on(browser, &config.selectors.account_link)?;
    info!(url = %config.home_url, "sign-in page opened");
    Ok(())
}

/// Confirm the sign-in worked, then open the first order-history page
pub fn enter_order_history<B: Browser>(
    browser: &B,
    config: &ScrapeConfig,
) -> Result<(), ScrapeError> {
    wait_for(browser, &config.selectors.orders_link, config)?;
    info!("signed in");

    click_on(browser, &config.selectors.orders_link)?;
    wait_for(browser, &config.selectors.content_marker, config)?;
    info!("order history loaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock::fixtures::{orders_page, standard_order};
    use crate::browser::{MockBrowser, MockNode, MockPage};

    fn create_test_config() -> ScrapeConfig {
        ScrapeConfig {
            home_url: "https://shop.test/".to_string(),
            wait_timeout_ms: 30,
            poll_interval_ms: 5,
            ..ScrapeConfig::default()
        }
    }

    fn create_test_browser() -> MockBrowser {
        MockBrowser::new(vec![
            MockPage::new("about:blank", MockNode::new("body")),
            MockPage::new(
                "https://shop.test/",
                MockNode::new("body").child(
                    MockNode::new("a")
                        .id("nav-link-accountList")
                        .text("Sign in")
                        .navigates_to(2),
                ),
            ),
            MockPage::new(
                "https://shop.test/signin",
                MockNode::new("body").child(
                    MockNode::new("a").id("nav-orders").text("Returns & Orders").navigates_to(3),
                ),
            ),
            orders_page(
                "https://shop.test/orders",
                vec![standard_order("May 1, 2024", "$1.00", &["Tea"], None)],
                None,
            ),
        ])
    }

    #[test]
    fn test_full_sequence_reaches_order_history() {
        let browser = create_test_browser();
        let config = create_test_config();

        open_home(&browser, &config).unwrap();
        assert_eq!(browser.current_page(), 2);

        enter_order_history(&browser, &config).unwrap();
        assert_eq!(browser.current_page(), 3);
        assert_eq!(browser.visited(), vec!["https://shop.test/".to_string()]);
    }

    #[test]
    fn test_missing_sign_in_link_times_out() {
        let browser = MockBrowser::new(vec![MockPage::new("https://shop.test/", MockNode::new("body"))]);
        let config = create_test_config();

        let result = open_home(&browser, &config);
        assert!(matches!(result, Err(ScrapeError::TimedOut(_))));
    }

    #[test]
    fn test_not_signed_in_times_out() {
        let browser = create_test_browser();
        let config = create_test_config();
        browser.navigate("https://shop.test/").unwrap();

        // Still on the home page: no orders link rendered
        let result = enter_order_history(&browser, &config);
        assert!(matches!(result, Err(ScrapeError::TimedOut(_))));
    }
}
