// 🧪 Mock Browser - Deterministic in-memory pages for tests and demos
// Pages are parsed with `scraper`; clicks and navigations only move between them

use super::Browser;
use crate::error::BrowserError;
use crate::selectors::Selector;
use scraper::{ElementRef, Html};
use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

/// Attribute the builder writes for `navigates_to`
const PAGE_ATTR: &str = "data-mock-page";

// ============================================================================
// PAGE DESCRIPTION (builder side)
// ============================================================================

/// Small element builder that renders to HTML
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<MockNode>,

    /// Clicking this node switches the browser to the page at this index
    pub navigates_to: Option<usize>,
}

impl MockNode {
    pub fn new(tag: &str) -> Self {
        MockNode {
            tag: tag.to_ascii_lowercase(),
            ..MockNode::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Add one or more space-separated classes
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn child(mut self, child: MockNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = MockNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn navigates_to(mut self, page: usize) -> Self {
        self.navigates_to = Some(page);
        self
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }

    fn render(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);

        let mut attributes: Vec<(&str, String)> = Vec::new();
        if let Some(id) = &self.id {
            attributes.push(("id", id.clone()));
        }
        if !self.classes.is_empty() {
            attributes.push(("class", self.classes.join(" ")));
        }
        for (name, value) in &self.attributes {
            attributes.push((name.as_str(), value.clone()));
        }
        if let Some(page) = self.navigates_to {
            attributes.push((PAGE_ATTR, page.to_string()));
        }
        for (name, value) in attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape(&value)));
        }

        out.push('>');
        out.push_str(&escape(&self.text));
        for child in &self.children {
            child.render(out);
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Debug, Clone)]
pub struct MockPage {
    pub url: String,
    pub html: Html,
}

impl MockPage {
    pub fn new(url: &str, root: MockNode) -> Self {
        MockPage::from_html(url, &root.to_html())
    }

    pub fn from_html(url: &str, html: &str) -> Self {
        MockPage {
            url: url.to_string(),
            html: Html::parse_document(html),
        }
    }
}

// ============================================================================
// MOCK BROWSER
// ============================================================================

/// Handle to one element of one page. Goes stale when the page changes
#[derive(Debug, Clone, Copy)]
pub struct MockElement<'a> {
    page: usize,
    element: ElementRef<'a>,
}

pub struct MockBrowser {
    pages: Vec<MockPage>,
    current: Cell<usize>,
    /// Page a click will switch to, and when
    pending: Cell<Option<(usize, Instant)>>,
    click_delay: Duration,
    visited: RefCell<Vec<String>>,
    clicks: Cell<usize>,
    fail_navigation: bool,
}

impl MockBrowser {
    /// Start on the first page
    pub fn new(pages: Vec<MockPage>) -> Self {
        let mut pages = pages;
        if pages.is_empty() {
            pages.push(MockPage::from_html("about:blank", ""));
        }

        MockBrowser {
            pages,
            current: Cell::new(0),
            pending: Cell::new(None),
            click_delay: Duration::ZERO,
            visited: RefCell::new(Vec::new()),
            clicks: Cell::new(0),
            fail_navigation: false,
        }
    }

    /// Every `navigate` call fails with a driver error
    pub fn with_failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    /// Clicks return at once but the target page only shows up after `delay`,
    /// like a real driver whose click does not wait for the next document
    pub fn with_click_delay(mut self, delay: Duration) -> Self {
        self.click_delay = delay;
        self
    }

    /// Index of the page currently shown
    pub fn current_page(&self) -> usize {
        self.sync();
        self.current.get()
    }

    /// URLs passed to `navigate`, in call order
    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }

    pub fn click_count(&self) -> usize {
        self.clicks.get()
    }

    /// Apply a delayed click once it is due
    fn sync(&self) {
        if let Some((target, due)) = self.pending.get() {
            if Instant::now() >= due {
                self.current.set(target);
                self.pending.set(None);
            }
        }
    }

    fn page(&self) -> &MockPage {
        self.sync();
        &self.pages[self.current.get()]
    }

    fn check_fresh(&self, element: &MockElement<'_>) -> Result<(), BrowserError> {
        self.sync();
        if element.page == self.current.get() {
            Ok(())
        } else {
            Err(BrowserError::Driver("stale element reference".to_string()))
        }
    }

    fn compile(selector: &Selector) -> Result<scraper::Selector, BrowserError> {
        selector
            .compile()
            .map_err(|err| BrowserError::Driver(err.to_string()))
    }

    fn search_document(&self, selector: &Selector) -> Result<Vec<MockElement<'_>>, BrowserError> {
        let compiled = Self::compile(selector)?;
        let document = &self.page().html;
        let page = self.current.get();

        Ok(document
            .select(&compiled)
            .map(|element| MockElement { page, element })
            .collect())
    }

    /// Strict descendants only, like `querySelectorAll` on an element
    fn search_scope<'a>(
        &'a self,
        scope: &MockElement<'a>,
        selector: &Selector,
    ) -> Result<Vec<MockElement<'a>>, BrowserError> {
        self.check_fresh(scope)?;
        let compiled = Self::compile(selector)?;
        let root = scope.element.id();

        Ok(scope
            .element
            .select(&compiled)
            .filter(|element| element.id() != root)
            .map(|element| MockElement {
                page: scope.page,
                element,
            })
            .collect())
    }
}

impl Browser for MockBrowser {
    type Element<'a> = MockElement<'a> where Self: 'a;

    fn find_one(&self, selector: &Selector) -> Result<MockElement<'_>, BrowserError> {
        self.search_document(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::not_found(selector))
    }

    fn find_all(&self, selector: &Selector) -> Result<Vec<MockElement<'_>>, BrowserError> {
        self.search_document(selector)
    }

    fn find_one_in<'a>(
        &'a self,
        scope: &MockElement<'a>,
        selector: &Selector,
    ) -> Result<MockElement<'a>, BrowserError> {
        self.search_scope(scope, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::not_found(selector))
    }

    fn find_all_in<'a>(
        &'a self,
        scope: &MockElement<'a>,
        selector: &Selector,
    ) -> Result<Vec<MockElement<'a>>, BrowserError> {
        self.search_scope(scope, selector)
    }

    fn text<'a>(&'a self, element: &MockElement<'a>) -> Result<String, BrowserError> {
        self.check_fresh(element)?;
        Ok(element
            .element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn attribute<'a>(
        &'a self,
        element: &MockElement<'a>,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        self.check_fresh(element)?;
        Ok(element.element.value().attr(name).map(str::to_string))
    }

    fn click<'a>(&'a self, element: &MockElement<'a>) -> Result<(), BrowserError> {
        self.check_fresh(element)?;
        self.clicks.set(self.clicks.get() + 1);

        let Some(value) = element.element.value().attr(PAGE_ATTR) else {
            return Ok(());
        };
        let target: usize = value
            .parse()
            .map_err(|_| BrowserError::Driver(format!("bad mock page `{}`", value)))?;
        if target >= self.pages.len() {
            return Err(BrowserError::Driver(format!("no mock page {}", target)));
        }

        if self.click_delay.is_zero() {
            self.current.set(target);
        } else {
            self.pending.set(Some((target, Instant::now() + self.click_delay)));
        }
        Ok(())
    }

    fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        if self.fail_navigation {
            return Err(BrowserError::Driver(format!("navigation to {} refused", url)));
        }

        self.visited.borrow_mut().push(url.to_string());
        if let Some(target) = self.pages.iter().position(|p| p.url == url) {
            self.pending.set(None);
            self.current.set(target);
        }
        Ok(())
    }

    fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.page().url.clone())
    }
}

// ============================================================================
// ORDER-HISTORY FIXTURES
// ============================================================================

/// Builders for order-history markup shaped like the default selector map
pub mod fixtures {
    use super::{MockNode, MockPage};

    /// A standard (multi-item) order card
    pub fn standard_order(date: &str, amount: &str, titles: &[&str], link: Option<&str>) -> MockNode {
        let header = MockNode::new("div")
            .class("order-header")
            .child(
                MockNode::new("div")
                    .class("a-column a-span3")
                    .child(MockNode::new("span").class("a-size-base a-color-secondary").text(date)),
            )
            .child(
                MockNode::new("div")
                    .class("a-column a-span2")
                    .child(MockNode::new("span").class("a-size-base a-color-secondary").text(amount)),
            );

        let delivery = MockNode::new("div").class("delivery-box").children(
            titles
                .iter()
                .map(|t| MockNode::new("div").class("yohtmlc-product-title").text(t)),
        );

        let mut card = MockNode::new("div").class("order-card").child(header).child(delivery);
        if let Some(href) = link {
            card = card.child(MockNode::new("a").attr("href", href).text("View order details"));
        }
        card
    }

    /// A consolidated (grocery style) order card
    pub fn consolidated_order(date: &str, amount: &str, link: Option<&str>) -> MockNode {
        let info = MockNode::new("div")
            .class("a-box-inner order-info")
            .child(
                MockNode::new("div")
                    .class("a-column a-span3")
                    .child(MockNode::new("span").class("a-color-secondary value").text(date)),
            )
            .child(
                MockNode::new("div")
                    .class("yohtmlc-order-total")
                    .child(MockNode::new("span").class("a-color-secondary value").text(amount)),
            );

        let mut card = MockNode::new("div").class("order-card").child(info);
        if let Some(href) = link {
            card = card.child(MockNode::new("a").attr("href", href).text("View order details"));
        }
        card
    }

    /// An order-history page; `next` is the page index the next-page control opens
    pub fn orders_page(url: &str, cards: Vec<MockNode>, next: Option<usize>) -> MockPage {
        let mut pagination = MockNode::new("ul").class("a-pagination");
        pagination = match next {
            Some(page) => pagination.child(
                MockNode::new("li")
                    .class("a-last")
                    .child(MockNode::new("a").attr("href", "#").text("Next").navigates_to(page)),
            ),
            None => pagination.child(MockNode::new("li").class("a-disabled a-last").text("Next")),
        };

        let container = MockNode::new("div")
            .class("your-orders-content-container")
            .children(cards)
            .child(pagination);

        MockPage::new(url, MockNode::new("body").child(container))
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn sel(css: &str) -> Selector {
        css.parse().unwrap()
    }

    #[test]
    fn test_find_all_in_document_order() {
        let browser = MockBrowser::new(vec![orders_page(
            "https://shop.test/orders",
            vec![
                standard_order("May 1, 2024", "$1.00", &["A"], None),
                consolidated_order("April 1, 2024", "$2.00", None),
            ],
            None,
        )]);

        let cards = browser.find_all(&sel(".order-card")).unwrap();
        assert_eq!(cards.len(), 2);

        let info = browser.find_one_in(&cards[1], &sel(".order-info")).unwrap();
        assert_eq!(
            browser.attribute(&info, "class").unwrap(),
            Some("a-box-inner order-info".to_string())
        );
    }

    #[test]
    fn test_find_one_in_excludes_scope_itself() {
        let browser = MockBrowser::new(vec![MockPage::from_html("u", r#"<div class="x"></div>"#)]);
        let div = browser.find_one(&sel(".x")).unwrap();
        assert!(browser.find_one_in(&div, &sel(".x")).is_err());
    }

    #[test]
    fn test_builder_escapes_text_and_attributes() {
        let node = MockNode::new("a")
            .attr("href", "/o?a=1&b=\"2\"")
            .text("Returns & Orders");
        let browser = MockBrowser::new(vec![MockPage::new("u", node)]);

        let link = browser.find_one(&sel("a")).unwrap();
        assert_eq!(browser.text(&link).unwrap(), "Returns & Orders");
        assert_eq!(
            browser.attribute(&link, "href").unwrap().as_deref(),
            Some("/o?a=1&b=\"2\"")
        );
    }

    #[test]
    fn test_click_moves_to_target_page_and_stales_handles() {
        let browser = MockBrowser::new(vec![
            orders_page("https://shop.test/p1", vec![], Some(1)),
            orders_page("https://shop.test/p2", vec![], None),
        ]);

        let link = browser.find_one(&sel(".a-last a")).unwrap();
        browser.click(&link).unwrap();

        assert_eq!(browser.current_page(), 1);
        assert_eq!(browser.current_url().unwrap(), "https://shop.test/p2");
        assert!(matches!(browser.text(&link), Err(BrowserError::Driver(_))));
    }

    #[test]
    fn test_delayed_click_applies_later() {
        let browser = MockBrowser::new(vec![
            orders_page("https://shop.test/p1", vec![], Some(1)),
            orders_page("https://shop.test/p2", vec![], None),
        ])
        .with_click_delay(Duration::from_millis(20));

        let link = browser.find_one(&sel(".a-last a")).unwrap();
        browser.click(&link).unwrap();
        assert_eq!(browser.current_url().unwrap(), "https://shop.test/p1");
        assert!(browser.text(&link).is_ok());

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(browser.current_url().unwrap(), "https://shop.test/p2");
        assert!(browser.text(&link).is_err());
    }

    #[test]
    fn test_navigate_records_urls() {
        let browser = MockBrowser::new(vec![]);
        browser.navigate("https://shop.test/order/1").unwrap();

        assert_eq!(browser.visited(), vec!["https://shop.test/order/1".to_string()]);
        assert_eq!(browser.current_url().unwrap(), "about:blank");
    }

    #[test]
    fn test_failing_navigation() {
        let browser = MockBrowser::new(vec![]).with_failing_navigation();
        assert!(browser.navigate("https://shop.test").is_err());
        assert!(browser.visited().is_empty());
    }

    #[test]
    fn test_text_includes_descendants() {
        let browser = MockBrowser::new(vec![MockPage::from_html(
            "u",
            r#"<div class="box"><span>  Organic </span><span>Milk</span></div>"#,
        )]);
        let div = browser.find_one(&sel(".box")).unwrap();
        assert_eq!(browser.text(&div).unwrap(), "Organic Milk");
    }
}
