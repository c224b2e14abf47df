// End-to-end: walk mock order-history pages, then query the result set

use chrono::{Duration, NaiveDate};
use order_history::browser::mock::fixtures::{consolidated_order, orders_page, standard_order};
use order_history::query::PROMPT;
use order_history::{
    run_session, scrape_orders, ControllerState, DateRange, MockBrowser, MockNode, QueryEngine,
    ScrapeConfig,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn display(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn create_test_config() -> ScrapeConfig {
    ScrapeConfig {
        wait_timeout_ms: 50,
        poll_interval_ms: 5,
        ..ScrapeConfig::default()
    }
}

fn session(engine: &mut QueryEngine, browser: &MockBrowser, script: &str) -> String {
    let mut out = Vec::new();
    run_session(engine, browser, script.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_scrape_then_query_scenario() {
    let browser = MockBrowser::new(vec![
        orders_page(
            "https://www.shop.test/your-orders/orders",
            vec![standard_order(
                "May 1, 2024",
                "$12.50",
                &["Widget"],
                Some("/gp/your-account/order-details?orderID=1"),
            )],
            Some(1),
        ),
        orders_page(
            "https://www.shop.test/your-orders/orders?startIndex=10",
            vec![
                standard_order(
                    "April 1, 2024",
                    "$12.50",
                    &["Gadget"],
                    Some("/gp/your-account/order-details?orderID=2"),
                ),
                standard_order("January 9, 2024", "$99.00", &["Too old"], None),
            ],
            None,
        ),
    ]);
    let config = create_test_config();
    let range = DateRange::new(date(2024, 3, 1), date(2024, 5, 31));

    let outcome = scrape_orders(&browser, &config, range);
    assert_eq!(
        outcome.state,
        ControllerState::StoppedByDateBound { date: date(2024, 1, 9) }
    );
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].amount, Decimal::new(1250, 2));

    let mut engine = QueryEngine::new(outcome.records);
    let text = session(&mut engine, &browser, "12.50\nopen 2\nsearch widget\nexit\n");
    let replies: Vec<&str> = text.split(PROMPT).skip(1).collect();

    assert_eq!(
        replies[0],
        "Matching orders found:\n\
         1. Order Date: May 1, 2024, Order Amount: $12.50\n   Product Title: Widget\n\
         2. Order Date: April 1, 2024, Order Amount: $12.50\n   Product Title: Gadget\n"
    );
    assert!(replies[1].starts_with("Opened order 2"));
    assert_eq!(
        replies[2],
        "Matching orders found:\n\
         1. Order Date: May 1, 2024, Order Amount: $12.50\n   Product Title: Widget\n"
    );
    assert_eq!(replies[3], "Session ended.\n");
    assert_eq!(
        browser.visited(),
        vec!["https://www.shop.test/gp/your-account/order-details?orderID=2".to_string()]
    );
}

#[test]
fn test_partial_results_survive_a_bad_entry() {
    let broken = MockNode::new("div")
        .class("order-card")
        .child(MockNode::new("div").class("order-header"));
    let browser = MockBrowser::new(vec![
        orders_page(
            "https://www.shop.test/orders?page=1",
            vec![
                consolidated_order("May 30, 2024", "$41.07", None),
                standard_order("May 29, 2024", "$5.00", &["Batteries"], None),
            ],
            Some(1),
        ),
        orders_page("https://www.shop.test/orders?page=2", vec![broken], None),
    ]);
    let config = create_test_config();
    let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 31));

    let outcome = scrape_orders(&browser, &config, range);

    assert!(matches!(
        outcome.state,
        ControllerState::AbortedOnEntryFailure { page: 2, entry: 1, .. }
    ));
    assert_eq!(outcome.records.len(), 2);

    let mut engine = QueryEngine::new(outcome.records);
    let text = session(&mut engine, &browser, "search GROCER\nexit\n");
    assert!(text.contains("1. Order Date: May 30, 2024, Order Amount: $41.07\n   Product Title: groceries\n"));
}

// ============================================================================
// Date window property
// ============================================================================

/// Expected result of the stop rule: in-range entries before the first older one
fn expected_titles(dates: &[NaiveDate], range: &DateRange) -> Vec<String> {
    dates
        .iter()
        .enumerate()
        .take_while(|(_, d)| **d >= range.start)
        .filter(|(_, d)| range.contains(**d))
        .map(|(i, _)| format!("order {}", i))
        .collect()
}

fn build_browser(dates: &[NaiveDate], per_page: usize) -> MockBrowser {
    let titles: Vec<String> = (0..dates.len()).map(|i| format!("order {}", i)).collect();
    let chunks: Vec<Vec<usize>> = (0..dates.len())
        .collect::<Vec<_>>()
        .chunks(per_page)
        .map(|c| c.to_vec())
        .collect();
    let page_count = chunks.len().max(1);

    let mut pages = Vec::new();
    for page in 0..page_count {
        let cards = chunks
            .get(page)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| standard_order(&display(dates[i]), "$1.00", &[titles[i].as_str()], None))
                    .collect()
            })
            .unwrap_or_default();
        let next = if page + 1 < page_count { Some(page + 1) } else { None };
        pages.push(orders_page(&format!("https://www.shop.test/orders?page={}", page), cards, next));
    }
    MockBrowser::new(pages)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_records_stay_inside_window(
        offsets in prop::collection::vec(0i64..120, 0..12),
        start_offset in 0i64..120,
        span in 0i64..60,
        per_page in 1usize..4,
    ) {
        let base = date(2024, 1, 1);
        let dates: Vec<NaiveDate> = offsets.iter().map(|o| base + Duration::days(*o)).collect();
        let range = DateRange::new(
            base + Duration::days(start_offset),
            base + Duration::days(start_offset + span),
        );

        let browser = build_browser(&dates, per_page);
        let config = create_test_config();
        let outcome = scrape_orders(&browser, &config, range);

        for record in outcome.records.iter() {
            let d = record.date.expect("kept records carry a parsed date");
            prop_assert!(range.start <= d && d <= range.end);
        }

        let titles: Vec<String> = outcome.records.iter().map(|r| r.product_titles[0].clone()).collect();
        prop_assert_eq!(titles, expected_titles(&dates, &range));
    }
}

#[test]
fn test_config_selectors_accept_full_css() {
    let config = ScrapeConfig::from_json(
        r#"{
            "wait_timeout_ms": 50,
            "poll_interval_ms": 5,
            "selectors": {
                "order_card": ".your-orders-content-container > div.order-card",
                "detail_link": "a[href*=order-details]"
            }
        }"#,
    )
    .unwrap();
    let browser = MockBrowser::new(vec![orders_page(
        "https://www.shop.test/orders",
        vec![standard_order(
            "May 3, 2024",
            "$7.25",
            &["Lamp"],
            Some("/gp/your-account/order-details?orderID=7"),
        )],
        None,
    )]);
    let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 31));

    let outcome = scrape_orders(&browser, &config, range);

    assert_eq!(outcome.state, ControllerState::Exhausted);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(
        outcome.records[0].detail_link.as_deref(),
        Some("https://www.shop.test/gp/your-account/order-details?orderID=7")
    );
}
