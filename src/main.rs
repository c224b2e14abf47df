use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use order_history::query::PROMPT;
use order_history::{
    enter_order_history, open_home, scrape_orders, ChromeBrowser, ControllerState, DateRange,
    Flow, QueryEngine, ScrapeConfig, TraversalOutcome, DEFAULT_WINDOW_DAYS,
};

/// Extract your order history for a date window, then query it interactively
#[derive(Debug, Parser)]
#[command(name = "order-history", version)]
struct Args {
    /// First day of the window (YYYY-MM-DD). Give both dates or neither
    #[arg(value_parser = parse_ymd)]
    start: Option<NaiveDate>,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(value_parser = parse_ymd)]
    end: Option<NaiveDate>,

    /// JSON file overriding selectors, timeouts or formats
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,
}

fn parse_ymd(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "Invalid date format. Please use YYYY-MM-DD.".to_string())
}

fn resolve_range(args: &Args) -> Result<DateRange> {
    match (args.start, args.end) {
        (Some(start), Some(end)) => {
            if start > end {
                bail!("Start date {} is after end date {}", start, end);
            }
            Ok(DateRange::new(start, end))
        }
        (None, None) => Ok(DateRange::last_days(
            Local::now().date_naive(),
            DEFAULT_WINDOW_DAYS,
        )),
        _ => bail!("Give both a start and an end date, or neither"),
    }
}

fn init_tracing() {
    // Logs go to stderr so they never interleave with the command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,order_history=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let range = resolve_range(&args)?;

    let mut config = match &args.config {
        Some(path) => ScrapeConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ScrapeConfig::default(),
    };
    if args.headless {
        config.headless = true;
    }

    println!("Scraping orders from {} to {}", range.start, range.end);

    let browser = ChromeBrowser::launch(&config).context("Failed to launch Chrome")?;
    let mut editor = DefaultEditor::new().context("Failed to start the line editor")?;

    // 1. Sign in (a human does this part)
    open_home(&browser, &config).context("Failed to click sign-in link")?;
    match editor.readline("Please log in to your account and press Enter to continue...") {
        Ok(_) => {}
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("Session ended.");
            return Ok(());
        }
        Err(err) => return Err(err).context("Failed to read from the terminal"),
    }

    // 2. Order history
    enter_order_history(&browser, &config)
        .context("Login failed or the orders page did not load. Please try again.")?;
    println!("Orders page loaded successfully!");

    // 3. Walk the listing
    let outcome = scrape_orders(&browser, &config, range);
    report(&outcome, &range);

    // 4. Query
    let mut engine = QueryEngine::new(outcome.records);
    run_repl(&mut editor, &mut engine, &browser)
}

fn report(outcome: &TraversalOutcome, range: &DateRange) {
    match &outcome.state {
        ControllerState::AbortedOnEntryFailure { page, entry, error } => {
            println!("Failed to process order {} on page {}: {}", entry, page, error);
            println!(
                "Stopped early. The {} orders collected before it are still available.",
                outcome.records.len()
            );
        }
        ControllerState::StoppedByDateBound { .. } => {
            println!("Reached orders older than {}.", range.start);
        }
        _ => {}
    }

    if outcome.records.is_empty() {
        println!("No orders found.");
    }
    println!(
        "Order scraping completed: {} orders from {} page(s).",
        outcome.records.len(),
        outcome.pages_visited
    );
}

fn run_repl(
    editor: &mut DefaultEditor,
    engine: &mut QueryEngine,
    browser: &ChromeBrowser,
) -> Result<()> {
    let stdout = io::stdout();

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if let Err(err) = editor.add_history_entry(line.as_str()) {
                    debug!(error = %err, "could not record history entry");
                }
                let mut out = stdout.lock();
                if engine.respond(&line, browser, &mut out)? == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("(Ctrl+C) Type 'exit' to quit.");
            }
            Err(ReadlineError::Eof) => {
                println!("Session ended.");
                break;
            }
            Err(err) => return Err(err).context("Failed to read command"),
        }
    }

    Ok(())
}
