// 🔎 Query Engine - Interactive commands over the frozen result set
// One case per command plus the amount fallback; errors are reported and
// the loop keeps going.

use crate::browser::Browser;
use crate::error::QueryError;
use crate::order::OrderRecord;
use crate::store::SessionResultSet;
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing::{debug, info};

pub const PROMPT: &str =
    "Enter the target amount (or 'list', 'search <text>', 'open <n>', 'help', 'exit'): ";

const HELP: &str = "\
Commands:
  list            list every order, numbered from 1
  <amount>        orders whose total is exactly this amount (e.g. 19.99 or $1,204.50)
  search <text>   orders whose date, amount or any product title contains the text
  open <n>        open order <n> of the last listing in the browser
  help            show this summary
  exit            end the session";

// ============================================================================
// COMMANDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Amount(Decimal),
    Search(String),
    /// 1-based index into the current listing
    Open(usize),
    Help,
    Exit,
}

/// Keywords are case-insensitive. Anything that is not a keyword is tried as
/// an amount before being rejected.
pub fn parse_command(line: &str) -> Result<Command, QueryError> {
    let input = line.trim();
    let invalid = || QueryError::InvalidInput(input.to_string());

    let (head, rest) = match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "list" if rest.is_empty() => Ok(Command::List),
        "help" if rest.is_empty() => Ok(Command::Help),
        "exit" if rest.is_empty() => Ok(Command::Exit),
        "search" if !rest.is_empty() => Ok(Command::Search(rest.to_string())),
        "search" => Err(invalid()),
        "open" => rest.parse::<usize>().map(Command::Open).map_err(|_| invalid()),
        _ => parse_amount_input(input).map(Command::Amount).ok_or_else(invalid),
    }
}

/// "$1,204.50" → 1204.50
fn parse_amount_input(input: &str) -> Option<Decimal> {
    let cleaned: String = input.chars().filter(|c| *c != '$' && *c != ',').collect();
    Decimal::from_str(cleaned.trim()).ok()
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingKind {
    All,
    AmountMatch(Decimal),
    Search(String),
}

/// One line of a listing: its 1-based position and the record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub position: usize,
    pub record: &'a OrderRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResponse<'a> {
    Listing { kind: ListingKind, rows: Vec<Row<'a>> },
    Opened { position: usize, url: String },
    Help,
    Exit,
}

/// Whether the interactive loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct QueryEngine {
    records: SessionResultSet,
    /// Indices into `records` of what was displayed last
    view: Vec<usize>,
}

impl QueryEngine {
    /// The initial view is the full list
    pub fn new(records: SessionResultSet) -> Self {
        let view = (0..records.len()).collect();
        QueryEngine { records, view }
    }

    pub fn records(&self) -> &SessionResultSet {
        &self.records
    }

    /// Records `open` currently indexes into
    pub fn current_view(&self) -> impl Iterator<Item = &OrderRecord> + '_ {
        self.view.iter().map(move |&i| &self.records[i])
    }

    pub fn execute<B: Browser>(
        &mut self,
        command: Command,
        browser: &B,
    ) -> Result<QueryResponse<'_>, QueryError> {
        debug!(?command, "executing query");

        match command {
            Command::List => {
                self.view = (0..self.records.len()).collect();
                Ok(self.listing(ListingKind::All))
            }
            Command::Amount(amount) => {
                // Decimal equality compares values, so 19.990 == 19.99
                self.view = self.select(|record| record.amount == amount);
                Ok(self.listing(ListingKind::AmountMatch(amount)))
            }
            Command::Search(text) => {
                self.view = self.select(|record| record.matches_text(&text));
                Ok(self.listing(ListingKind::Search(text)))
            }
            Command::Open(position) => self.open(position, browser),
            Command::Help => Ok(QueryResponse::Help),
            Command::Exit => Ok(QueryResponse::Exit),
        }
    }

    /// Parse, execute and render one input line. Only I/O errors escape
    pub fn respond<B: Browser, W: Write>(
        &mut self,
        line: &str,
        browser: &B,
        out: &mut W,
    ) -> io::Result<Flow> {
        let result = match parse_command(line) {
            Ok(command) => self.execute(command, browser),
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                render(&response, out)?;
                if matches!(response, QueryResponse::Exit) {
                    return Ok(Flow::Exit);
                }
            }
            Err(err) => writeln!(out, "Error: {}", err)?,
        }
        Ok(Flow::Continue)
    }

    fn select(&self, predicate: impl Fn(&OrderRecord) -> bool) -> Vec<usize> {
        (0..self.records.len())
            .filter(|&i| predicate(&self.records[i]))
            .collect()
    }

    fn listing(&self, kind: ListingKind) -> QueryResponse<'_> {
        let rows = self
            .view
            .iter()
            .enumerate()
            .map(|(n, &i)| Row {
                position: n + 1,
                record: &self.records[i],
            })
            .collect();

        QueryResponse::Listing { kind, rows }
    }

    fn open<B: Browser>(
        &self,
        position: usize,
        browser: &B,
    ) -> Result<QueryResponse<'_>, QueryError> {
        let len = self.view.len();
        if position == 0 || position > len {
            return Err(QueryError::IndexOutOfRange { index: position, len });
        }

        let record = &self.records[self.view[position - 1]];
        let url = record
            .detail_link
            .clone()
            .ok_or(QueryError::MissingDetailLink(position))?;

        browser.navigate(&url)?;
        info!(position, url = %url, "opened order detail");

        Ok(QueryResponse::Opened { position, url })
    }
}

// ============================================================================
// RENDERING (human-readable only)
// ============================================================================

pub fn render<W: Write>(response: &QueryResponse<'_>, out: &mut W) -> io::Result<()> {
    match response {
        QueryResponse::Listing { kind, rows } => {
            if rows.is_empty() {
                let message = match kind {
                    ListingKind::All => "No orders found.",
                    _ => "No matching orders found.",
                };
                return writeln!(out, "{}", message);
            }

            if *kind != ListingKind::All {
                writeln!(out, "Matching orders found:")?;
            }
            for row in rows {
                write_row(row, out)?;
            }
            Ok(())
        }
        QueryResponse::Opened { position, url } => {
            writeln!(out, "Opened order {} in the browser: {}", position, url)
        }
        QueryResponse::Help => writeln!(out, "{}", HELP),
        QueryResponse::Exit => writeln!(out, "Session ended."),
    }
}

fn write_row<W: Write>(row: &Row<'_>, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "{}. Order Date: {}, Order Amount: {}",
        row.position,
        row.record.date_text,
        row.record.display_amount()
    )?;
    for title in &row.record.product_titles {
        writeln!(out, "   Product Title: {}", title)?;
    }
    Ok(())
}

/// Line-oriented session over any reader/writer. Ends on `exit` or end of input
pub fn run_session<B, R, W>(
    engine: &mut QueryEngine,
    browser: &B,
    input: R,
    out: &mut W,
) -> io::Result<()>
where
    B: Browser,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            return Ok(());
        };

        if engine.respond(&line?, browser, out)? == Flow::Exit {
            return Ok(());
        }
    }
}
