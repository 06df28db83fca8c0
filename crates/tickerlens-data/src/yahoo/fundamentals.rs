//! Company profile and financial statements from Yahoo Finance.
//!
//! Data comes from the `quoteSummary` endpoint. The JSON body is parsed by
//! [`parse_quote_summary`], which is independent of the network so it can be
//! exercised against stored responses.

use crate::error::{DataError, Result};
use crate::source::FundamentalsSource;
use chrono::{DateTime, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

const SESSION_URL: &str = "https://fc.yahoo.com";

const CRUMB_URL: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";

const MODULES: &str =
    "price,assetProfile,incomeStatementHistory,balanceSheetHistory,cashflowStatementHistory";

/// Statement fields that are not line items.
const SKIPPED_FIELDS: [&str; 2] = ["endDate", "maxAge"];

/// Descriptive company information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Stock symbol
    pub symbol: String,
    /// Short company name
    pub short_name: Option<String>,
    /// Industry
    pub industry: Option<String>,
    /// Sector
    pub sector: Option<String>,
    /// Country of domicile
    pub country: Option<String>,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Long business summary
    pub business_summary: Option<String>,
}

/// Kind of annual financial statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    /// Income statement
    Income,
    /// Balance sheet
    BalanceSheet,
    /// Cash flow statement
    CashFlow,
}

impl StatementKind {
    /// All statement kinds in display order.
    pub const ALL: [Self; 3] = [Self::Income, Self::BalanceSheet, Self::CashFlow];

    /// Human readable title.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Income => "Income Statement",
            Self::BalanceSheet => "Balance Sheet",
            Self::CashFlow => "Cash Flow Statement",
        }
    }

    /// `quoteSummary` module and the array key holding its statements.
    const fn module_keys(&self) -> (&'static str, &'static str) {
        match self {
            Self::Income => ("incomeStatementHistory", "incomeStatementHistory"),
            Self::BalanceSheet => ("balanceSheetHistory", "balanceSheetStatements"),
            Self::CashFlow => ("cashflowStatementHistory", "cashflowStatements"),
        }
    }
}

/// One annual financial statement across several fiscal periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    /// Statement kind
    pub kind: StatementKind,
    /// Fiscal period end dates, newest first
    pub periods: Vec<NaiveDate>,
    /// Line item name to one value per period, aligned with `periods`
    pub line_items: BTreeMap<String, Vec<Option<f64>>>,
}

impl FinancialStatement {
    /// A statement without periods.
    pub const fn empty(kind: StatementKind) -> Self {
        Self {
            kind,
            periods: Vec::new(),
            line_items: BTreeMap::new(),
        }
    }

    /// Whether the statement has no periods.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Value of `item` for the period ending on `period`.
    pub fn value(&self, item: &str, period: NaiveDate) -> Option<f64> {
        let index = self.periods.iter().position(|p| *p == period)?;
        self.line_items.get(item)?.get(index).copied().flatten()
    }

    /// Convert to a Polars DataFrame.
    ///
    /// The frame has a `line_item` column followed by one `Float64` column per
    /// period, named after the period end date.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let names: Vec<&str> = self.line_items.keys().map(String::as_str).collect();
        let mut columns: Vec<Column> = vec![Series::new("line_item".into(), names).into()];

        for (index, period) in self.periods.iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .line_items
                .values()
                .map(|cells| cells.get(index).copied().flatten())
                .collect();
            columns.push(Series::new(period.to_string().into(), values).into());
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Profile and statements of one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFundamentals {
    /// Company profile
    pub profile: CompanyProfile,
    /// Annual income statements
    pub income_statement: FinancialStatement,
    /// Annual balance sheets
    pub balance_sheet: FinancialStatement,
    /// Annual cash flow statements
    pub cash_flow: FinancialStatement,
}

impl CompanyFundamentals {
    /// Statements in display order.
    pub const fn statements(&self) -> [&FinancialStatement; 3] {
        [&self.income_statement, &self.balance_sheet, &self.cash_flow]
    }
}

/// Yahoo Finance fundamentals provider.
///
/// `quoteSummary` only answers requests that carry a session cookie and the
/// matching crumb token. The first request runs the handshake and the crumb
/// is reused until Yahoo rejects it.
#[derive(Debug)]
pub struct YahooFundamentalsProvider {
    client: reqwest::Client,
    crumb: Mutex<Option<String>>,
    rate_limit_delay: Duration,
}

impl YahooFundamentalsProvider {
    /// Create a new Yahoo Finance fundamentals provider.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Network`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(1000))
    }

    /// Create a new provider with custom rate limiting.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Network`] if the HTTP client cannot be built.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
                .cookie_store(true)
                .build()?,
            crumb: Mutex::new(None),
            rate_limit_delay,
        })
    }

    /// Fetch profile and financial statements for a single symbol.
    ///
    /// # Errors
    ///
    /// Fails on an empty symbol, a failed handshake, a request error, or an
    /// error reported by Yahoo ([`DataError::YahooApi`]).
    pub async fn fetch_fundamentals(&self, symbol: &str) -> Result<CompanyFundamentals> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let (mut status, mut body) = self.request_summary(symbol).await?;
        if status == StatusCode::UNAUTHORIZED {
            debug!(symbol, "crumb rejected, renewing session");
            self.crumb.lock().await.take();
            (status, body) = self.request_summary(symbol).await?;
        }

        if !status.is_success() {
            return Err(summary_error(&body).map_or_else(
                || DataError::Http(format!("{} for {}", status, symbol)),
                DataError::YahooApi,
            ));
        }

        parse_quote_summary(symbol, &body)
    }

    async fn request_summary(&self, symbol: &str) -> Result<(StatusCode, Value)> {
        let crumb = self.crumb().await?;

        debug!(symbol, "fetching quote summary");
        let response = self
            .client
            .get(format!("{}/{}", QUOTE_SUMMARY_URL, symbol))
            .query(&[("modules", MODULES), ("crumb", crumb.as_str())])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        sleep(self.rate_limit_delay).await;

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(DataError::Parse(format!("quoteSummary body: {}", e)));
            }
            Err(_) => Value::Null,
        };
        Ok((status, body))
    }

    /// Current crumb, running the cookie handshake if there is none.
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        debug!("starting Yahoo session");
        // answers 404 but sets the session cookie
        self.client.get(SESSION_URL).send().await?;
        let response = self.client.get(CRUMB_URL).send().await?;
        let status = response.status();
        let crumb = parse_crumb(status, &response.text().await?)?;

        *cached = Some(crumb.clone());
        Ok(crumb)
    }
}

fn parse_crumb(status: StatusCode, text: &str) -> Result<String> {
    let crumb = text.trim();
    if !status.is_success() || crumb.is_empty() || crumb.contains(&['<', '{', ' '][..]) {
        return Err(DataError::YahooApi(format!(
            "crumb request failed with status {}",
            status
        )));
    }
    Ok(crumb.to_string())
}

impl FundamentalsSource for YahooFundamentalsProvider {
    async fn fetch_company(&self, symbol: &str) -> Result<CompanyFundamentals> {
        self.fetch_fundamentals(symbol).await
    }
}

/// Parse a `quoteSummary` response body.
///
/// Modules absent from the body produce empty profile fields or empty
/// statements rather than errors.
///
/// # Errors
///
/// Returns [`DataError::YahooApi`] if the body carries an API error,
/// [`DataError::MissingData`] if it has no result, and [`DataError::Parse`]
/// if a statement period cannot be dated.
pub fn parse_quote_summary(symbol: &str, body: &Value) -> Result<CompanyFundamentals> {
    if let Some(message) = summary_error(body) {
        return Err(DataError::YahooApi(message));
    }

    let result = body
        .pointer("/quoteSummary/result/0")
        .filter(|r| r.is_object())
        .ok_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "quoteSummary returned no result".to_string(),
        })?;

    let price = result.get("price");
    let asset_profile = result.get("assetProfile");

    let profile = CompanyProfile {
        symbol: symbol.to_string(),
        short_name: text(price, "shortName"),
        industry: text(asset_profile, "industry"),
        sector: text(asset_profile, "sector"),
        country: text(asset_profile, "country"),
        market_cap: price.and_then(|p| p.get("marketCap")).and_then(number),
        business_summary: text(asset_profile, "longBusinessSummary"),
    };

    Ok(CompanyFundamentals {
        profile,
        income_statement: parse_statement(StatementKind::Income, result)?,
        balance_sheet: parse_statement(StatementKind::BalanceSheet, result)?,
        cash_flow: parse_statement(StatementKind::CashFlow, result)?,
    })
}

/// Error reported in the body, under `quoteSummary` or the generic `finance`
/// envelope used for authentication failures.
fn summary_error(body: &Value) -> Option<String> {
    let error = ["/quoteSummary/error", "/finance/error"]
        .iter()
        .find_map(|path| body.pointer(path).filter(|e| !e.is_null()))?;
    Some(
        error
            .get("description")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string),
    )
}

fn text(module: Option<&Value>, key: &str) -> Option<String> {
    module?
        .get(key)?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Numeric value either inline or wrapped as `{"raw": ..., "fmt": ...}`.
fn number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.get("raw").and_then(Value::as_f64))
}

fn parse_statement(kind: StatementKind, result: &Value) -> Result<FinancialStatement> {
    let (module, list) = kind.module_keys();
    let Some(entries) = result
        .get(module)
        .and_then(|m| m.get(list))
        .and_then(Value::as_array)
    else {
        return Ok(FinancialStatement::empty(kind));
    };

    let mut dated: Vec<(NaiveDate, &Map<String, Value>)> = Vec::new();
    for entry in entries {
        let Some(fields) = entry.as_object() else {
            continue;
        };
        let Some(timestamp) = fields
            .get("endDate")
            .and_then(|d| d.get("raw"))
            .and_then(Value::as_i64)
        else {
            continue;
        };
        let period = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| DataError::Parse(format!("invalid period end: {}", timestamp)))?
            .date_naive();
        dated.push((period, fields));
    }
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    let periods: Vec<NaiveDate> = dated.iter().map(|(period, _)| *period).collect();
    let mut line_items: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for (index, (_, fields)) in dated.iter().enumerate() {
        for (name, value) in *fields {
            if SKIPPED_FIELDS.contains(&name.as_str()) || !value.is_object() {
                continue;
            }
            let cells = line_items
                .entry(name.clone())
                .or_insert_with(|| vec![None; periods.len()]);
            cells[index] = number(value);
        }
    }

    Ok(FinancialStatement {
        kind,
        periods,
        line_items,
    })
}
