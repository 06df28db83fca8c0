//! One dashboard run for a ticker.
//!
//! The run is a straight line of stages: fetch fundamentals, fetch the two
//! price histories, compute annual returns for each, and join them. Nothing
//! is kept between runs; the caller re-invokes [`build_dashboard`] whenever
//! the ticker changes.

use crate::config::DashboardConfig;
use crate::data::yahoo::CompanyFundamentals;
use crate::data::{DataError, FundamentalsSource, PriceSource};
use crate::output::{LineChart, Report, ReportBuilder, ReportError};
use crate::returns::{AnnualReturns, ComparisonSeries, compare_returns};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

/// Pipeline stage that can fail to produce data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchStage {
    /// The ticker symbol itself was unusable
    Symbol,
    /// Company profile and statements
    Fundamentals,
    /// Price history of the analysed security
    SubjectPrices,
    /// Price history of the benchmark
    BenchmarkPrices,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Symbol => "ticker symbol",
            Self::Fundamentals => "fundamentals",
            Self::SubjectPrices => "price history",
            Self::BenchmarkPrices => "benchmark price history",
        };
        f.write_str(name)
    }
}

/// A section that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// Symbol that was requested
    pub symbol: String,
    /// Stage that failed
    pub stage: FetchStage,
    /// Error message from the data source
    pub reason: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unavailable for {}: {}",
            self.stage, self.symbol, self.reason
        )
    }
}

/// Everything shown for one ticker.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Normalized ticker symbol
    pub symbol: String,
    /// Company profile and statements
    pub fundamentals: Option<CompanyFundamentals>,
    /// Annual returns of the analysed security
    pub subject_returns: Option<AnnualReturns>,
    /// Annual returns of the benchmark
    pub benchmark_returns: Option<AnnualReturns>,
    /// Year-aligned comparison, present only when both price histories were fetched
    pub comparison: Option<ComparisonSeries>,
    /// Sections that could not be fetched
    pub failures: Vec<FetchFailure>,
}

impl Dashboard {
    /// Whether nothing about the requested ticker was fetched.
    ///
    /// Benchmark returns alone do not count: they are only shown next to the
    /// ticker's own returns.
    pub const fn is_empty(&self) -> bool {
        self.fundamentals.is_none() && self.subject_returns.is_none()
    }

    /// Chart of the comparison, if there is one.
    pub fn chart(&self, config: &DashboardConfig) -> Option<LineChart> {
        self.comparison
            .as_ref()
            .map(|c| LineChart::annual_returns(c, &config.benchmark_label))
    }

    /// Assemble a report from the available sections.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingSymbol`] if the dashboard has no symbol.
    pub fn report(&self, config: &DashboardConfig) -> Result<Report, ReportError> {
        self.failures
            .iter()
            .fold(
                ReportBuilder::new()
                    .symbol(self.symbol.clone())
                    .period_years(config.lookback.years())
                    .benchmark_label(config.benchmark_label.clone())
                    .fundamentals(self.fundamentals.clone())
                    .comparison(self.comparison.clone()),
                |builder, failure| builder.note(failure.to_string()),
            )
            .build()
    }
}

/// Trim and upper-case a ticker; `None` if nothing is left.
pub fn normalize_symbol(input: &str) -> Option<String> {
    let symbol = input.trim();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol.to_uppercase())
    }
}

/// Run every stage of the dashboard for `input`.
///
/// Fetch failures are recorded in [`Dashboard::failures`] and leave the
/// corresponding section empty; the comparison needs both price histories.
pub async fn build_dashboard<P, F>(
    prices: &P,
    fundamentals: &F,
    input: &str,
    config: &DashboardConfig,
) -> Dashboard
where
    P: PriceSource,
    F: FundamentalsSource,
{
    let Some(symbol) = normalize_symbol(input) else {
        return Dashboard {
            failures: vec![FetchFailure {
                symbol: input.to_string(),
                stage: FetchStage::Symbol,
                reason: "empty ticker symbol".to_string(),
            }],
            ..Dashboard::default()
        };
    };

    let mut failures = Vec::new();

    let company = acquire(
        fundamentals.fetch_company(&symbol),
        &symbol,
        FetchStage::Fundamentals,
        &mut failures,
    )
    .await;

    let subject = acquire(
        prices.fetch_price_series(&symbol, config.lookback),
        &symbol,
        FetchStage::SubjectPrices,
        &mut failures,
    )
    .await;

    let benchmark = acquire(
        prices.fetch_price_series(&config.benchmark_symbol, config.lookback),
        &config.benchmark_symbol,
        FetchStage::BenchmarkPrices,
        &mut failures,
    )
    .await;

    let subject_returns = subject.as_ref().map(AnnualReturns::from_series);
    let benchmark_returns = benchmark.as_ref().map(AnnualReturns::from_series);

    let comparison = match (&subject_returns, &benchmark_returns) {
        (Some(s), Some(b)) => {
            let comparison = compare_returns(s, b);
            debug!(
                symbol = %symbol,
                years = comparison.rows.len(),
                "annual returns compared"
            );
            Some(comparison)
        }
        _ => None,
    };

    Dashboard {
        symbol,
        fundamentals: company,
        subject_returns,
        benchmark_returns,
        comparison,
        failures,
    }
}

async fn acquire<T>(
    fetch: impl Future<Output = Result<T, DataError>>,
    symbol: &str,
    stage: FetchStage,
    failures: &mut Vec<FetchFailure>,
) -> Option<T> {
    match fetch.await {
        Ok(value) => {
            debug!(symbol, %stage, "fetched");
            Some(value)
        }
        Err(e) => {
            warn!(symbol, %stage, "fetch failed: {e}");
            failures.push(FetchFailure {
                symbol: symbol.to_string(),
                stage,
                reason: e.to_string(),
            });
            None
        }
    }
}
