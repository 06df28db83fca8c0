//! Year-aligned comparison of a security against its benchmark.
//!
//! The join is an outer join on year: a year covered by only one side is kept
//! with a [`ReturnCell::Missing`] marker on the other side. Hiding
//! partial-coverage years would make the comparison look more complete than
//! it is.

use crate::annual::AnnualReturns;
use crate::error::ReturnError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One side of a comparison row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ReturnCell {
    /// Percentage return for the year
    Value(f64),
    /// The year is not covered by this side's price history
    Missing,
    /// The year is covered but its return is undefined
    Undefined(ReturnError),
}

impl ReturnCell {
    fn lookup(returns: &AnnualReturns, year: i32) -> Self {
        match returns.get(year) {
            Some(Ok(value)) => Self::Value(value),
            Some(Err(e)) => Self::Undefined(e),
            None => Self::Missing,
        }
    }

    /// The percentage return, if defined.
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Missing | Self::Undefined(_) => None,
        }
    }

    /// Whether this side has no observation for the year.
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Returns of both sides for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Calendar year
    pub year: i32,
    /// Return of the analysed security
    pub subject: ReturnCell,
    /// Return of the benchmark
    pub benchmark: ReturnCell,
}

impl ComparisonRow {
    /// Subject return minus benchmark return, when both are defined.
    pub fn excess(&self) -> Option<f64> {
        Some(self.subject.value()? - self.benchmark.value()?)
    }
}

/// Aggregate view over the years where both returns are defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// Years with both returns defined
    pub years_compared: usize,
    /// Years the subject beat the benchmark
    pub years_outperformed: usize,
    /// Mean of the yearly excess returns, in percentage points
    pub mean_excess: Option<f64>,
}

/// Subject and benchmark annual returns aligned by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSeries {
    /// Symbol of the analysed security
    pub subject_symbol: String,
    /// Symbol of the benchmark
    pub benchmark_symbol: String,
    /// Rows ordered by ascending year
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonSeries {
    /// Years covered by either side, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|r| r.year).collect()
    }

    /// Subject returns aligned with [`Self::years`].
    pub fn subject_values(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.subject.value()).collect()
    }

    /// Benchmark returns aligned with [`Self::years`].
    pub fn benchmark_values(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.benchmark.value()).collect()
    }

    /// Row for `year`, if covered.
    pub fn row(&self, year: i32) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.year == year)
    }

    /// Whether neither side covers any year.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Summarise outperformance over the comparable years.
    pub fn summary(&self) -> ComparisonSummary {
        let excess: Vec<f64> = self.rows.iter().filter_map(ComparisonRow::excess).collect();
        let mean_excess = if excess.is_empty() {
            None
        } else {
            Some(excess.iter().sum::<f64>() / excess.len() as f64)
        };

        ComparisonSummary {
            years_compared: excess.len(),
            years_outperformed: excess.iter().filter(|e| **e > 0.0).count(),
            mean_excess,
        }
    }
}

/// Outer-join two annual return collections by year.
pub fn compare_returns(subject: &AnnualReturns, benchmark: &AnnualReturns) -> ComparisonSeries {
    let years: BTreeSet<i32> = subject.years().chain(benchmark.years()).collect();

    let rows = years
        .into_iter()
        .map(|year| ComparisonRow {
            year,
            subject: ReturnCell::lookup(subject, year),
            benchmark: ReturnCell::lookup(benchmark, year),
        })
        .collect();

    ComparisonSeries {
        subject_symbol: subject.symbol.clone(),
        benchmark_symbol: benchmark.symbol.clone(),
        rows,
    }
}
