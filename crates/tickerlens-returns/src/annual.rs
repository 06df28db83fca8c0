//! Annual percentage returns.
//!
//! The return of a year is `(last - first) / first * 100`, expressed in
//! percent (`12.5` means 12.5%) and never rounded here. Years where the ratio
//! is undefined stay in the result as a [`ReturnError`] so that downstream
//! consumers see the gap instead of an infinite or NaN value.

use crate::error::{Result, ReturnError};
use crate::resample::{YearBucket, resample_annual};
use crate::series::PriceSeries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Percentage return of a single bucket.
///
/// # Errors
///
/// Returns [`ReturnError::NonFinitePrice`] if either price is NaN or
/// infinite, [`ReturnError::DivisionByZero`] if the first price is zero, and
/// [`ReturnError::ReturnOverflow`] if the first price is so small that the
/// ratio leaves the `f64` range.
pub fn annual_return(bucket: &YearBucket) -> Result<f64> {
    if !bucket.first_price.is_finite() || !bucket.last_price.is_finite() {
        return Err(ReturnError::NonFinitePrice { year: bucket.year });
    }
    if bucket.first_price == 0.0 {
        return Err(ReturnError::DivisionByZero { year: bucket.year });
    }

    let pct = (bucket.last_price - bucket.first_price) / bucket.first_price * 100.0;
    if !pct.is_finite() {
        return Err(ReturnError::ReturnOverflow { year: bucket.year });
    }
    Ok(pct)
}

/// Year-keyed percentage returns of one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualReturns {
    /// Symbol the returns belong to
    pub symbol: String,
    returns: BTreeMap<i32, Result<f64>>,
}

impl AnnualReturns {
    /// Create an empty collection for `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            returns: BTreeMap::new(),
        }
    }

    /// Resample `series` and compute the return of every year in it.
    pub fn from_series(series: &PriceSeries) -> Self {
        calculate_annual_returns(series.symbol(), &resample_annual(series))
    }

    /// Record the outcome for `year`, replacing any previous one.
    pub fn insert(&mut self, year: i32, value: Result<f64>) {
        self.returns.insert(year, value);
    }

    /// Outcome for `year`, or `None` if the year is not covered.
    pub fn get(&self, year: i32) -> Option<Result<f64>> {
        self.returns.get(&year).copied()
    }

    /// Covered years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.returns.keys().copied()
    }

    /// Years with a defined return, ascending.
    pub fn defined(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.returns
            .iter()
            .filter_map(|(year, value)| value.ok().map(|v| (*year, v)))
    }

    /// Years whose return is undefined, ascending.
    pub fn undefined(&self) -> impl Iterator<Item = ReturnError> + '_ {
        self.returns.values().filter_map(|value| value.err())
    }

    /// Number of covered years.
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Whether no year is covered.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

/// Compute the percentage return of every bucket.
///
/// Undefined years are logged and kept as errors; the calculation itself
/// never fails.
pub fn calculate_annual_returns(symbol: &str, buckets: &[YearBucket]) -> AnnualReturns {
    let mut returns = AnnualReturns::new(symbol);

    for bucket in buckets {
        let value = annual_return(bucket);
        if let Err(e) = value {
            warn!(symbol, year = bucket.year, "annual return undefined: {e}");
        }
        returns.insert(bucket.year, value);
    }

    returns
}
