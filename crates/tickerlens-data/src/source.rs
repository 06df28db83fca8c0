//! Acquisition seams consumed by the dashboard pipeline.

use crate::error::{DataError, Result};
use crate::yahoo::fundamentals::CompanyFundamentals;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tickerlens_returns::PriceSeries;

/// Historical span to fetch, in whole years.
///
/// Serialized as the bare year count; deserializing goes through
/// [`LookbackWindow::new`], so zero is rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LookbackWindow {
    years: u32,
}

impl LookbackWindow {
    /// Default lookback of five years.
    pub const DEFAULT_YEARS: u32 = 5;

    /// Create a window of `years` years.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidLookback`] if `years` is zero.
    pub fn new(years: u32) -> Result<Self> {
        if years == 0 {
            return Err(DataError::InvalidLookback(years));
        }
        Ok(Self { years })
    }

    /// Number of years covered.
    pub const fn years(&self) -> u32 {
        self.years
    }

    /// The `[start, end]` range of this window ending at `end`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::TimeConversion`] if the start falls outside the
    /// representable date range.
    pub fn range_ending(&self, end: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let start = end
            .checked_sub_months(Months::new(self.years.saturating_mul(12)))
            .ok_or_else(|| {
                DataError::TimeConversion(format!(
                    "{} years before {} is out of range",
                    self.years,
                    end.to_rfc3339()
                ))
            })?;
        Ok((start, end))
    }

    /// The range of this window ending now.
    ///
    /// # Errors
    ///
    /// See [`Self::range_ending`].
    pub fn range_until_now(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        self.range_ending(Utc::now())
    }
}

impl TryFrom<u32> for LookbackWindow {
    type Error = DataError;

    fn try_from(years: u32) -> Result<Self> {
        Self::new(years)
    }
}

impl From<LookbackWindow> for u32 {
    fn from(window: LookbackWindow) -> Self {
        window.years
    }
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self {
            years: Self::DEFAULT_YEARS,
        }
    }
}

/// A provider of daily closing prices.
pub trait PriceSource {
    /// Fetch the closing price history of `symbol` over `window`.
    fn fetch_price_series(
        &self,
        symbol: &str,
        window: LookbackWindow,
    ) -> impl Future<Output = Result<PriceSeries>> + Send;
}

/// A provider of company profile and financial statements.
pub trait FundamentalsSource {
    /// Fetch the fundamentals of `symbol`.
    fn fetch_company(&self, symbol: &str) -> impl Future<Output = Result<CompanyFundamentals>> + Send;
}
