//! Dashboard configuration.

use crate::data::{LookbackWindow, Result};
use serde::{Deserialize, Serialize};

/// Ticker shown when none is given.
pub const DEFAULT_TICKER: &str = "AAPL";

/// Yahoo Finance symbol of the S&P 500 index.
pub const DEFAULT_BENCHMARK_SYMBOL: &str = "^GSPC";

/// Display name of the default benchmark.
pub const DEFAULT_BENCHMARK_LABEL: &str = "S&P 500";

/// Settings shared by every dashboard run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Symbol of the benchmark index
    pub benchmark_symbol: String,
    /// Display name of the benchmark
    pub benchmark_label: String,
    /// Price history span for both series
    pub lookback: LookbackWindow,
}

impl DashboardConfig {
    /// Use a different benchmark.
    pub fn with_benchmark(mut self, symbol: impl Into<String>, label: impl Into<String>) -> Self {
        self.benchmark_symbol = symbol.into();
        self.benchmark_label = label.into();
        self
    }

    /// Use a lookback of `years` years.
    ///
    /// # Errors
    ///
    /// Returns [`crate::data::DataError::InvalidLookback`] if `years` is zero.
    pub fn with_lookback_years(mut self, years: u32) -> Result<Self> {
        self.lookback = LookbackWindow::new(years)?;
        Ok(self)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            benchmark_symbol: DEFAULT_BENCHMARK_SYMBOL.to_string(),
            benchmark_label: DEFAULT_BENCHMARK_LABEL.to_string(),
            lookback: LookbackWindow::default(),
        }
    }
}
