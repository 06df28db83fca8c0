#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tickerlens/tickerlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod annual;
pub mod compare;
pub mod error;
pub mod resample;
pub mod series;

pub use annual::{AnnualReturns, annual_return, calculate_annual_returns};
pub use compare::{ComparisonRow, ComparisonSeries, ComparisonSummary, ReturnCell, compare_returns};
pub use error::{Result, ReturnError};
pub use resample::{YearBucket, resample_annual};
pub use series::{PricePoint, PriceSeries};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
