//! Daily closing price series.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub price: f64,
}

impl PricePoint {
    /// Create a new price observation.
    pub const fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    /// Calendar year of the observation.
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Closing price history of one security or index.
///
/// Observations are kept in the order they were supplied. Consumers that
/// need chronological order must compare dates rather than rely on position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create an empty series for `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    /// Create a series from `(date, price)` pairs in any order.
    pub fn from_pairs<I>(symbol: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self {
            symbol: symbol.into(),
            points: pairs
                .into_iter()
                .map(|(date, price)| PricePoint::new(date, price))
                .collect(),
        }
    }

    /// Append an observation.
    pub fn push(&mut self, date: NaiveDate, price: f64) {
        self.points.push(PricePoint::new(date, price));
    }

    /// Symbol the prices belong to.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Observations in input order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest and latest observation dates, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.points.iter().map(|p| p.date).min()?;
        let last = self.points.iter().map(|p| p.date).max()?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_pairs_keeps_input_order() {
        let series = PriceSeries::from_pairs(
            "AAPL",
            [(date(2021, 3, 1), 2.0), (date(2020, 1, 2), 1.0)],
        );

        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].date, date(2021, 3, 1));
        assert_eq!(series.points()[1].year(), 2020);
    }

    #[test]
    fn test_date_range_unsorted() {
        let mut series = PriceSeries::new("^GSPC");
        assert!(series.is_empty());
        assert_eq!(series.date_range(), None);

        series.push(date(2022, 6, 1), 10.0);
        series.push(date(2020, 2, 3), 11.0);
        series.push(date(2023, 1, 3), 12.0);

        assert_eq!(
            series.date_range(),
            Some((date(2020, 2, 3), date(2023, 1, 3)))
        );
    }
}
