//! Daily quote history from Yahoo Finance.
//!
//! Quotes arrive as a polars frame with one row per trading day:
//! `symbol, date, open, high, low, close, volume, adjusted_close`. Returns
//! are computed from `adjusted_close`, which folds in splits and dividends.

use crate::error::{DataError, Result};
use crate::source::{LookbackWindow, PriceSource};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use polars::prelude::*;
use std::time::Duration;
use tickerlens_returns::PriceSeries;
use tokio::time::sleep;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Price column used for return calculations.
pub const ADJUSTED_CLOSE: &str = "adjusted_close";

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Rate-limited client for the Yahoo Finance chart endpoint.
pub struct YahooQuoteProvider {
    connector: yahoo::YahooConnector,
    pause: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("pause", &self.pause)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Provider that waits one second after each request.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::YahooApi`] if the HTTP connector cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_secs(1))
    }

    /// Provider that waits `pause` after each request.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::YahooApi`] if the HTTP connector cannot be built.
    pub fn with_rate_limit(pause: Duration) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()?;
        Ok(Self { connector, pause })
    }

    /// Daily quotes of `symbol` between `start` and `end`.
    ///
    /// # Errors
    ///
    /// Fails on an empty symbol, a reversed range, a request error, or when
    /// Yahoo returns no rows ([`DataError::MissingData`]).
    pub async fn fetch_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DataFrame> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("empty symbol".to_string()));
        }
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        debug!(symbol, %start, %end, "requesting quote history");
        let history = self
            .connector
            .get_quote_history(symbol, offset_time(start)?, offset_time(end)?)
            .await?;
        sleep(self.pause).await;

        let quotes = history.quotes()?;
        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "quote history is empty".to_string(),
            });
        }

        let frame = quotes_frame(symbol, &quotes)?;
        debug!(symbol, rows = frame.height(), "quote history received");
        Ok(frame)
    }
}

impl PriceSource for YahooQuoteProvider {
    async fn fetch_price_series(&self, symbol: &str, window: LookbackWindow) -> Result<PriceSeries> {
        let (start, end) = window.range_until_now()?;
        let quotes = self.fetch_quotes(symbol, start, end).await?;
        price_series_from_quotes(symbol, &quotes, ADJUSTED_CLOSE)
    }
}

fn offset_time(at: DateTime<Utc>) -> Result<time::OffsetDateTime> {
    time::OffsetDateTime::from_unix_timestamp(at.timestamp())
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}

fn quotes_frame(symbol: &str, quotes: &[yahoo::Quote]) -> Result<DataFrame> {
    let mut days = Vec::with_capacity(quotes.len());
    for quote in quotes {
        let traded = DateTime::from_timestamp(quote.timestamp, 0).ok_or_else(|| {
            DataError::TimeConversion(format!("invalid quote timestamp {}", quote.timestamp))
        })?;
        days.push(traded.date_naive().num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE);
    }

    let column = |name: &str, pick: fn(&yahoo::Quote) -> f64| -> Column {
        Series::new(name.into(), quotes.iter().map(pick).collect::<Vec<f64>>()).into()
    };

    let frame = DataFrame::new(vec![
        Series::new("symbol".into(), vec![symbol; quotes.len()]).into(),
        Series::new("date".into(), days).cast(&DataType::Date)?.into(),
        column("open", |q| q.open),
        column("high", |q| q.high),
        column("low", |q| q.low),
        column("close", |q| q.close),
        Series::new(
            "volume".into(),
            quotes.iter().map(|q| q.volume).collect::<Vec<u64>>(),
        )
        .into(),
        column(ADJUSTED_CLOSE, |q| q.adjclose),
    ])?;
    Ok(frame)
}

/// Extract `(date, price)` pairs from a quotes frame.
///
/// `quotes` must carry a `date` column of type `Date` and a `Float64` column
/// named `price_column`. Rows where either value is null are skipped.
///
/// # Errors
///
/// Returns [`DataError::Polars`] if a column is absent or has the wrong type,
/// and [`DataError::Parse`] if a date cannot be represented.
pub fn price_series_from_quotes(
    symbol: &str,
    quotes: &DataFrame,
    price_column: &str,
) -> Result<PriceSeries> {
    let dates = quotes.column("date")?.cast(&DataType::Int32)?;
    let days = dates.i32()?;
    let prices = quotes.column(price_column)?.f64()?;

    let mut series = PriceSeries::new(symbol);
    for (day, price) in days.into_iter().zip(prices.into_iter()) {
        if let (Some(day), Some(price)) = (day, price) {
            series.push(date_from_epoch_days(day)?, price);
        }
    }

    Ok(series)
}

fn date_from_epoch_days(days: i32) -> Result<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| DataError::Parse(format!("date out of range: {} days since epoch", days)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration as ChronoDuration;

    fn adjusted_frame() -> DataFrame {
        let dates = Series::new("date".into(), vec![18_262i32, 18_627, 19_358])
            .cast(&DataType::Date)
            .unwrap();
        DataFrame::new(vec![
            Series::new("symbol".into(), vec!["AAPL"; 3]).into(),
            dates.into(),
            Series::new(ADJUSTED_CLOSE.into(), vec![Some(100.0), None, Some(120.0)]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_price_series_from_quotes() {
        let series = price_series_from_quotes("AAPL", &adjusted_frame(), ADJUSTED_CLOSE).unwrap();

        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.points()[0].date,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
        );
        assert_relative_eq!(series.points()[1].price, 120.0);
        assert_eq!(
            series.points()[1].date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_price_series_missing_column() {
        let result = price_series_from_quotes("AAPL", &adjusted_frame(), "close");
        assert!(matches!(result, Err(DataError::Polars(_))));
    }

    #[test]
    fn test_epoch_days() {
        assert_eq!(
            date_from_epoch_days(0).unwrap(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
        assert!(date_from_epoch_days(i32::MAX).is_err());
    }

    #[tokio::test]
    async fn test_reversed_range_rejected() {
        let provider = YahooQuoteProvider::new().unwrap();
        let start = Utc::now();
        let end = start - ChronoDuration::days(30);

        let result = provider.fetch_quotes("AAPL", start, end).await;
        assert!(matches!(result, Err(DataError::InvalidDateRange { .. })));
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected() {
        let provider = YahooQuoteProvider::new().unwrap();
        let end = Utc::now();
        let start = end - ChronoDuration::days(30);

        let result = provider.fetch_quotes("", start, end).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_fetch_quotes() {
        let provider = YahooQuoteProvider::new().unwrap();
        let end = Utc::now();
        let start = end - ChronoDuration::days(30);

        let df = provider.fetch_quotes("AAPL", start, end).await.unwrap();
        assert!(df.height() > 0);
        assert_eq!(
            df.get_column_names(),
            vec![
                "symbol",
                "date",
                "open",
                "high",
                "low",
                "close",
                "volume",
                ADJUSTED_CLOSE
            ]
        );
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_fetch_price_series() {
        let provider = YahooQuoteProvider::new().unwrap();
        let series = provider
            .fetch_price_series("^GSPC", LookbackWindow::new(1).unwrap())
            .await
            .unwrap();

        assert_eq!(series.symbol(), "^GSPC");
        assert!(series.len() > 200);
    }
}
