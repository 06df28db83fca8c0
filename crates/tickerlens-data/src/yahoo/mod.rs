//! Yahoo Finance data providers.

pub mod fundamentals;
pub mod quotes;

pub use fundamentals::{
    CompanyFundamentals, CompanyProfile, FinancialStatement, StatementKind,
    YahooFundamentalsProvider, parse_quote_summary,
};
pub use quotes::{ADJUSTED_CLOSE, YahooQuoteProvider, price_series_from_quotes};
