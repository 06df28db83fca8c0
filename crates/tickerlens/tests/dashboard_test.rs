//! End-to-end dashboard runs against in-memory data sources.

use chrono::NaiveDate;
use std::collections::HashMap;
use tickerlens::data::yahoo::{
    CompanyFundamentals, CompanyProfile, FinancialStatement, StatementKind,
};
use tickerlens::data::{DataError, FundamentalsSource, LookbackWindow, PriceSource};
use tickerlens::returns::{PriceSeries, ReturnCell, ReturnError};
use tickerlens::{DashboardConfig, FetchStage, build_dashboard};

#[derive(Default)]
struct StubPrices {
    series: HashMap<String, Vec<(NaiveDate, f64)>>,
}

impl StubPrices {
    fn with(mut self, symbol: &str, pairs: &[(i32, u32, u32, f64)]) -> Self {
        let points = pairs
            .iter()
            .map(|&(y, m, d, p)| (NaiveDate::from_ymd_opt(y, m, d).unwrap(), p))
            .collect();
        self.series.insert(symbol.to_string(), points);
        self
    }
}

impl PriceSource for StubPrices {
    async fn fetch_price_series(
        &self,
        symbol: &str,
        _window: LookbackWindow,
    ) -> tickerlens::data::Result<PriceSeries> {
        self.series
            .get(symbol)
            .map(|pairs| PriceSeries::from_pairs(symbol, pairs.iter().copied()))
            .ok_or_else(|| DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "no quotes".to_string(),
            })
    }
}

struct StubFundamentals {
    available: bool,
}

impl FundamentalsSource for StubFundamentals {
    async fn fetch_company(&self, symbol: &str) -> tickerlens::data::Result<CompanyFundamentals> {
        if !self.available {
            return Err(DataError::Http("status 404".to_string()));
        }
        Ok(CompanyFundamentals {
            profile: CompanyProfile {
                symbol: symbol.to_string(),
                short_name: Some("Apple Inc.".to_string()),
                sector: Some("Technology".to_string()),
                market_cap: Some(3_000_000_000_000.0),
                ..CompanyProfile::default()
            },
            income_statement: FinancialStatement::empty(StatementKind::Income),
            balance_sheet: FinancialStatement::empty(StatementKind::BalanceSheet),
            cash_flow: FinancialStatement::empty(StatementKind::CashFlow),
        })
    }
}

fn prices() -> StubPrices {
    StubPrices::default()
        .with(
            "AAPL",
            &[
                (2022, 1, 3, 100.0),
                (2022, 12, 30, 110.0),
                (2023, 1, 3, 110.0),
                (2023, 12, 29, 99.0),
            ],
        )
        .with(
            "^GSPC",
            &[
                (2023, 1, 3, 200.0),
                (2023, 12, 29, 250.0),
                (2024, 1, 2, 250.0),
                (2024, 12, 31, 300.0),
            ],
        )
}

#[tokio::test]
async fn test_full_dashboard() {
    let config = DashboardConfig::default();
    let dashboard = build_dashboard(
        &prices(),
        &StubFundamentals { available: true },
        " aapl ",
        &config,
    )
    .await;

    assert_eq!(dashboard.symbol, "AAPL");
    assert!(dashboard.failures.is_empty());
    assert_eq!(
        dashboard.fundamentals.as_ref().unwrap().profile.short_name.as_deref(),
        Some("Apple Inc.")
    );

    let comparison = dashboard.comparison.as_ref().unwrap();
    assert_eq!(comparison.years(), vec![2022, 2023, 2024]);

    let r2022 = comparison.row(2022).unwrap();
    assert!((r2022.subject.value().unwrap() - 10.0).abs() < 1e-9);
    assert_eq!(r2022.benchmark, ReturnCell::Missing);

    let r2023 = comparison.row(2023).unwrap();
    assert!((r2023.subject.value().unwrap() + 10.0).abs() < 1e-9);
    assert!((r2023.benchmark.value().unwrap() - 25.0).abs() < 1e-9);

    let r2024 = comparison.row(2024).unwrap();
    assert_eq!(r2024.subject, ReturnCell::Missing);
    assert!((r2024.benchmark.value().unwrap() - 20.0).abs() < 1e-9);

    let chart = dashboard.chart(&config).unwrap();
    assert_eq!(chart.x, vec![2022, 2023, 2024]);

    let text = dashboard.report(&config).unwrap().to_ascii();
    assert!(text.contains("Displaying Data for AAPL"));
    assert!(text.contains("Apple Inc."));
    assert!(!text.contains("Notes:"));
}

#[tokio::test]
async fn test_benchmark_failure_keeps_subject() {
    let config = DashboardConfig::default().with_benchmark("^IXIC", "Nasdaq");
    let dashboard = build_dashboard(
        &prices(),
        &StubFundamentals { available: true },
        "AAPL",
        &config,
    )
    .await;

    assert!(dashboard.subject_returns.is_some());
    assert!(dashboard.benchmark_returns.is_none());
    assert!(dashboard.comparison.is_none());
    assert!(dashboard.chart(&config).is_none());

    assert_eq!(dashboard.failures.len(), 1);
    assert_eq!(dashboard.failures[0].stage, FetchStage::BenchmarkPrices);
    assert_eq!(dashboard.failures[0].symbol, "^IXIC");

    let report = dashboard.report(&config).unwrap();
    assert_eq!(report.notes.len(), 1);
    assert!(report.notes[0].contains("^IXIC"));
}

#[tokio::test]
async fn test_fundamentals_failure_keeps_returns() {
    let config = DashboardConfig::default();
    let dashboard = build_dashboard(
        &prices(),
        &StubFundamentals { available: false },
        "AAPL",
        &config,
    )
    .await;

    assert!(dashboard.fundamentals.is_none());
    assert!(dashboard.comparison.is_some());
    assert_eq!(dashboard.failures.len(), 1);
    assert_eq!(dashboard.failures[0].stage, FetchStage::Fundamentals);
    assert!(dashboard.failures[0].reason.contains("404"));
}

#[tokio::test]
async fn test_unknown_ticker() {
    let config = DashboardConfig::default();
    let dashboard = build_dashboard(
        &prices(),
        &StubFundamentals { available: false },
        "zzzz",
        &config,
    )
    .await;

    assert_eq!(dashboard.symbol, "ZZZZ");
    assert!(dashboard.is_empty());
    assert!(dashboard.comparison.is_none());
    let stages: Vec<FetchStage> = dashboard.failures.iter().map(|f| f.stage).collect();
    assert_eq!(
        stages,
        vec![FetchStage::Fundamentals, FetchStage::SubjectPrices]
    );
}

#[tokio::test]
async fn test_blank_ticker() {
    let dashboard = build_dashboard(
        &prices(),
        &StubFundamentals { available: true },
        "   ",
        &DashboardConfig::default(),
    )
    .await;

    assert!(dashboard.is_empty());
    assert_eq!(dashboard.failures.len(), 1);
    assert_eq!(dashboard.failures[0].stage, FetchStage::Symbol);
}

#[tokio::test]
async fn test_zero_price_year_is_undefined() {
    let prices = prices().with(
        "PENNY",
        &[
            (2023, 1, 3, 0.0),
            (2023, 12, 29, 1.0),
            (2024, 1, 2, 1.0),
            (2024, 12, 31, 2.0),
        ],
    );
    let config = DashboardConfig::default();
    let dashboard = build_dashboard(
        &prices,
        &StubFundamentals { available: true },
        "penny",
        &config,
    )
    .await;

    let comparison = dashboard.comparison.as_ref().unwrap();
    assert_eq!(
        comparison.row(2023).unwrap().subject,
        ReturnCell::Undefined(ReturnError::DivisionByZero { year: 2023 })
    );
    assert!((comparison.row(2024).unwrap().subject.value().unwrap() - 100.0).abs() < 1e-9);

    let markdown = dashboard.report(&config).unwrap().to_markdown();
    assert!(markdown.contains("undefined"));
}
