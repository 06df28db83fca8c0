#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tickerlens/tickerlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dashboard;

// Re-export main types from sub-crates
pub use tickerlens_data as data;
pub use tickerlens_output as output;
pub use tickerlens_returns as returns;

pub use config::{DEFAULT_BENCHMARK_LABEL, DEFAULT_BENCHMARK_SYMBOL, DEFAULT_TICKER, DashboardConfig};
pub use dashboard::{Dashboard, FetchFailure, FetchStage, build_dashboard, normalize_symbol};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
