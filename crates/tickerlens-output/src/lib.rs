#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tickerlens/tickerlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chart;
pub mod export;
pub mod format;
pub mod report;

pub use chart::{ChartError, LineChart, LineSeries};
pub use export::{ExportError, ExportFormat, Exporter};
pub use report::{Report, ReportBuilder, ReportError};
