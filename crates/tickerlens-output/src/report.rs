//! Report generation for the Tickerlens dashboard.
//!
//! A [`Report`] gathers whatever sections were available for a ticker and
//! renders them as plain text, Markdown or JSON. Absent sections are skipped
//! and the reason is listed under the notes.

use crate::format::{line_item_label, market_cap, or_na, return_cell, thousands};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tickerlens_data::yahoo::{CompanyFundamentals, CompanyProfile, FinancialStatement};
use tickerlens_returns::ComparisonSeries;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The report has no symbol.
    #[error("Report is missing a symbol")]
    MissingSymbol,
}

/// A dashboard report for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Symbol being analyzed.
    pub symbol: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Lookback period in years.
    pub period_years: u32,

    /// Display name of the benchmark.
    pub benchmark_label: String,

    /// Company profile and statements, when fetched.
    pub fundamentals: Option<CompanyFundamentals>,

    /// Annual return comparison, when both price histories were fetched.
    pub comparison: Option<ComparisonSeries>,

    /// Reasons for missing sections.
    pub notes: Vec<String>,
}

impl Report {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as plain text with fixed-width tables.
    pub fn to_ascii(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nDisplaying Data for {}\n", self.symbol));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        if let Some(fundamentals) = &self.fundamentals {
            output.push_str(&format!("\nCompany Information for {}\n", self.symbol));
            output.push_str(&profile_table(&fundamentals.profile).render_ascii());
            output.push_str(&format!(
                "\nBusiness Summary: {}\n",
                or_na(fundamentals.profile.business_summary.as_deref())
            ));

            for statement in fundamentals.statements() {
                output.push_str(&format!("\n{}\n", statement.kind.title()));
                if statement.is_empty() {
                    output.push_str("No data available\n");
                } else {
                    output.push_str(&statement_table(statement).render_ascii());
                }
            }
        }

        if let Some(comparison) = &self.comparison {
            output.push_str(&format!("\n{}\n", self.comparison_heading()));
            output.push_str(&comparison_table(comparison, &self.benchmark_label).render_ascii());
            output.push_str(&self.summary_line(comparison));
            output.push('\n');
        }

        if !self.notes.is_empty() {
            output.push_str("\nNotes:\n");
            for note in &self.notes {
                output.push_str(&format!("  - {}\n", note));
            }
        }

        output
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Displaying Data for **{}**\n\n", self.symbol));
        output.push_str(&format!(
            "*Generated: {} | Period: {} years*\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.period_years
        ));

        if let Some(fundamentals) = &self.fundamentals {
            output.push_str(&format!("## Company Information for **{}**\n\n", self.symbol));
            output.push_str(&profile_table(&fundamentals.profile).render_markdown());
            output.push_str(&format!(
                "\n**Business Summary:** {}\n",
                or_na(fundamentals.profile.business_summary.as_deref())
            ));

            for statement in fundamentals.statements() {
                output.push_str(&format!("\n## {}\n\n", statement.kind.title()));
                if statement.is_empty() {
                    output.push_str("*No data available*\n");
                } else {
                    output.push_str(&statement_table(statement).render_markdown());
                }
            }
        }

        if let Some(comparison) = &self.comparison {
            output.push_str(&format!("\n## {}\n\n", self.comparison_heading()));
            output.push_str(&comparison_table(comparison, &self.benchmark_label).render_markdown());
            output.push_str(&format!("\n{}\n", self.summary_line(comparison)));
        }

        if !self.notes.is_empty() {
            output.push_str("\n## Notes\n\n");
            for note in &self.notes {
                output.push_str(&format!("- {}\n", note));
            }
        }

        output
    }

    fn comparison_heading(&self) -> String {
        format!(
            "Annual Stock Performance vs {} (Percentage Returns) for {}",
            self.benchmark_label, self.symbol
        )
    }

    fn summary_line(&self, comparison: &ComparisonSeries) -> String {
        let summary = comparison.summary();
        match summary.mean_excess {
            Some(mean) => format!(
                "{} outperformed {} in {} of {} comparable years (mean excess {:+.2} pp)",
                self.symbol,
                self.benchmark_label,
                summary.years_outperformed,
                summary.years_compared,
                mean
            ),
            None => "No year has returns for both series".to_string(),
        }
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    symbol: Option<String>,
    period_years: Option<u32>,
    benchmark_label: Option<String>,
    fundamentals: Option<CompanyFundamentals>,
    comparison: Option<ComparisonSeries>,
    notes: Vec<String>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the lookback period.
    pub const fn period_years(mut self, years: u32) -> Self {
        self.period_years = Some(years);
        self
    }

    /// Set the benchmark display name.
    pub fn benchmark_label(mut self, label: impl Into<String>) -> Self {
        self.benchmark_label = Some(label.into());
        self
    }

    /// Set the company fundamentals.
    pub fn fundamentals(mut self, fundamentals: Option<CompanyFundamentals>) -> Self {
        self.fundamentals = fundamentals;
        self
    }

    /// Set the annual return comparison.
    pub fn comparison(mut self, comparison: Option<ComparisonSeries>) -> Self {
        self.comparison = comparison;
        self
    }

    /// Append a note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        let symbol = self
            .symbol
            .filter(|s| !s.is_empty())
            .ok_or(ReportError::MissingSymbol)?;

        Ok(Report {
            symbol,
            timestamp: Utc::now(),
            period_years: self.period_years.unwrap_or(5),
            benchmark_label: self
                .benchmark_label
                .unwrap_or_else(|| "Benchmark".to_string()),
            fundamentals: self.fundamentals,
            comparison: self.comparison,
            notes: self.notes,
        })
    }
}

/// Simple table rendered either fixed-width or as Markdown.
#[derive(Debug)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .fold(header.chars().count(), usize::max)
            })
            .collect()
    }

    fn render_ascii(&self) -> String {
        let widths = self.widths();
        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let line = |cells: &[String]| {
            let mut out = String::new();
            for (i, (cell, width)) in cells.iter().zip(&widths).enumerate() {
                if i == 0 {
                    out.push_str(&format!("{:<width$}", cell, width = *width));
                } else {
                    out.push_str(&format!("  {:>width$}", cell, width = *width));
                }
            }
            out.push('\n');
            out
        };

        let mut output = line(&self.headers);
        output.push_str(&"-".repeat(total));
        output.push('\n');
        for row in &self.rows {
            output.push_str(&line(row));
        }
        output
    }

    fn render_markdown(&self) -> String {
        let mut output = format!("| {} |\n", self.headers.join(" | "));
        output.push('|');
        for (i, _) in self.headers.iter().enumerate() {
            output.push_str(if i == 0 { "---|" } else { "---:|" });
        }
        output.push('\n');
        for row in &self.rows {
            output.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        output
    }
}

fn profile_table(profile: &CompanyProfile) -> Table {
    let field = |name: &str, value: String| vec![name.to_string(), value];
    Table {
        headers: vec!["Field".to_string(), "Value".to_string()],
        rows: vec![
            field("Company Name", or_na(profile.short_name.as_deref()).to_string()),
            field("Industry", or_na(profile.industry.as_deref()).to_string()),
            field("Sector", or_na(profile.sector.as_deref()).to_string()),
            field("Country", or_na(profile.country.as_deref()).to_string()),
            field("Market Cap", market_cap(profile.market_cap)),
        ],
    }
}

fn statement_table(statement: &FinancialStatement) -> Table {
    let mut headers = vec!["Line Item".to_string()];
    headers.extend(statement.periods.iter().map(|p| p.to_string()));

    let rows = statement
        .line_items
        .iter()
        .map(|(name, cells)| {
            let mut row = vec![line_item_label(name)];
            row.extend(
                cells
                    .iter()
                    .map(|cell| cell.map_or_else(|| "-".to_string(), thousands)),
            );
            row
        })
        .collect();

    Table { headers, rows }
}

fn comparison_table(comparison: &ComparisonSeries, benchmark_label: &str) -> Table {
    Table {
        headers: vec![
            "Year".to_string(),
            comparison.subject_symbol.clone(),
            benchmark_label.to_string(),
            "Excess".to_string(),
        ],
        rows: comparison
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.year.to_string(),
                    return_cell(&row.subject),
                    return_cell(&row.benchmark),
                    row.excess()
                        .map_or_else(|| "-".to_string(), |e| format!("{:+.2}", e)),
                ]
            })
            .collect(),
    }
}
