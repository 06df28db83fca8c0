//! Tickerlens CLI binary.
//!
//! Shows company fundamentals and annual returns against a benchmark index.

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tickerlens::{
    DEFAULT_BENCHMARK_LABEL, DEFAULT_BENCHMARK_SYMBOL, DEFAULT_TICKER, Dashboard, DashboardConfig,
    build_dashboard,
};
use tickerlens_data::LookbackWindow;
use tickerlens_data::yahoo::{YahooFundamentalsProvider, YahooQuoteProvider};
use tickerlens_output::{ExportFormat, Exporter};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tickerlens")]
#[command(about = "Tickerlens: company fundamentals and annual returns vs a benchmark", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard for one ticker
    Show {
        /// Stock symbol
        #[arg(default_value = DEFAULT_TICKER)]
        ticker: String,

        #[command(flatten)]
        dashboard: DashboardArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the returns chart as SVG
        #[arg(long, value_name = "FILE")]
        chart: Option<PathBuf>,

        /// Write the returns chart as a Plotly figure (JSON)
        #[arg(long, value_name = "FILE")]
        plotly: Option<PathBuf>,

        /// Export the annual return comparison (.csv or .json)
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// Prompt for tickers and show a dashboard for each
    Watch {
        #[command(flatten)]
        dashboard: DashboardArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct DashboardArgs {
    /// Lookback period in years
    #[arg(long, default_value_t = LookbackWindow::DEFAULT_YEARS, env = "TICKERLENS_YEARS")]
    years: u32,

    /// Benchmark index symbol
    #[arg(long, default_value = DEFAULT_BENCHMARK_SYMBOL, env = "TICKERLENS_BENCHMARK")]
    benchmark: String,

    /// Benchmark display name (defaults to the symbol for non-default benchmarks)
    #[arg(long)]
    benchmark_label: Option<String>,
}

impl DashboardArgs {
    fn config(&self) -> tickerlens_data::Result<DashboardConfig> {
        let label = self.benchmark_label.clone().unwrap_or_else(|| {
            if self.benchmark == DEFAULT_BENCHMARK_SYMBOL {
                DEFAULT_BENCHMARK_LABEL.to_string()
            } else {
                self.benchmark.clone()
            }
        });
        DashboardConfig::default()
            .with_benchmark(self.benchmark.clone(), label)
            .with_lookback_years(self.years)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

/// Live data sources shared by every run in a session.
struct Sources {
    prices: YahooQuoteProvider,
    fundamentals: YahooFundamentalsProvider,
}

impl Sources {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            prices: YahooQuoteProvider::new()?,
            fundamentals: YahooFundamentalsProvider::new()?,
        })
    }

    async fn dashboard(
        &self,
        ticker: &str,
        config: &DashboardConfig,
    ) -> Result<Dashboard, Box<dyn std::error::Error>> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Fetching data for {}...", ticker.trim()));

        let dashboard = build_dashboard(&self.prices, &self.fundamentals, ticker, config).await;

        spinner.finish_and_clear();
        Ok(dashboard)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let sources = Sources::new()?;

    match cli.command {
        Commands::Show {
            ticker,
            dashboard,
            format,
            chart,
            plotly,
            export,
        } => {
            let config = dashboard.config()?;
            let dashboard = sources.dashboard(&ticker, &config).await?;
            print_dashboard(&dashboard, &config, format)?;
            write_artifacts(
                &dashboard,
                &config,
                chart.as_deref(),
                plotly.as_deref(),
                export.as_deref(),
            )?;
            if dashboard.is_empty() {
                return Err(format!("no data available for {}", ticker.trim()).into());
            }
        }
        Commands::Watch { dashboard, format } => {
            let config = dashboard.config()?;
            watch(&sources, &config, format).await?;
        }
    }

    Ok(())
}

async fn watch(
    sources: &Sources,
    config: &DashboardConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("Enter Stock Ticker: ");
        io::stdout().flush()?;

        let Some(ticker) = next_ticker(&mut lines).await? else {
            println!();
            break;
        };

        debug!(ticker = %ticker, "watch input");
        let dashboard = sources.dashboard(&ticker, config).await?;
        print_dashboard(&dashboard, config, format)?;
    }

    Ok(())
}

/// Next ticker typed at the prompt; `None` on EOF, an empty line or `quit`.
async fn next_ticker<R>(lines: &mut Lines<R>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let Some(line) = lines.next_line().await? else {
        return Ok(None);
    };
    let ticker = line.trim();
    if ticker.is_empty() || ticker.eq_ignore_ascii_case("quit") {
        return Ok(None);
    }
    Ok(Some(ticker.to_string()))
}

fn print_dashboard(
    dashboard: &Dashboard,
    config: &DashboardConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if dashboard.symbol.is_empty() {
        for failure in &dashboard.failures {
            eprintln!("{}", failure);
        }
        return Ok(());
    }

    let report = dashboard.report(config)?;
    match format {
        OutputFormat::Text => println!("{}", report.to_ascii()),
        OutputFormat::Markdown => println!("{}", report.to_markdown()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn write_artifacts(
    dashboard: &Dashboard,
    config: &DashboardConfig,
    chart: Option<&Path>,
    plotly: Option<&Path>,
    export: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if chart.is_none() && plotly.is_none() && export.is_none() {
        return Ok(());
    }

    let (Some(comparison), Some(line_chart)) = (&dashboard.comparison, dashboard.chart(config))
    else {
        eprintln!("No annual return comparison for {}; nothing written", dashboard.symbol);
        return Ok(());
    };

    if let Some(path) = chart {
        line_chart.save_svg(path)?;
        eprintln!("Chart written to {}", path.display());
    }
    if let Some(path) = plotly {
        line_chart.save_plotly(path)?;
        eprintln!("Plotly figure written to {}", path.display());
    }
    if let Some(path) = export {
        comparison.export_to_file(path, ExportFormat::from_path(path)?)?;
        eprintln!("Comparison exported to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["tickerlens", "show"]).unwrap();
        let Commands::Show {
            ticker,
            dashboard,
            format,
            ..
        } = cli.command
        else {
            panic!("expected show");
        };

        assert_eq!(ticker, "AAPL");
        assert_eq!(format, OutputFormat::Text);
        let config = dashboard.config().unwrap();
        assert_eq!(config.benchmark_symbol, "^GSPC");
        assert_eq!(config.benchmark_label, "S&P 500");
    }

    #[test]
    fn test_custom_benchmark_label_defaults_to_symbol() {
        let cli = Cli::try_parse_from([
            "tickerlens",
            "watch",
            "--benchmark",
            "^IXIC",
            "--years",
            "3",
        ])
        .unwrap();
        let Commands::Watch { dashboard, .. } = cli.command else {
            panic!("expected watch");
        };

        let config = dashboard.config().unwrap();
        assert_eq!(config.benchmark_label, "^IXIC");
        assert_eq!(config.lookback.years(), 3);
    }

    #[tokio::test]
    async fn test_next_ticker_stops_at_quit() {
        let mut lines = BufReader::new(&b" msft \nQUIT\naapl\n"[..]).lines();

        assert_eq!(next_ticker(&mut lines).await.unwrap().as_deref(), Some("msft"));
        assert_eq!(next_ticker(&mut lines).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_next_ticker_stops_at_blank_line_and_eof() {
        let mut blank = BufReader::new(&b"\nAAPL\n"[..]).lines();
        assert_eq!(next_ticker(&mut blank).await.unwrap(), None);

        let mut eof = BufReader::new(&b"nvda"[..]).lines();
        assert_eq!(next_ticker(&mut eof).await.unwrap().as_deref(), Some("nvda"));
        assert_eq!(next_ticker(&mut eof).await.unwrap(), None);
    }

    #[test]
    fn test_zero_years_rejected() {
        let cli = Cli::try_parse_from(["tickerlens", "show", "MSFT", "--years", "0"]).unwrap();
        let Commands::Show { dashboard, .. } = cli.command else {
            panic!("expected show");
        };
        assert!(dashboard.config().is_err());
    }
}
