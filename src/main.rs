use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quant_ranker::config::{ResolvedConfig, RunConfig, DEFAULT_UNIVERSE};
use quant_ranker::market_data::{load_price_file, series_from_prices, YahooClient};
use quant_ranker::{rank_and_allocate, Report, ZeroRiskPolicy};

/// Rank stocks by expected return and split a risk budget across them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated symbols (e.g. AAPL,MSFT,AMZN)
    #[arg(short, long, value_delimiter = ',', conflicts_with = "universe")]
    symbols: Option<Vec<String>>,

    /// Use the full built-in symbol universe
    #[arg(long)]
    universe: bool,

    /// First day of the observation window (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Last day of the observation window (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    /// Risk-free rate used for the Sharpe and Treynor columns
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Total risk budget to allocate
    #[arg(long)]
    capacity: Option<f64>,

    /// Zero-risk handling: "priority" or "fail"
    #[arg(long)]
    zero_risk: Option<ZeroRiskPolicy>,

    /// Read prices from a local JSON file instead of downloading them
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn overrides(&self) -> RunConfig {
        let symbols = if self.universe {
            Some(DEFAULT_UNIVERSE.iter().map(|s| s.to_string()).collect())
        } else {
            self.symbols.clone()
        };
        RunConfig {
            symbols,
            start_date: self.start.clone(),
            end_date: self.end.clone(),
            risk_free_rate: self.risk_free_rate,
            capacity: self.capacity,
            zero_risk: self.zero_risk,
        }
    }

    fn resolve(&self) -> Result<ResolvedConfig, Box<dyn Error>> {
        let base = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };
        Ok(base.merge(self.overrides()).resolve()?)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = args.resolve()?;
    info!(
        symbols = cfg.symbols.len(),
        start = %cfg.start_date,
        end = %cfg.end_date,
        capacity = cfg.params.capacity,
        zero_risk = %cfg.params.zero_risk,
        "starting run"
    );

    let series = match &args.prices {
        Some(path) => series_from_prices(&cfg.symbols, &load_price_file(path)?),
        None => {
            YahooClient::new()?
                .fetch_all(&cfg.symbols, cfg.start_date, cfg.end_date)
                .await
        }
    };

    let outcome = rank_and_allocate(&series, &cfg.params)?;
    let report = Report::build(&outcome, cfg.params.risk_free_rate);

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}
