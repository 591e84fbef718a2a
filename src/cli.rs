//! CLI definition and dispatch.
//!
//! Each command loads and validates the INI config, wires the CSV adapters
//! into a pipeline function that returns a report value, and renders that
//! report to stdout. Diagnostics go through `tracing` to stderr.

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_news_adapter::CsvNewsAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::lexicon_sentiment::LexiconSentimentModel;
use crate::domain::config_validation::validate_config;
use crate::domain::error::StockLensError;
use crate::domain::indicator::{IndicatorType, IndicatorValue, compute_indicators};
use crate::domain::portfolio::{PortfolioAnalysis, PortfolioWeights, analyze_portfolio};
use crate::domain::price::PriceSeries;
use crate::domain::returns::{ReturnSeries, cumulative_return, series_returns};
use crate::domain::sentiment::{SentimentSummary, compare, score_corpus, summarize};
use crate::domain::settings::{DataSettings, IndicatorSettings, PortfolioSettings, SentimentSettings};
use crate::domain::universe::{
    SkipReason, SkippedSymbol, load_prices, parse_holdings, parse_symbol, parse_symbols,
};
use crate::domain::watchlist::{Quote, Watchlist};
use crate::ports::news_port::NewsSource;
use crate::ports::price_port::PriceSource;
use crate::ports::sentiment_port::SentimentModel;

/// Default history length when no start date is configured.
pub const DEFAULT_HISTORY_DAYS: i64 = 365;

#[derive(Parser, Debug)]
#[command(name = "stocklens", about = "Stock indicators, news sentiment and portfolio risk")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print SMA, RSI and MACD for one symbol
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Score recent news for one or more symbols
    Sentiment {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: String,
        #[arg(long)]
        since: Option<NaiveDate>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Analyze portfolio performance and risk
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        holdings: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        benchmark: Option<String>,
    },
    /// Show the latest observed price for each symbol
    Watchlist {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: String,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Indicators {
            config,
            symbol,
            start,
            end,
        } => run_indicators(&config, &symbol, start, end),
        Command::Sentiment {
            config,
            symbols,
            since,
            language,
            limit,
        } => run_sentiment(&config, &symbols, since, language, limit),
        Command::Portfolio {
            config,
            holdings,
            start,
            end,
            benchmark,
        } => run_portfolio(&config, holdings.as_deref(), start, end, benchmark),
        Command::Watchlist {
            config,
            symbols,
            as_of,
        } => run_watchlist(&config, &symbols, as_of),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Loads and validates the config file.
pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, StockLensError> {
    info!(path = %path.display(), "loading config");
    let config = FileConfigAdapter::from_file(path)?;
    validate_config(&config)?;
    Ok(config)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Fills in a missing end (today) and start (one year before end).
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or(end - Duration::days(DEFAULT_HISTORY_DAYS));
    (start, end)
}

// ---------------------------------------------------------------------------
// indicators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: Option<f64>,
    pub rsi: f64,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone)]
pub struct IndicatorReport {
    pub symbol: String,
    pub settings: IndicatorSettings,
    pub rows: Vec<IndicatorRow>,
}

fn simple_value(value: &IndicatorValue) -> f64 {
    match value {
        IndicatorValue::Simple(v) => *v,
        IndicatorValue::Macd { line, .. } => *line,
    }
}

pub fn indicator_report(
    source: &dyn PriceSource,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    settings: &IndicatorSettings,
) -> Result<IndicatorReport, StockLensError> {
    let series = load_prices(source, symbol, start, end)?;
    let computed = compute_indicators(&series, &settings.indicator_types())?;

    let missing = |t: IndicatorType| StockLensError::InsufficientData {
        what: format!("{}", t),
        have: 0,
        need: series.len(),
    };
    let sma = computed.get(&settings.sma()).ok_or_else(|| missing(settings.sma()))?;
    let rsi = computed.get(&settings.rsi()).ok_or_else(|| missing(settings.rsi()))?;
    let macd = computed.get(&settings.macd()).ok_or_else(|| missing(settings.macd()))?;

    let rows = series
        .bars()
        .iter()
        .zip(&sma.values)
        .zip(&rsi.values)
        .zip(&macd.values)
        .map(|(((bar, sma), rsi), macd)| {
            let (line, signal, histogram) = match macd.value {
                IndicatorValue::Macd {
                    line,
                    signal,
                    histogram,
                } => (line, signal, histogram),
                IndicatorValue::Simple(v) => (v, f64::NAN, f64::NAN),
            };
            IndicatorRow {
                date: bar.date,
                close: bar.close,
                sma: sma.valid.then(|| simple_value(&sma.value)),
                rsi: simple_value(&rsi.value),
                macd: line,
                signal,
                histogram,
            }
        })
        .collect();

    Ok(IndicatorReport {
        symbol: series.symbol().to_string(),
        settings: *settings,
        rows,
    })
}

pub fn write_indicator_table(out: &mut dyn Write, report: &IndicatorReport) -> io::Result<()> {
    let s = &report.settings;
    writeln!(out, "{}", report.symbol)?;
    writeln!(
        out,
        "{:<10}  {:>10}  {:>10}  {:>8}  {:>9}  {:>9}  {:>9}",
        "date",
        "close",
        s.sma().to_string(),
        s.rsi().to_string(),
        "MACD",
        "signal",
        "hist"
    )?;
    for row in &report.rows {
        let sma = row
            .sma
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<10}  {:>10.2}  {:>10}  {:>8.2}  {:>9.4}  {:>9.4}  {:>9.4}",
            row.date, row.close, sma, row.rsi, row.macd, row.signal, row.histogram
        )?;
    }
    Ok(())
}

fn run_indicators(
    config_path: &PathBuf,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), StockLensError> {
    let config = load_config(config_path)?;
    let data = DataSettings::from_config(&config)?;
    let settings = IndicatorSettings::from_config(&config)?;
    let (start, end) = resolve_range(start, end, today());

    let symbol = parse_symbol(symbol)?;
    let source = CsvPriceAdapter::new(data.prices_dir);
    let report = indicator_report(&source, &symbol, start, end, &settings)?;
    info!(symbol = %report.symbol, rows = report.rows.len(), "indicators computed");

    write_indicator_table(&mut io::stdout().lock(), &report)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// sentiment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SentimentReport {
    /// Most positive first.
    pub ranked: Vec<(String, SentimentSummary)>,
    pub no_articles: Vec<String>,
    pub failed: Vec<SkippedSymbol>,
    pub model_version: String,
}

pub fn sentiment_report(
    news: &dyn NewsSource,
    model: &dyn SentimentModel,
    symbols: &[String],
    since: NaiveDate,
    settings: &SentimentSettings,
) -> SentimentReport {
    let mut report = SentimentReport {
        model_version: model.version().to_string(),
        ..Default::default()
    };
    let mut summaries: Vec<(String, SentimentSummary)> = Vec::new();

    for symbol in symbols {
        let articles = match news.fetch_news(symbol, since, &settings.language, settings.limit) {
            Ok(a) => a,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "news fetch failed");
                report.failed.push(SkippedSymbol::from_error(symbol, e));
                continue;
            }
        };
        let documents: Vec<String> = articles.iter().map(|a| a.document()).collect();
        let corpus = score_corpus(model, &documents);
        match summarize(symbol, &corpus) {
            Ok(summary) => summaries.push((symbol.clone(), summary)),
            Err(e) => {
                warn!("{e}");
                report.no_articles.push(symbol.clone());
            }
        }
    }

    let labelled: Vec<(&str, SentimentSummary)> =
        summaries.iter().map(|(s, m)| (s.as_str(), *m)).collect();
    report.ranked = compare(&labelled)
        .into_iter()
        .map(|(s, m)| (s.to_string(), m))
        .collect();
    report
}

pub fn write_sentiment_table(out: &mut dyn Write, report: &SentimentReport) -> io::Result<()> {
    writeln!(out, "{:<8}  {:>8}  {:>8}", "symbol", "mean", "articles")?;
    for (symbol, summary) in &report.ranked {
        writeln!(out, "{:<8}  {:>8.4}  {:>8}", symbol, summary.mean, summary.count)?;
    }
    for symbol in &report.no_articles {
        writeln!(out, "{:<8}  {:>8}  {:>8}", symbol, "-", 0)?;
    }
    writeln!(out, "model: {}", report.model_version)?;
    Ok(())
}

fn run_sentiment(
    config_path: &PathBuf,
    symbols: &str,
    since: Option<NaiveDate>,
    language: Option<String>,
    limit: Option<usize>,
) -> Result<(), StockLensError> {
    let config = load_config(config_path)?;
    let data = DataSettings::from_config(&config)?;
    let mut settings = SentimentSettings::from_config(&config)?;
    settings.apply_overrides(language, limit)?;
    let symbols = parse_symbols(symbols).map_err(StockLensError::from)?;
    let since = match since {
        Some(since) => since,
        None => settings.since(today())?,
    };

    let news = CsvNewsAdapter::new(data.require_news_file()?.clone());
    let model = LexiconSentimentModel::new();
    let report = sentiment_report(&news, &model, &symbols, since, &settings);

    if report.ranked.is_empty() {
        return Err(StockLensError::EmptyCorpus {
            query: symbols.join(","),
        });
    }
    write_sentiment_table(&mut io::stdout().lock(), &report)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// portfolio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PortfolioReport {
    pub analysis: PortfolioAnalysis,
    pub benchmark: Option<ReturnSeries>,
    pub skipped: Vec<SkippedSymbol>,
}

fn benchmark_cumulative(
    source: &dyn PriceSource,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ReturnSeries, StockLensError> {
    let series: PriceSeries = source.fetch_prices(symbol, start, end)?;
    Ok(cumulative_return(&series_returns(&series)?))
}

/// Three bars give the two returns a sample variance needs.
pub const MIN_HOLDING_BARS: usize = 3;

pub fn portfolio_report(
    source: &dyn PriceSource,
    settings: &PortfolioSettings,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PortfolioReport, StockLensError> {
    if settings.holdings.is_empty() {
        return Err(StockLensError::ConfigMissing {
            section: "portfolio".into(),
            key: "holdings".into(),
        });
    }
    let requested = PortfolioWeights::from_amounts(&settings.holdings)?;
    let symbols: Vec<String> = requested.symbols().to_vec();

    let fetched = source
        .fetch_prices_multi(&symbols, start, end)
        .require_bars(MIN_HOLDING_BARS);
    if fetched.series.is_empty() {
        return Err(StockLensError::InsufficientData {
            what: "portfolio".into(),
            have: 0,
            need: 1,
        });
    }
    for skipped in &fetched.skipped {
        warn!(symbol = %skipped.symbol, reason = ?skipped.reason, "holding excluded");
    }

    let weights = requested.restrict_to(&fetched.symbols())?;
    let analysis = analyze_portfolio(&fetched.series, &weights, settings.weighting, settings.covariance)?;

    let benchmark = match settings.benchmark.as_deref() {
        Some(symbol) => match benchmark_cumulative(source, symbol, start, end) {
            Ok(b) => Some(b),
            Err(e) => {
                warn!(benchmark = symbol, error = %e, "benchmark unavailable");
                None
            }
        },
        None => None,
    };

    Ok(PortfolioReport {
        analysis,
        benchmark,
        skipped: fetched.skipped,
    })
}

fn skip_reason_text(reason: &SkipReason) -> String {
    match reason {
        SkipReason::NotFound => "no data".to_string(),
        SkipReason::SourceError(e) => e.clone(),
        SkipReason::InsufficientBars { bars } => format!("only {} bars", bars),
    }
}

pub fn write_portfolio_report(out: &mut dyn Write, report: &PortfolioReport) -> io::Result<()> {
    let a = &report.analysis;

    writeln!(out, "Composition")?;
    for (symbol, weight) in a.weights.iter() {
        writeln!(out, "  {:<8} {:>6.2}%", symbol, weight * 100.0)?;
    }
    for skipped in &report.skipped {
        writeln!(
            out,
            "  {:<8} excluded ({})",
            skipped.symbol,
            skip_reason_text(&skipped.reason)
        )?;
    }

    writeln!(out, "\nCumulative return")?;
    for c in &a.cumulative {
        if let Some(last) = c.last() {
            writeln!(out, "  {:<8} {:>8.2}%", c.symbol(), last.value * 100.0)?;
        }
    }

    let bench_label = report
        .benchmark
        .as_ref()
        .map(|b| b.symbol().to_string())
        .unwrap_or_else(|| "-".to_string());
    writeln!(out, "\n{:<10}  {:>10}  {:>10}", "date", a.performance.symbol(), bench_label)?;
    for point in a.performance.points() {
        let bench = report
            .benchmark
            .as_ref()
            .and_then(|b| b.value_on(point.date))
            .map(|v| format!("{:.2}%", v * 100.0))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<10}  {:>9.2}%  {:>10}",
            point.date,
            point.value * 100.0,
            bench
        )?;
    }

    writeln!(out, "\nDaily risk:      {:.4}%", a.daily_risk * 100.0)?;
    writeln!(out, "Annualized risk: {:.2}%", a.annualized_risk * 100.0)?;
    Ok(())
}

fn run_portfolio(
    config_path: &PathBuf,
    holdings: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    benchmark: Option<String>,
) -> Result<(), StockLensError> {
    let config = load_config(config_path)?;
    let data = DataSettings::from_config(&config)?;
    let mut settings = PortfolioSettings::from_config(&config)?;
    if let Some(h) = holdings {
        settings.holdings = parse_holdings(h)?;
    }
    if let Some(b) = benchmark {
        settings.benchmark = match b.trim() {
            "" => None,
            b => Some(parse_symbol(b)?),
        };
    }
    let (start, end) = resolve_range(
        start.or(settings.start_date),
        end.or(settings.end_date),
        today(),
    );

    let source = CsvPriceAdapter::new(data.prices_dir);
    let report = portfolio_report(&source, &settings, start, end)?;
    info!(
        assets = report.analysis.weights.len(),
        weighting = %settings.weighting,
        "portfolio analyzed"
    );

    write_portfolio_report(&mut io::stdout().lock(), &report)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// watchlist
// ---------------------------------------------------------------------------

pub fn write_watchlist(out: &mut dyn Write, list: &Watchlist) -> io::Result<()> {
    for entry in list.entries() {
        match &entry.quote {
            Quote::Price { date, close } => {
                writeln!(out, "{:<8} {:>10.2}  {}", entry.symbol, close, date)?
            }
            Quote::Unavailable { reason } => {
                writeln!(out, "{:<8} {:>10}  {}", entry.symbol, "n/a", reason)?
            }
            Quote::Pending => writeln!(out, "{:<8} {:>10}", entry.symbol, "pending")?,
        }
    }
    Ok(())
}

fn run_watchlist(
    config_path: &PathBuf,
    symbols: &str,
    as_of: Option<NaiveDate>,
) -> Result<(), StockLensError> {
    let config = load_config(config_path)?;
    let data = DataSettings::from_config(&config)?;
    let symbols = parse_symbols(symbols).map_err(StockLensError::from)?;

    let mut list = Watchlist::new();
    for symbol in &symbols {
        list.add(symbol);
    }
    let source = CsvPriceAdapter::new(data.prices_dir);
    let priced = list.refresh(&source, as_of.unwrap_or_else(today));
    info!(priced, total = list.len(), "watchlist refreshed");

    write_watchlist(&mut io::stdout().lock(), &list)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn run_validate(config_path: &PathBuf) -> Result<(), StockLensError> {
    load_config(config_path)?;
    println!("Configuration is valid: {}", config_path.display());
    Ok(())
}
