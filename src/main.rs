use analytics::{AssetAnalysis, ChartRow, ExplainValue};
use analyzer::{save_best_effort, Analyzer, AnalyzerError};
use anyhow::Context;
use api_client::YahooClient;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use configuration::{init_tracing, load_config_from, Config, LogFormat};
use core_types::{normalize_symbol, Period};
use database::{connect, run_migrations, DbRepository};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The main entry point for the Quantlens asset analytics tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config_from(Some(cli.config.as_path())).context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _log_guard = init_tracing(&config.logging).context("Failed to initialize logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config).await,
        Commands::Chart(args) => handle_chart(args, &config).await,
        Commands::History(args) => handle_history(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Explainable return, risk and trend analytics for listed assets.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. A missing file is not an error.
    #[arg(long, global = true, default_value = configuration::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Overrides `logging.format` from the configuration.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more symbols (quant + technical report).
    Analyze(AnalyzeArgs),
    /// Print the close price with its SMA20/50/200 and RSI14 columns.
    Chart(ChartArgs),
    /// List analyses previously saved for a user.
    History(HistoryArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Symbol to analyze (e.g., "AAPL", "PETR4.SA"). Repeat for several.
    #[arg(long = "symbol", short = 's')]
    symbols: Vec<String>,

    /// Lookback period: 1y, 3y, 5y or 10y.
    #[arg(long)]
    period: Option<Period>,

    /// Annual risk-free rate for the Sharpe ratio (0.05 = 5%).
    #[arg(long, allow_negative_numbers = true)]
    rf: Option<f64>,

    /// Print the analyses as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Save each analysis to the database (best effort).
    #[arg(long, requires = "user")]
    save: bool,

    /// The user the saved analyses belong to.
    #[arg(long)]
    user: Option<String>,

    /// Email recorded for the user when saving.
    #[arg(long, requires = "user")]
    email: Option<String>,
}

#[derive(Parser)]
struct ChartArgs {
    #[arg(long, short = 's')]
    symbol: Option<String>,

    #[arg(long)]
    period: Option<Period>,

    /// Number of most recent sessions to print.
    #[arg(long, default_value_t = 30)]
    tail: usize,

    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct HistoryArgs {
    #[arg(long)]
    user: String,

    /// Only show analyses of this symbol.
    #[arg(long, short = 's')]
    symbol: Option<String>,

    #[arg(long, default_value_t = 20)]
    limit: i64,
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

async fn handle_analyze(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let symbols = if args.symbols.is_empty() {
        vec![config.analysis.default_symbol.clone()]
    } else {
        args.symbols.clone()
    };
    let period = args.period.unwrap_or(config.analysis.default_period);
    let rf_annual = args.rf.unwrap_or(config.analysis.rf_annual);

    let analyzer = build_analyzer(config)?;

    let spinner = spinner(format!("Fetching {} symbol(s) over {}...", symbols.len(), period))?;
    let results = join_all(
        symbols
            .iter()
            .map(|symbol| analyzer.analyze_asset(symbol, rf_annual, period)),
    )
    .await;
    spinner.finish_and_clear();

    let store = match (&args.user, args.save) {
        (Some(user), true) => open_store(config, user, args.email.as_deref()).await,
        _ => None,
    };

    let mut analyses = Vec::new();
    let mut failures = 0usize;
    for (symbol, result) in symbols.iter().zip(results) {
        match result {
            Ok(analysis) => {
                if let (Some(repo), Some(user)) = (&store, &args.user) {
                    save_best_effort(repo, user, &analysis).await;
                }
                analyses.push(analysis);
            }
            Err(e) => {
                failures += 1;
                report_failure(symbol, &e);
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analyses)?);
    } else {
        for analysis in &analyses {
            print_analysis(analysis);
        }
    }

    if failures == symbols.len() {
        anyhow::bail!("none of the requested symbols could be analyzed");
    }
    Ok(())
}

fn build_analyzer(config: &Config) -> anyhow::Result<Analyzer> {
    let client = YahooClient::new(&config.provider).context("Failed to build the price source")?;
    Ok(Analyzer::new(Arc::new(client)))
}

/// Connects, migrates and registers the user. Any failure disables saving
/// for this run instead of aborting it.
async fn open_store(config: &Config, user: &str, email: Option<&str>) -> Option<DbRepository> {
    let opened = async {
        let pool = connect(&config.database).await?;
        run_migrations(&pool).await?;
        let repo = DbRepository::new(pool);
        repo.upsert_user(user, email).await?;
        Ok::<_, database::DbError>(repo)
    }
    .await;

    match opened {
        Ok(repo) => Some(repo),
        Err(e) => {
            tracing::warn!(error = %e, "Database unavailable; analyses will not be saved.");
            None
        }
    }
}

fn report_failure(symbol: &str, err: &AnalyzerError) {
    match err {
        AnalyzerError::DataUnavailable { symbol, reason } => {
            eprintln!("No data for {}: {}.", symbol, reason);
            eprintln!(
                "Hint: check the ticker (Brazilian listings need the .SA suffix, e.g. PETR4.SA) or try another period."
            );
        }
        other => eprintln!("Failed to analyze {}: {}", normalize_symbol(symbol), other),
    }
}

fn print_analysis(analysis: &AssetAnalysis) {
    let meta = &analysis.metadata;
    println!(
        "\n{} ({}) | period {} | {} sessions {} to {} | rf {}",
        analysis.asset.symbol,
        analysis.asset.market,
        meta.period,
        meta.rows,
        meta.first_date.format("%Y-%m-%d"),
        meta.last_date.format("%Y-%m-%d"),
        fmt_pct(meta.rf_annual),
    );

    let mut kpis = new_table();
    kpis.set_header(vec!["CAGR", "Volatility", "Sharpe", "Max Drawdown", "Trend", "RSI(14)"]);
    kpis.add_row(vec![
        Cell::new(fmt_pct(analysis.quant.cagr)),
        Cell::new(fmt_pct(analysis.quant.vol_annual)),
        Cell::new(fmt_num(analysis.quant.sharpe)),
        Cell::new(fmt_pct(analysis.quant.max_drawdown)),
        Cell::new(analysis.technical.trend_regime),
        Cell::new(fmt_num(analysis.technical.rsi14)),
    ]);
    println!("{kpis}");

    let mut explain = new_table();
    explain.set_header(vec!["Metric", "Explanation"]);
    for (key, value) in analysis
        .quant
        .explain
        .iter()
        .chain(analysis.technical.explain.iter())
    {
        explain.add_row(vec![Cell::new(key), Cell::new(fmt_explain(value))]);
    }
    println!("{explain}");
    println!("Generated at {}", analysis.asof.format("%Y-%m-%d %H:%M:%S UTC"));
}

// ==============================================================================
// Chart Command Logic
// ==============================================================================

async fn handle_chart(args: ChartArgs, config: &Config) -> anyhow::Result<()> {
    let symbol = args
        .symbol
        .unwrap_or_else(|| config.analysis.default_symbol.clone());
    let period = args.period.unwrap_or(config.analysis.default_period);
    let analyzer = build_analyzer(config)?;

    let spinner = spinner(format!("Fetching {} over {}...", normalize_symbol(&symbol), period))?;
    let frame = analyzer.chart_series(&symbol, period).await;
    spinner.finish_and_clear();

    let frame = match frame {
        Ok(frame) => frame,
        Err(e) => {
            report_failure(&symbol, &e);
            return Err(e).context("chart failed");
        }
    };

    let rows = frame.tail(args.tail);
    if args.json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(vec!["Date", "Close", "SMA20", "SMA50", "SMA200", "RSI14"]);
    for row in rows {
        table.add_row(chart_cells(row));
    }
    println!("{table}");
    Ok(())
}

fn chart_cells(row: &ChartRow) -> Vec<Cell> {
    vec![
        Cell::new(row.date.format("%Y-%m-%d")),
        Cell::new(fmt_num(row.close)),
        Cell::new(fmt_num(row.sma20)),
        Cell::new(fmt_num(row.sma50)),
        Cell::new(fmt_num(row.sma200)),
        Cell::new(fmt_num(row.rsi14)),
    ]
}

// ==============================================================================
// History Command Logic
// ==============================================================================

async fn handle_history(args: HistoryArgs, config: &Config) -> anyhow::Result<()> {
    let pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let repo = DbRepository::new(pool);

    let symbol = args.symbol.as_deref().map(normalize_symbol);
    let stored = repo
        .list_analyses(&args.user, symbol.as_deref(), args.limit)
        .await
        .context("Failed to list saved analyses")?;

    if stored.is_empty() {
        println!("No saved analyses for {}.", args.user);
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(vec!["As of", "Symbol", "Period", "CAGR", "Sharpe", "Max Drawdown", "Trend"]);
    for row in &stored {
        match row.analysis() {
            Ok(a) => {
                table.add_row(vec![
                    Cell::new(row.asof.format("%Y-%m-%d %H:%M")),
                    Cell::new(&row.symbol),
                    Cell::new(a.metadata.period),
                    Cell::new(fmt_pct(a.quant.cagr)),
                    Cell::new(fmt_num(a.quant.sharpe)),
                    Cell::new(fmt_pct(a.quant.max_drawdown)),
                    Cell::new(a.technical.trend_regime),
                ]);
            }
            Err(e) => {
                tracing::warn!(analysis_id = %row.analysis_id, error = %e, "Skipping unreadable analysis.");
            }
        }
    }
    println!("{table}");
    Ok(())
}

// ==============================================================================
// Rendering Helpers
// ==============================================================================

fn spinner(message: String) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn fmt_pct(v: f64) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}%", v * 100.0)
    }
}

fn fmt_num(v: f64) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}", v)
    }
}

fn fmt_explain(value: &ExplainValue) -> String {
    match value {
        ExplainValue::Number(n) => fmt_num(*n),
        ExplainValue::Text(t) => t.clone(),
    }
}
