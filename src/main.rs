//! CLI entry point for the health trend chart pipeline.
//!
//! Loads health logs from a CSV file and prints chart-ready series for one
//! metric as JSON on stdout.

use anyhow::{Result, ensure};
use clap::{Parser, Subcommand};
use health_trend_charts::analyzers::types::DataType;
use health_trend_charts::cache::CacheCoordinator;
use health_trend_charts::config::Config;
use health_trend_charts::metrics::{MetricRegistry, symptom_names};
use health_trend_charts::model::TimePeriod;
use health_trend_charts::output::{print_pretty, write_json};
use health_trend_charts::service::ChartDataService;
use health_trend_charts::source::CsvLogSource;
use serde::Serialize;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "health_trend_charts")]
#[command(about = "Turn daily health logs into chart-ready series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every series subcommand.
#[derive(clap::Args)]
struct SeriesArgs {
    /// CSV file of daily health logs
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Metric id, e.g. "mood" or "symptom:headache"
    #[arg(short, long)]
    metric: String,

    /// One of week, month, three-months, six-months, year, all-time
    #[arg(short, long, default_value = "month")]
    period: TimePeriod,
}

#[derive(Subcommand)]
enum Commands {
    /// List the metrics available for a log file
    Metrics {
        /// CSV file of daily health logs
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
    /// Print the raw points of a metric
    Points(SeriesArgs),
    /// Print points bucketed by day, week or month
    Aggregate {
        #[command(flatten)]
        series: SeriesArgs,

        /// Override the point cap chosen for the metric's data type
        #[arg(long)]
        max_points: Option<usize>,
    },
    /// Print points thinned and smoothed for long ranges
    Smooth(SeriesArgs),
    /// Print per-day counts of each formatted value
    Group(SeriesArgs),
}

#[derive(Serialize)]
struct MetricSummary {
    id: String,
    display_name: String,
    data_type: DataType,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/health_trend_charts.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("health_trend_charts.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    print_pretty(&config);

    match cli.command {
        Commands::Metrics { input } => {
            let service = build_service(&input, &config).await?;
            let metrics: Vec<MetricSummary> = service
                .registry()
                .providers()
                .map(|p| MetricSummary {
                    id: p.id().to_string(),
                    display_name: p.display_name().to_string(),
                    data_type: p.data_type(),
                })
                .collect();
            info!(count = metrics.len(), "Metrics listed");
            write_json(io::stdout().lock(), &metrics)?;
        }
        Commands::Points(args) => {
            let service = build_service(&args.input, &config).await?;
            let points = service.get_points(&args.metric, args.period).await;
            info!(count = points.len(), "Points ready");
            write_json(io::stdout().lock(), &points)?;
        }
        Commands::Aggregate { series, max_points } => {
            let service = build_service(&series.input, &config).await?;
            let (points, info) = service
                .get_aggregated_points(&series.metric, series.period, max_points)
                .await;
            info!(
                original = info.original_count,
                aggregated = info.aggregated_count,
                reduction = info.reduction_percentage(),
                "Aggregation ready"
            );
            write_json(
                io::stdout().lock(),
                &serde_json::json!({ "points": points, "info": info }),
            )?;
        }
        Commands::Smooth(args) => {
            let service = build_service(&args.input, &config).await?;
            let points = service.get_smoothed_points(&args.metric, args.period).await;
            info!(count = points.len(), "Smoothed series ready");
            write_json(io::stdout().lock(), &points)?;
        }
        Commands::Group(args) => {
            let service = build_service(&args.input, &config).await?;
            let groups = service.get_grouped_points(&args.metric, args.period).await;
            info!(count = groups.len(), "Grouped series ready");
            write_json(io::stdout().lock(), &groups)?;
        }
    }

    Ok(())
}

/// Wires the CSV source, cache and metric registry for one run. Symptom
/// metrics are discovered from the logs themselves.
#[tracing::instrument(skip(config), fields(input = %input.display()))]
async fn build_service(input: &Path, config: &Config) -> Result<ChartDataService<CsvLogSource>> {
    ensure!(input.is_file(), "log file not found: {}", input.display());

    let cache = Arc::new(CacheCoordinator::new(CsvLogSource::new(input), config.cache));
    let logs = cache.all_logs().await;
    let symptoms = symptom_names(&logs);
    info!(logs = logs.len(), symptoms = symptoms.len(), "Logs loaded");

    let registry = MetricRegistry::with_defaults(&symptoms);
    Ok(ChartDataService::new(cache, registry, config.calendar))
}
