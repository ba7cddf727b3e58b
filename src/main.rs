use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use sales_volume_tracker::app::{DashboardUseCase, SheetSourcePort};
use sales_volume_tracker::config::Config;
use sales_volume_tracker::infra::{FileSheetSource, ReqwestSheetSource};
use sales_volume_tracker::pipeline::processing::CategorySelection;
use sales_volume_tracker::pipeline::PipelineOutput;
use sales_volume_tracker::presentation::{chart, DashboardView};
use sales_volume_tracker::server::{self, AppState};
use sales_volume_tracker::{logging, observability};

#[derive(Parser)]
#[command(name = "sales_volume_tracker")]
#[command(about = "Daily sales volume dashboard over a Google Sheets CSV export")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct SourceArgs {
    /// CSV export URL (overrides config.toml and TRACKER_SOURCE_URL)
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,
    /// Read the CSV from a local file instead of fetching it
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sheet once and print metrics and the daily series
    Report {
        /// Campaign/provider to include; repeat for several. None means all
        #[arg(long = "campaign")]
        campaigns: Vec<String>,
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write the Plotly figure for the daily series
    Chart {
        #[arg(long = "campaign")]
        campaigns: Vec<String>,
        #[command(flatten)]
        source: SourceArgs,
        /// Output path; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve the interactive dashboard over HTTP
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8501
        #[arg(long)]
        bind: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn build_source(args: &SourceArgs, config: &Config) -> Result<Arc<dyn SheetSourcePort>> {
    if let Some(path) = &args.file {
        return Ok(Arc::new(FileSheetSource::new(path.clone())));
    }
    let mut source_config = config.source.clone();
    if let Some(url) = &args.url {
        source_config.url = Some(url.clone());
    }
    let source = ReqwestSheetSource::from_config(&source_config)?;
    Ok(Arc::new(source))
}

/// Run one pipeline; no `--campaign` means the same default view the page starts with
async fn run_once(use_case: &DashboardUseCase, campaigns: Vec<String>) -> Result<PipelineOutput> {
    if campaigns.is_empty() {
        return Ok(use_case.run_default().await?);
    }
    let selection: CategorySelection = campaigns.into_iter().collect();
    Ok(use_case.run(&selection).await?)
}

async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Report {
            campaigns,
            source,
            format,
        } => {
            let use_case = DashboardUseCase::new(build_source(&source, &config)?);
            info!(source = %use_case.source_description(), "Running report");
            let output = run_once(&use_case, campaigns).await?;
            let view = DashboardView::from_output(&output);
            match format {
                OutputFormat::Text => print!("{}", view.render_text()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
            }
        }
        Commands::Chart {
            campaigns,
            source,
            out,
        } => {
            let use_case = DashboardUseCase::new(build_source(&source, &config)?);
            let output = run_once(&use_case, campaigns).await?;
            let figure = serde_json::to_string_pretty(&chart::daily_volume_figure(&output.daily_volume))?;
            match out {
                Some(path) => {
                    std::fs::write(&path, figure)
                        .with_context(|| format!("writing chart to {}", path.display()))?;
                    println!("✅ Chart written to {}", path.display());
                }
                None => println!("{}", figure),
            }
        }
        Commands::Serve { bind, source } => {
            let metrics = match observability::init() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    error!("Metrics disabled: {}", e);
                    None
                }
            };
            let state = AppState {
                use_case: DashboardUseCase::new(build_source(&source, &config)?),
                metrics,
            };
            let bind_addr = bind.unwrap_or_else(|| config.server.bind_addr.clone());
            server::start_server(state, &bind_addr).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let result = match Config::load().context("loading configuration") {
        Ok(config) => dispatch(cli, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run halted: {:#}", e);
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
