//! Abbot command line entry point

use std::path::PathBuf;

use abbot_driver::{Config, ReportFormat, ReportTarget, Workload, emit};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Index advisor for MongoDB queries and pipelines")]
struct Cli {
    /// Workload file with indexes, queries and pipelines
    workload: PathBuf,

    /// Config file (default: $ABBOT_CONFIG, then abbot.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to send the report
    #[arg(long = "type", value_enum)]
    target: Option<ReportTarget>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Output file for `--type file`
    #[arg(short, long)]
    path: Option<PathBuf>,
}

fn get_env_filter() -> EnvFilter {
    if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else if cfg!(debug_assertions) {
        EnvFilter::new("abbot=debug,abbot_core=debug,abbot_driver=debug")
    } else {
        EnvFilter::new("abbot=info,abbot_core=info,abbot_driver=info")
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(get_env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(target) = cli.target {
        config.report.target = target;
    }
    if let Some(format) = cli.format {
        config.report.format = format;
    }
    if let Some(path) = cli.path {
        config.report.path = Some(path);
    }

    let workload = Workload::from_path(&cli.workload)?;
    let reports = workload.run()?;
    tracing::debug!(reports = reports.len(), "analysis finished");

    emit(&reports, &config.report, &mut std::io::stdout().lock())?;
    Ok(())
}
