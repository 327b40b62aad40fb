mod api;
mod app;
mod chart;
mod filter;
mod format;
mod model;
mod notify;
mod poller;
mod report;
mod ui;
mod view;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::ApiClient;
use crate::app::DashConfig;
use crate::filter::TimeFilter;
use crate::model::ExportFormat;

#[derive(Parser)]
#[command(name = "scandash")]
#[command(about = "Terminal dashboard for a device scanner backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive dashboard
    Dash {
        /// Base URL of the scanner API
        #[arg(short, long, default_value = "http://localhost:5000")]
        url: String,

        /// Interval between status polls in seconds
        #[arg(long, default_value = "5")]
        status_interval: u64,

        /// Interval between device list polls in seconds
        #[arg(long, default_value = "3")]
        device_interval: u64,

        /// Interval between statistics refreshes in seconds
        #[arg(long, default_value = "30")]
        stats_interval: u64,

        /// Directory for exported files
        #[arg(long, default_value = ".")]
        export_dir: PathBuf,

        /// Path to store log files
        #[arg(short, long, default_value = "logs")]
        log_dir: PathBuf,
    },
    /// Fetch statistics once and print a plain-text report
    Report {
        /// Base URL of the scanner API
        #[arg(short, long, default_value = "http://localhost:5000")]
        url: String,

        /// Time window: all, 24h, 7d or 30d
        #[arg(short, long, default_value = "all")]
        time_filter: TimeFilter,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download the backend's scan data export
    Export {
        /// Base URL of the scanner API
        #[arg(short, long, default_value = "http://localhost:5000")]
        url: String,

        /// Export format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Time window: all, 24h, 7d or 30d
        #[arg(short, long, default_value = "all")]
        time_filter: TimeFilter,

        /// Output file path (defaults to scan_stats_<timestamp>.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dash {
            url,
            status_interval,
            device_interval,
            stats_interval,
            export_dir,
            log_dir,
        } => {
            // The terminal belongs to the dashboard, so logs go to a file only.
            std::fs::create_dir_all(&log_dir)?;
            let file_appender = RollingFileAppender::new(Rotation::HOURLY, &log_dir, "scandash.log");
            let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();

            info!("Starting scanner dashboard");
            info!("Backend: {}", url);
            info!(
                "Poll intervals: status {}s, devices {}s, stats {}s",
                status_interval, device_interval, stats_interval
            );

            app::run(DashConfig {
                base_url: url,
                status_interval: Duration::from_secs(status_interval),
                device_interval: Duration::from_secs(device_interval),
                stats_interval: Duration::from_secs(stats_interval),
                export_dir,
            })
            .await
        }
        Commands::Report {
            url,
            time_filter,
            output,
        } => {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
                .with(fmt::layer())
                .init();

            let client = ApiClient::new(&url);
            let report = report::generate_report(&client, time_filter).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &report)?;
                    println!("Report saved to {:?}", path);
                }
                None => println!("{}", report),
            }
            Ok(())
        }
        Commands::Export {
            url,
            format,
            time_filter,
            output,
        } => {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
                .with(fmt::layer())
                .init();

            let client = ApiClient::new(&url);
            let bytes = client.export(format, time_filter).await?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(poller::export_filename(
                    format,
                    chrono::Utc::now().timestamp_millis(),
                ))
            });
            std::fs::write(&path, &bytes)?;
            println!("Exported {} bytes to {:?}", bytes.len(), path);
            Ok(())
        }
    }
}
