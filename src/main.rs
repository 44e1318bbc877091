use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_aggregator::{config::Config, pipeline::PipelineEngine};

#[derive(Parser)]
#[command(name = "m3u-aggregator")]
#[command(version)]
#[command(about = "Aggregate M3U playlists and XMLTV guides into combined outputs")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Output directory (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("m3u_aggregator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting m3u-aggregator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(output_dir) = cli.output_dir {
        config.output.directory = output_dir.into();
    }

    let summary = PipelineEngine::new(config).execute().await?;

    for path in &summary.outputs {
        info!("Output: {}", path.display());
    }

    Ok(())
}
