use anyhow::Result;
use clap::Parser;
use covidframe::{chart, explore, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    let exploration = explore(&config).await?;

    if config.no_charts {
        info!("charts skipped");
        return Ok(());
    }
    chart::render_charts(&exploration.enriched, &config.out_dir)?;
    Ok(())
}
