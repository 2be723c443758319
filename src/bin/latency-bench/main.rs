pub mod cli;
pub mod context;

use flashblocks_latency::config::BenchConfig;
use flashblocks_latency::errors::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("latency_bench=info".parse().map_err(anyhow::Error::from)?)
        .add_directive("flashblocks_latency=info".parse().map_err(anyhow::Error::from)?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .init();

    cli::parse_cli_args()?;

    let config = match BenchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration, aborting before any dispatch");
            return Err(e);
        }
    };

    let ctx = context::Context::new(config).await?;

    tracing::info!("Starting latency benchmark");

    let summary = ctx.run().await?;
    summary.log();

    Ok(())
}
