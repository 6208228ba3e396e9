use clap::Parser;
use firelens::{Config, MapServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("firelens=info")),
        )
        .init();

    let config = Config::parse();
    let server = MapServer::new(config).await?;
    server.start().await
}
