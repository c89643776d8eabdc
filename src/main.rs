use property_pulse::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏠 Property Pulse");

    let config = Config::from_env()?;
    info!(base_url = %config.public_base_url, "Configuration loaded");

    property_pulse::serve(config).await
}
