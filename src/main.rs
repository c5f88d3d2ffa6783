use embedhttp::config::Config;
use embedhttp::host::Host;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Config::load()?;
    let entry = cfg.assets.entry.clone();

    let mut host = Host::new(cfg)?;
    host.register_builtin_functions();

    if !host.start() {
        anyhow::bail!("HTTP server failed to start");
    }
    if let Some(url) = host.entry_url(&entry) {
        tracing::info!("Serving {}", url);
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    host.stop();
    Ok(())
}
