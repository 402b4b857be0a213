use service_core::observability::init_tracing;
use temple_service::{config::TempleConfig, Application};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TempleConfig::load()?;

    init_tracing(
        &config.service_name,
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting temple service"
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
