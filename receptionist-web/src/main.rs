use dotenvy::dotenv;
use receptionist_web::config::get_configuration;
use receptionist_web::handlers::app::SERVICE_NAME;
use receptionist_web::startup::build_router;
use receptionist_web::AppState;
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        SERVICE_NAME,
        &configuration.server.log_level,
        configuration.server.otlp_endpoint.as_deref(),
    );

    receptionist_web::services::metrics::init_metrics()?;

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let api_url = configuration.api.url.clone();
    let state = AppState::new(configuration)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!(api_url = %api_url, "Starting {} on {}", SERVICE_NAME, address);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
