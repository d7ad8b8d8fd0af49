use compress_service::{build_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::from_env().expect("ERROR: invalid service configuration");
    let port = config.port;

    tracing::info!(
        "Starting compress-service with {:?} backend, {} allowed MIME types",
        config.backend,
        config.mime_types.len()
    );

    let app_state = AppState::new(config).expect("Failed to create processing backend");
    let router = build_router(app_state.clone());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    // Session teardown releases every preview
    let mut session = compress_service::application::pipeline::lock_session(&app_state.session);
    let released = session.len();
    session.clear();
    tracing::info!("Session closed, {} record(s) released", released);
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
