use zakat_be::{app::init_tracing, app_router, build_state, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load konfigurasi dari .env dan environment
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let state = build_state(&config).await?;
    let app = app_router(state, &config);

    tracing::info!("Server running at http://{}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
