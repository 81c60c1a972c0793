use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mealbridge_observability::init();

    let config = mealbridge_api::config::AppConfig::from_env()?;
    let services = Arc::new(mealbridge_api::app::build_services(&config).await?);
    let app = mealbridge_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
