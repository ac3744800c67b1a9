//! OpenSASE Storefront - cart, checkout and catalog service

use anyhow::Result;
use opensase_storefront::{api, config::AppConfig};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = AppConfig::from_env()?;
    let state = api::AppState::connect(&config).await?;

    let catalog = state.catalog.clone();
    tokio::spawn(async move { catalog.load().await });

    let sessions = state.sessions.clone();
    let idle = config.session_idle_timeout;
    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(idle.max(std::time::Duration::from_secs(1)) / 2);
        loop {
            sweep.tick().await;
            let expired = sessions.expire_idle(idle).await;
            if expired > 0 { tracing::info!(expired, "Expired idle cart sessions"); }
        }
    });

    let app = api::router(state).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    tracing::info!(port = config.port, currency = %config.currency, history = ?config.purchase_history, "🚀 OpenSASE Storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
