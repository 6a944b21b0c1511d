use anyhow::Context;
use atletica_api::{app, AppState};
use atletica_store::{app_config::Config, DbClient};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atletica_api=debug,atletica_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Atletica shop API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let business_rules = db
        .fetch_business_rules(config.business_rules.clone())
        .await
        .context("Failed to read business rules")?;
    tracing::info!(
        discount_rate = business_rules.member_discount_rate,
        low_stock_threshold = business_rules.default_low_stock_threshold,
        "Business rules loaded"
    );

    let state = AppState::new(db.customers(), db.products(), db.sales(), &business_rules)?;
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
