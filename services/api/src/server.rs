use crate::cli::{CreateAdminArgs, ServeArgs};
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use placement::config::AppConfig;
use placement::error::AppError;
use placement::store::Store;
use placement::telemetry;
use placement::PlacementState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let store = Store::connect(&config.database).await?;
    store.migrate().await?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let placement_state = PlacementState::new(store, config.auth.clone(), config.lifecycle.clone());
    let app = with_operational_routes(placement_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "placement portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) async fn migrate() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let store = Store::connect(&config.database).await?;
    store.migrate().await?;
    info!(database = %config.database.url, "migrations applied");
    Ok(())
}

pub(crate) async fn create_admin(args: CreateAdminArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let store = Store::connect(&config.database).await?;
    store.migrate().await?;

    let state = PlacementState::new(store, config.auth, config.lifecycle);
    let account = state
        .accounts
        .create_admin(&args.username, &args.email, args.password)
        .await?;
    info!(user_id = %account.user_id, username = %account.username, "administrator provisioned");
    Ok(())
}
