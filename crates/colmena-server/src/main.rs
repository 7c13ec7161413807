use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use colmena_api::auth::{self, AppState, AppStateInner};
use colmena_api::middleware::require_auth;
use colmena_api::{admin, data, hives};
use colmena_influx::{InfluxClient, InfluxConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colmena=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("COLMENA_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("COLMENA_DB_PATH").unwrap_or_else(|_| "colmena.db".into());
    let host = std::env::var("COLMENA_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("COLMENA_PORT")
        .unwrap_or_else(|_| "3001".into())
        .parse()?;

    let influx_config = InfluxConfig {
        url: std::env::var("INFLUXDB_URL").unwrap_or_else(|_| "http://localhost:8086".into()),
        token: std::env::var("INFLUXDB_TOKEN").unwrap_or_default(),
        org: std::env::var("INFLUXDB_ORG").unwrap_or_default(),
        bucket: std::env::var("INFLUXDB_BUCKET").unwrap_or_else(|_| "sensores".into()),
    };

    // Init stores
    let db = colmena_db::Database::open(&PathBuf::from(&db_path))?;
    let influx = InfluxClient::new(influx_config);

    // Probe the time-series store; log the outcome but keep serving — the
    // registry endpoints work without it.
    match influx.ping().await {
        Ok(()) => info!("InfluxDB connection established"),
        Err(e) => error!("InfluxDB unreachable at startup: {}", e),
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        influx,
        jwt_secret,
    });

    // Routes
    let public_routes = Router::new()
        .route("/", get(|| async { "Colmena monitoring API running." }))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/hives/sensors", get(hives::sensor_catalog))
        .route("/api/hives", post(hives::create_hive))
        .route("/api/hives", get(hives::my_hives))
        .route("/api/hives/{hive_code}", put(hives::update_hive))
        .route("/api/hives/{hive_code}", delete(hives::delete_hive))
        .route("/api/data/hive/{hive_code}", get(data::hive_data))
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/users/{user_id}", put(admin::update_user))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Colmena server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
