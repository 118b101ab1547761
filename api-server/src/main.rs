use adventurer_engine::{FanoutSink, HistorySink, LogSink, Walker, WalkerConfig};
use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod handlers;
mod models;

use handlers::{get_events, get_state, step, AppState};

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

fn build_router(app: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/api/step", post(step))
        .route("/api/state", get(get_state))
        .route("/api/events", get(get_events))
        .with_state(app)
        .layer(cors)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = WalkerConfig::from_env().context("Failed to read walker configuration")?;
    let engine = config.build_engine()?;

    let history = Arc::new(HistorySink::default());
    let sink = FanoutSink::new()
        .with(Arc::new(LogSink))
        .with(history.clone());
    let walker = Arc::new(Walker::with_sink(engine, config.pacing, Arc::new(sink)));

    let bind = std::env::var("ADVENTURER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid ADVENTURER_BIND address: {}", bind))?;
    let cors_origin = std::env::var("ADVENTURER_CORS_ORIGIN")
        .unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string())
        .parse::<HeaderValue>()
        .context("Invalid ADVENTURER_CORS_ORIGIN")?;

    let app = build_router(AppState { walker, history }, cors_origin);

    println!("🚀 Adventurer API Server running on http://{}", addr);
    println!("Floors: {}", config.floor_count);
    println!("Available endpoints:");
    println!("  POST /api/step    - Move the adventurer one step");
    println!("  GET  /api/state   - Current floor, path and visited floors");
    println!("  GET  /api/events  - Recent traversal events");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
