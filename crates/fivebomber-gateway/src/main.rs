//! Five Bomber gateway server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use fivebomber_core::clock::SystemClock;
use fivebomber_gateway::routes;
use fivebomber_gateway::state::AppState;
use fivebomber_realtime::reaper;
use fivebomber_store::schema::ensure_schema;
use fivebomber_store::{FsQuestionRepository, PgConnectionRepository, PgSessionRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Five Bomber gateway");

    // Read configuration from environment.
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable must be set")?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| format!("PORT must be a valid u16: {e}"))?;
    let questions_dir =
        std::env::var("QUESTIONS_DIR").unwrap_or_else(|_| "questions".to_string());

    // Create database connection pool and bootstrap the schema.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    ensure_schema(&pool).await?;

    // Build application state.
    let sessions = Arc::new(PgSessionRepository::new(pool.clone()));
    let questions = Arc::new(FsQuestionRepository::new(questions_dir));
    let connections = Arc::new(PgConnectionRepository::new(pool));
    let clock = Arc::new(SystemClock);
    let app_state = AppState::new(sessions, questions, connections, clock);

    // Background sweep of lapsed connection leases.
    tokio::spawn(reaper::run(
        Arc::clone(&app_state.connections),
        Arc::clone(&app_state.clock),
        reaper::REAP_INTERVAL,
    ));

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::ws::router())
        .nest("/api/v1/games", routes::games::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
