// Retail Rewards - API Server
//
// One read endpoint: GET /customers/:customer_id/rewards returns the
// customer's 90-day reward summary as JSON. Unknown customer → 404,
// no recent activity → 422, both with a human-readable message.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use retail_rewards::{RewardPolicy, RewardsError, RewardsService, SqliteStore};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    policy: RewardPolicy,
}

/// Error body carrying a human-readable message
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl ErrorResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /customers/:customer_id/rewards - Reward summary for one customer
async fn get_customer_rewards(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    let service = RewardsService::new(SqliteStore::new(&conn), state.policy);

    match service.rewards_for_customer(customer_id, Utc::now()) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e @ RewardsError::CustomerNotFound { .. }) => {
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
        Err(e @ RewardsError::NoRecentTransactions) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
        Err(e) => {
            log::error!("Rewards lookup failed for customer {}: {}", customer_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    env_logger::init();

    println!("🌐 Retail Rewards - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::path::Path::new("rewards.db");

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: cargo run import");
        eprintln!("   to seed customers and transactions first.");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path).expect("Failed to open database");
    println!("✓ Database opened: {:?}", db_path);

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        policy: RewardPolicy::default(),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/customers/:customer_id/rewards", get(get_customer_rewards))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   Try: http://localhost:3000/customers/1001/rewards");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
