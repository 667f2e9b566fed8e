use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, RwLock,
};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// In-memory stand-in for the accounts API: enough surface for the
/// account-create and account-query load profiles.
#[derive(Clone, Default)]
pub struct Accounts {
    inner: Arc<RwLock<HashMap<u64, String>>>,
}

pub async fn run(addr: SocketAddr) {
    let app = router();

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

pub fn router() -> Router {
    Router::new()
        .route("/api/v1/accounts", post(create_account))
        .route("/api/v1/accounts/:id", get(query_account))
        .route("/delay/ms/:delay_ms", get(delay))
        .layer(TraceLayer::new_for_http())
        .with_state(Accounts::default())
}

#[derive(Deserialize)]
pub struct CreateAccount {
    pub account_id: u64,
    pub initial_balance: String,
}

#[debug_handler]
async fn create_account(
    State(accounts): State<Accounts>,
    Json(req): Json<CreateAccount>,
) -> StatusCode {
    RPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    debug!("Creating account {}", req.account_id);

    accounts
        .inner
        .write()
        .unwrap()
        .insert(req.account_id, req.initial_balance);
    StatusCode::CREATED
}

#[debug_handler]
async fn query_account(
    State(accounts): State<Accounts>,
    Path(id): Path<u64>,
) -> Result<String, StatusCode> {
    RPS_MEASURE.fetch_add(1, Ordering::Relaxed);

    accounts
        .inner
        .read()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

#[debug_handler]
async fn delay(Path(delay_ms): Path<u64>) {
    RPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}

/** RPS Printer **/

static RPS_MEASURE: AtomicU64 = AtomicU64::new(0);

pub async fn rps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let requests = RPS_MEASURE.fetch_min(0, Ordering::Relaxed);
        println!("{requests} RPS");
    }
}
