//! Staged create-account load against the accounts API.
//!
//! Start the mock service first (`cargo run -p mock-service`), or point the
//! URL at a real deployment.
use rampart::prelude::*;
use rampart::BoxError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("rampart=debug")
        .init();

    let client = reqwest::Client::new();
    let next_id = Arc::new(AtomicU64::new(1));

    let result = LoadTest::new("account_create", move || {
        let client = client.clone();
        let next_id = next_id.clone();
        async move {
            let id = next_id.fetch_add(1, Ordering::Relaxed);
            let start = Instant::now();
            let res = client
                .post("http://localhost:3000/api/v1/accounts")
                .json(&serde_json::json!({
                    "account_id": id,
                    "initial_balance": "123123.1",
                }))
                .send()
                .await?;
            let latency = start.elapsed();

            Ok::<_, BoxError>(if res.status() == reqwest::StatusCode::CREATED {
                RequestOutcome::success("ACC_CREATE_RESP", latency)
            } else {
                RequestOutcome::failure("ACC_CREATE_RESP", latency)
            })
        }
    })
    .stage(Duration::from_secs(30), 50)
    .stage(Duration::from_secs(60), 50)
    .stage(Duration::from_secs(10), 0)
    .pacing(Duration::from_secs(1))
    .await?;

    println!("{result}");
    Ok(())
}
