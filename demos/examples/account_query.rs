//! Staged query-account load against the accounts API, picking a random
//! account id each iteration.
use rampart::prelude::*;
use rampart::BoxError;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("rampart=debug")
        .init();

    let client = reqwest::Client::new();

    let result = LoadTest::new("account_query", move || {
        let client = client.clone();
        async move {
            let id = rand::thread_rng().gen_range(1..=4_000);
            let start = Instant::now();
            let res = client
                .get(format!("http://localhost:3000/api/v1/accounts/{id}"))
                .send()
                .await?;
            let latency = start.elapsed();

            Ok::<_, BoxError>(if res.status() == reqwest::StatusCode::OK {
                RequestOutcome::success("ACC_QUERY_RESP", latency)
            } else {
                RequestOutcome::failure("ACC_QUERY_RESP", latency)
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
