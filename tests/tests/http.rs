//! Load tests against the mock accounts service over real HTTP.
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;

    use rampart::prelude::*;
    use rampart::BoxError;
    use reqwest::Client;
    use std::sync::OnceLock;
    use std::time::{Duration, Instant};

    static CLIENT: OnceLock<Client> = OnceLock::new();

    #[tokio::test]
    async fn account_create_then_query() {
        init().await;

        let create = LoadTest::new("account_create", || async {
            let client = CLIENT.get_or_init(Client::new);
            let start = Instant::now();
            let res = client
                .post("http://0.0.0.0:3002/api/v1/accounts")
                .json(&serde_json::json!({
                    "account_id": 1,
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
        })
        .stage(Duration::from_secs(1), 5)
        .stage(Duration::from_secs(2), 5)
        .pacing(Duration::from_millis(100))
        .await
        .unwrap();

        assert!(create.clean_shutdown);
        let summary = create.summary("ACC_CREATE_RESP").unwrap();
        assert!(summary.count > 0);
        assert_eq!(summary.failures, 0);

        let query = LoadTest::new("account_query", || async {
            let client = CLIENT.get_or_init(Client::new);
            let start = Instant::now();
            let res = client
                .get("http://0.0.0.0:3002/api/v1/accounts/1")
                .send()
                .await?;
            let latency = start.elapsed();

            Ok::<_, BoxError>(if res.status() == reqwest::StatusCode::OK {
                RequestOutcome::success("ACC_QUERY_RESP", latency)
            } else {
                RequestOutcome::failure("ACC_QUERY_RESP", latency)
            })
        })
        .stage(Duration::from_secs(1), 5)
        .stage(Duration::from_secs(2), 5)
        .pacing(Duration::from_millis(100))
        .await
        .unwrap();

        assert!(query.clean_shutdown);
        let summary = query.summary("ACC_QUERY_RESP").unwrap();
        assert!(summary.count > 0);
        assert_eq!(summary.failures, 0);
    }

    #[tokio::test]
    async fn query_for_missing_account_counts_failures() {
        init().await;

        let result = LoadTest::new("missing_account", || async {
            let client = CLIENT.get_or_init(Client::new);
            let start = Instant::now();
            let res = client
                .get("http://0.0.0.0:3002/api/v1/accounts/999999999")
                .send()
                .await?;
            let latency = start.elapsed();

            Ok::<_, BoxError>(if res.status() == reqwest::StatusCode::OK {
                RequestOutcome::success("ACC_QUERY_RESP", latency)
            } else {
                RequestOutcome::failure("ACC_QUERY_RESP", latency)
            })
        })
        .stage(Duration::from_secs(1), 3)
        .pacing(Duration::from_millis(100))
        .await
        .unwrap();

        let summary = result.summary("ACC_QUERY_RESP").unwrap();
        assert!(summary.count > 0);
        assert_eq!(summary.failures, summary.count);
    }
}
