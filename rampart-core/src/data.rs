use std::time::Duration;

/// Result of one request-function invocation. Produced by the caller's
/// request function, consumed immediately by the sampler; only aggregates
/// are retained after that.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOutcome {
    pub label: String,
    pub success: bool,
    pub latency: Duration,
}

impl RequestOutcome {
    pub fn success(label: impl Into<String>, latency: Duration) -> Self {
        Self {
            label: label.into(),
            success: true,
            latency,
        }
    }

    pub fn failure(label: impl Into<String>, latency: Duration) -> Self {
        Self {
            label: label.into(),
            success: false,
            latency,
        }
    }
}
