//! Health endpoint plumbing shared by all four services. Each service
//! reports itself plus the liveness of the peers it calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::time::timeout;

const DEPENDENCY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub dependencies: HashMap<String, DependencyStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyStatus {
    Healthy { status: String, latency_ms: u64 },
    Unhealthy { status: String, error: String },
}

#[async_trait]
pub trait DependencyChecker: Send + Sync {
    fn name(&self) -> &str;
    async fn check(&self) -> DependencyStatus;
}

/// Probes a peer service's own `/health` endpoint.
pub struct PeerChecker {
    name: String,
    client: reqwest::Client,
    base_url: String,
}

impl PeerChecker {
    pub fn new(name: &str, base_url: String) -> Self {
        Self {
            name: name.to_string(),
            client: reqwest::Client::builder()
                .timeout(DEPENDENCY_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }
}

#[async_trait]
impl DependencyChecker for PeerChecker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> DependencyStatus {
        let start = Instant::now();
        let url = format!("{}/health", self.base_url.trim_end_matches('/'));
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => DependencyStatus::Healthy {
                status: "healthy".to_string(),
                latency_ms: start.elapsed().as_millis() as u64,
            },
            Ok(response) => DependencyStatus::Unhealthy {
                status: "unhealthy".to_string(),
                error: format!("status {}", response.status()),
            },
            Err(e) => DependencyStatus::Unhealthy {
                status: "unhealthy".to_string(),
                error: e.to_string(),
            },
        }
    }
}

pub async fn check_health(
    service: &str,
    checkers: &[Box<dyn DependencyChecker>],
    start_time: Instant,
) -> HealthResponse {
    let mut dependencies = HashMap::new();
    for checker in checkers {
        let result = timeout(DEPENDENCY_TIMEOUT, checker.check()).await;
        dependencies.insert(
            checker.name().to_string(),
            result.unwrap_or_else(|_| DependencyStatus::Unhealthy {
                status: "unhealthy".to_string(),
                error: "timeout".to_string(),
            }),
        );
    }

    let degraded = dependencies
        .values()
        .any(|status| matches!(status, DependencyStatus::Unhealthy { .. }));

    HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        service: service.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
        dependencies,
    }
}
