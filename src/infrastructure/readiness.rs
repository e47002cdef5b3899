// Copyright 2025 kid contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Blocking wait for the API server to start answering.

use crate::domain::config::ClusterConfig;
use crate::shared::error::{KidError, Result};
use std::time::Duration;
use tokio::time::sleep;

/// A single liveness attempt. Trait seam so tests can inject a probe with a
/// scripted readiness schedule.
#[async_trait::async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn probe(&self) -> bool;
}

/// HTTP GET against the API endpoint. Any HTTP response counts as ready; the
/// server answering at all is the signal, not the status code.
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.api_server_url(),
        }
    }
}

#[async_trait::async_trait]
impl ReadinessProbe for HttpProbe {
    async fn probe(&self) -> bool {
        self.client.get(&self.url).send().await.is_ok()
    }
}

/// Fixed-interval poll loop with an explicit attempt bound. The default bound
/// is generous (hours) so interactive use still feels like "wait forever",
/// but a dead cluster eventually surfaces as a `Timeout` instead of hanging.
pub struct ReadinessPoller {
    interval: Duration,
    max_attempts: u32,
}

impl ReadinessPoller {
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            interval: config.poll_interval,
            max_attempts: config.max_poll_attempts,
        }
    }

    pub fn with_bounds(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Probe until the target answers, then issue one confirmation probe and
    /// return. The confirmation result is logged, not acted on.
    pub async fn wait(&self, probe: &dyn ReadinessProbe, target: &str) -> Result<()> {
        for attempt in 1..=self.max_attempts {
            if probe.probe().await {
                let confirmed = probe.probe().await;
                tracing::info!(probe_target = target, attempt, confirmed, "Target is ready");
                return Ok(());
            }
            tracing::debug!(probe_target = target, attempt, "Not ready yet");
            sleep(self.interval).await;
        }

        Err(KidError::timeout(target, self.max_attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Probe that fails a fixed number of times before answering.
    struct FlakyProbe {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyProbe {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ReadinessProbe for FlakyProbe {
        async fn probe(&self) -> bool {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            call >= self.failures
        }
    }

    #[tokio::test]
    async fn test_ready_after_n_intervals() {
        let probe = FlakyProbe::new(3);
        let poller = ReadinessPoller::with_bounds(Duration::from_millis(1), 10);

        poller.wait(&probe, "api server").await.unwrap();

        // 3 failed probes, the first success, and the confirmation probe
        assert_eq!(probe.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_immediately_ready_probes_twice() {
        let probe = FlakyProbe::new(0);
        let poller = ReadinessPoller::with_bounds(Duration::from_millis(1), 10);

        poller.wait(&probe, "api server").await.unwrap();
        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_never_ready_times_out() {
        let probe = FlakyProbe::new(u32::MAX);
        let poller = ReadinessPoller::with_bounds(Duration::from_millis(1), 4);

        let err = poller.wait(&probe, "api server").await.unwrap_err();
        assert!(matches!(
            err,
            KidError::Timeout { attempts: 4, .. }
        ));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 4);
    }
}
