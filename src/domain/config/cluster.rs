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

use crate::infrastructure::constants::{
    CLUSTER_DOMAIN, COMPOSE_PROJECT, DEFAULT_API_PORT, DNS_CLUSTER_IP, KUBERNETES_VERSION,
    MAX_POLL_ATTEMPTS, POLL_INTERVAL_SECS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable process-wide configuration. Built once in `main` and passed by
/// reference everywhere; no other component reads the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Port the API server listens on (plain HTTP, no auth)
    pub api_port: u16,

    /// Hyperkube image tag
    pub kubernetes_version: String,

    /// docker-compose project name
    pub project_name: String,

    /// Cluster IP handed to the DNS service and the kubelet's --cluster-dns
    pub dns_cluster_ip: String,

    /// --cluster-domain for the kubelet and skydns
    pub cluster_domain: String,

    /// DOCKER_HOST as captured at startup, if set
    pub docker_host: Option<String>,

    /// Delay between readiness probes
    pub poll_interval: Duration,

    /// Upper bound on readiness probes before giving up with a timeout
    pub max_poll_attempts: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            api_port: DEFAULT_API_PORT,
            kubernetes_version: KUBERNETES_VERSION.to_string(),
            project_name: COMPOSE_PROJECT.to_string(),
            dns_cluster_ip: DNS_CLUSTER_IP.to_string(),
            cluster_domain: CLUSTER_DOMAIN.to_string(),
            docker_host: None,
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            max_poll_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

impl ClusterConfig {
    /// Capture the environment once. KID_API_PORT overrides the default port;
    /// DOCKER_HOST is recorded for the host resolver.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("KID_API_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.api_port = port;
            } else {
                tracing::warn!(value = %port, "Ignoring unparseable KID_API_PORT");
            }
        }

        config.docker_host = std::env::var("DOCKER_HOST").ok().filter(|v| !v.is_empty());
        config
    }

    /// Local API server endpoint the poller and kubectl talk to.
    pub fn api_server_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.api_port)
    }
}
