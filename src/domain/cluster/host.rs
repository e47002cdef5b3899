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

use crate::domain::config::ClusterConfig;
use crate::infrastructure::process::ToolRunner;
use regex::Regex;

/// Best-effort view of where the Docker daemon lives. Empty values mean
/// "local daemon" and are never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEndpoint {
    /// Host segment of DOCKER_HOST, or empty for a local daemon
    pub ip: String,
    /// Active docker-machine name, or empty when none is in use
    pub machine: String,
}

impl HostEndpoint {
    pub fn is_local(&self) -> bool {
        self.machine.is_empty()
    }

    /// IP to show the operator; a local daemon is reachable on loopback.
    pub fn display_ip(&self) -> &str {
        if self.ip.is_empty() {
            "127.0.0.1"
        } else {
            &self.ip
        }
    }

    /// Resolve from the captured DOCKER_HOST value and `docker-machine
    /// active`. Resolution failures degrade to empty fields.
    pub async fn resolve(config: &ClusterConfig, runner: &dyn ToolRunner) -> Self {
        let ip = config
            .docker_host
            .as_deref()
            .and_then(parse_host_segment)
            .unwrap_or_default();

        // `docker-machine active` exits non-zero when no machine is active
        // (and the binary may not exist at all); both mean "local".
        let machine = match runner.run("docker-machine", &["active"], None).await {
            Ok(output) if output.success() => output.stdout.trim().to_string(),
            _ => String::new(),
        };

        Self { ip, machine }
    }
}

/// Extract the host from a daemon URL such as `tcp://192.168.99.100:2376`.
fn parse_host_segment(docker_host: &str) -> Option<String> {
    let re = Regex::new(r"^(?:tcp|https?|unix|fd)://([^:/]+)").ok()?;
    re.captures(docker_host)
        .map(|caps| caps[1].to_string())
        .filter(|host| !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp_host() {
        assert_eq!(
            parse_host_segment("tcp://192.168.99.100:2376"),
            Some("192.168.99.100".to_string())
        );
    }

    #[test]
    fn test_parse_host_without_port() {
        assert_eq!(
            parse_host_segment("tcp://10.0.0.5"),
            Some("10.0.0.5".to_string())
        );
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_host_segment("not-a-url"), None);
        assert_eq!(parse_host_segment(""), None);
    }

    #[test]
    fn test_display_ip_defaults_to_loopback() {
        let endpoint = HostEndpoint {
            ip: String::new(),
            machine: String::new(),
        };
        assert_eq!(endpoint.display_ip(), "127.0.0.1");
        assert!(endpoint.is_local());
    }
}
