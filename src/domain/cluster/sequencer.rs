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

use crate::domain::cluster::host::HostEndpoint;
use crate::domain::config::ClusterConfig;
use crate::infrastructure::constants::KUBELET_STATE_DIR;
use crate::infrastructure::manifests::Manifest;
use crate::infrastructure::process::{SystemToolRunner, ToolRunner};
use crate::infrastructure::readiness::{HttpProbe, ReadinessPoller, ReadinessProbe};
use crate::infrastructure::{compose, docker, kubectl, tunnel};
use crate::shared::error::Result;
use colored::Colorize;

/// Drives the two top-level flows. Each step returns an explicit Result and
/// the sequencer decides per step whether a failure aborts the flow;
/// cleanup steps on the way down are best-effort.
pub struct LifecycleSequencer {
    config: ClusterConfig,
    runner: Box<dyn ToolRunner>,
}

impl LifecycleSequencer {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            runner: Box::new(SystemToolRunner::new()),
        }
    }

    pub fn with_runner(config: ClusterConfig, runner: Box<dyn ToolRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn runner(&self) -> &dyn ToolRunner {
        self.runner.as_ref()
    }

    /// Up flow: start stack → tunnel → wait for the API server → namespace →
    /// DNS addon. Any failing step aborts; partial state is left for `down`.
    pub async fn up(&self) -> Result<()> {
        let probe = HttpProbe::new(&self.config);
        self.up_with_probe(&probe).await
    }

    pub async fn up_with_probe(&self, probe: &dyn ReadinessProbe) -> Result<()> {
        let runner = self.runner.as_ref();

        println!("Starting Kubernetes cluster components...");
        compose::up(runner, &self.config).await?;

        let endpoint = HostEndpoint::resolve(&self.config, runner).await;
        tunnel::establish(runner, &self.config, &endpoint.machine).await?;

        println!(
            "Waiting for Kubernetes cluster to become available on port {}...",
            self.config.api_port
        );
        let poller = ReadinessPoller::new(&self.config);
        poller.wait(probe, "Kubernetes API server").await?;

        kubectl::create_from_stdin(runner, &self.config, &Manifest::Namespace.render(&self.config))
            .await?;

        println!("Installing cluster DNS...");
        kubectl::create_from_stdin(runner, &self.config, &Manifest::DnsAddon.render(&self.config))
            .await?;

        println!("{} Kubernetes cluster is up", "✓".green());
        Ok(())
    }

    /// Down flow: tunnel → compose stop → compose rm → leftover containers →
    /// optional remote state purge. Tolerates "nothing running" throughout so
    /// a second pass succeeds.
    pub async fn down(&self, purge_state: bool) -> Result<()> {
        let runner = self.runner.as_ref();
        let endpoint = HostEndpoint::resolve(&self.config, runner).await;

        if let Err(e) = tunnel::teardown(runner, &self.config).await {
            tracing::warn!(error = %e, "Tunnel teardown failed, continuing");
        }

        println!("Stopping Kubernetes cluster components...");
        compose::stop(runner, &self.config).await?;
        compose::remove(runner, &self.config).await?;

        docker::remove_cluster_containers(runner).await?;

        if purge_state {
            self.purge_remote_state(&endpoint).await;
        }

        println!("{} Kubernetes cluster is down", "✓".green());
        Ok(())
    }

    /// Remove the kubelet state directory on the docker-machine host.
    /// Opt-in (`down --purge-state`) and best-effort; without a machine
    /// backend there is nothing to clean remotely.
    async fn purge_remote_state(&self, endpoint: &HostEndpoint) {
        if endpoint.is_local() {
            tracing::debug!("Local daemon; skipping remote state purge");
            return;
        }

        println!("Purging kubelet state on machine '{}'...", endpoint.machine);
        let cleanup = format!(
            "sudo umount {dir}/* >/dev/null 2>&1; sudo rm -rf {dir}",
            dir = KUBELET_STATE_DIR
        );
        let result = self
            .runner
            .run(
                "docker-machine",
                &["ssh", &endpoint.machine, &cleanup],
                None,
            )
            .await;

        match result {
            Ok(output) if output.success() => {}
            Ok(output) => {
                tracing::warn!(stderr = %output.stderr.trim(), "Remote state purge failed")
            }
            Err(e) => tracing::warn!(error = %e, "Remote state purge failed"),
        }
    }
}
