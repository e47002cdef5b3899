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

//! SSH port-forward to a docker-machine host. Only relevant when the Docker
//! daemon runs on a separate machine; against a local daemon both operations
//! are no-ops.

use crate::domain::config::ClusterConfig;
use crate::infrastructure::process::ToolRunner;
use crate::shared::error::Result;
use colored::Colorize;

/// Process signature matched by pgrep/pkill to recognize our tunnel.
fn signature(config: &ClusterConfig) -> String {
    format!(
        "ssh.*-L {port}:localhost:{port}",
        port = config.api_port
    )
}

/// Forward-flag argument handed to `docker-machine ssh`.
fn forward_spec(config: &ClusterConfig) -> String {
    format!("{port}:localhost:{port}", port = config.api_port)
}

/// Establish the tunnel. No-op without a machine backend; idempotent when a
/// matching forward already runs (warns and skips).
pub async fn establish(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    machine: &str,
) -> Result<()> {
    if machine.is_empty() {
        tracing::debug!("Local Docker daemon; no tunnel needed");
        return Ok(());
    }

    let existing = runner
        .run("pgrep", &["-f", &signature(config)], None)
        .await?;
    if existing.success() {
        println!(
            "{} API server tunnel already running, leaving it alone",
            "⚠".yellow()
        );
        return Ok(());
    }

    tracing::info!(machine, port = config.api_port, "Opening SSH tunnel");
    runner
        .spawn_detached(
            "docker-machine",
            &["ssh", machine, "-f", "-N", "-L", &forward_spec(config)],
        )
        .await
}

/// Tear the tunnel down. Best-effort: pkill finding nothing is success.
pub async fn teardown(runner: &dyn ToolRunner, config: &ClusterConfig) -> Result<()> {
    let killed = runner
        .run("pkill", &["-f", &signature(config)], None)
        .await?;
    if killed.success() {
        tracing::info!("SSH tunnel closed");
    } else {
        tracing::debug!("No SSH tunnel to close");
    }
    Ok(())
}
