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

//! docker-compose invocations. The compose file never touches disk; it is
//! rendered by the Manifest Provider and piped in on stdin with `-f -`.

use crate::domain::config::ClusterConfig;
use crate::infrastructure::manifests::Manifest;
use crate::infrastructure::process::{run_checked, ToolRunner};
use crate::shared::error::Result;

fn base_args(config: &ClusterConfig) -> Vec<String> {
    vec![
        "-f".to_string(),
        "-".to_string(),
        "-p".to_string(),
        config.project_name.clone(),
    ]
}

/// Start the kubelet container stack, detached.
pub async fn up(runner: &dyn ToolRunner, config: &ClusterConfig) -> Result<()> {
    let manifest = Manifest::ComposeFile.render(config);
    let mut args = base_args(config);
    args.extend(["up".to_string(), "-d".to_string()]);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_checked(runner, "docker-compose", &args, Some(&manifest)).await?;
    Ok(())
}

/// Stop the stack. Stopping an already-stopped stack exits zero, so this is
/// safe to repeat.
pub async fn stop(runner: &dyn ToolRunner, config: &ClusterConfig) -> Result<()> {
    let manifest = Manifest::ComposeFile.render(config);
    let mut args = base_args(config);
    args.push("stop".to_string());
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_checked(runner, "docker-compose", &args, Some(&manifest)).await?;
    Ok(())
}

/// Force-remove stack containers and their volumes.
pub async fn remove(runner: &dyn ToolRunner, config: &ClusterConfig) -> Result<()> {
    let manifest = Manifest::ComposeFile.render(config);
    let mut args = base_args(config);
    args.extend(["rm".to_string(), "--force".to_string(), "-v".to_string()]);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_checked(runner, "docker-compose", &args, Some(&manifest)).await?;
    Ok(())
}

/// Passthrough for `logs` / `ps` / `events`, inheriting this process's
/// stdout/stderr. Returns the compose exit code.
pub async fn passthrough(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    subcommand: &str,
    extra: &[String],
) -> Result<i32> {
    let manifest = Manifest::ComposeFile.render(config);
    let mut args = base_args(config);
    args.push(subcommand.to_string());
    args.extend(extra.iter().cloned());
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    runner
        .run_streamed("docker-compose", &args, Some(&manifest))
        .await
}
