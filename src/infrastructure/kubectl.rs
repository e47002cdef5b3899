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

//! kubectl invocations, always pre-seeded with the local server override so
//! the user's own kubeconfig/context never leaks in.

use crate::domain::config::ClusterConfig;
use crate::infrastructure::process::{run_checked, ToolRunner};
use crate::shared::error::{KidError, Result};
use backon::{ConstantBuilder, Retryable};
use serde::Deserialize;

/// Fixed server/context/cluster override prepended to every invocation.
pub fn base_args(config: &ClusterConfig) -> Vec<String> {
    vec![
        "-s".to_string(),
        config.api_server_url(),
        "--context=".to_string(),
        "--cluster=".to_string(),
    ]
}

fn seeded(config: &ClusterConfig, rest: &[&str]) -> Vec<String> {
    let mut args = base_args(config);
    args.extend(rest.iter().map(|s| s.to_string()));
    args
}

/// `kubectl create -f -` with the manifest on stdin.
pub async fn create_from_stdin(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    manifest: &str,
) -> Result<()> {
    let args = seeded(config, &["create", "-f", "-"]);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_checked(runner, "kubectl", &args, Some(manifest)).await?;
    Ok(())
}

/// `kubectl delete -f -` with the manifest on stdin.
pub async fn delete_from_stdin(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    manifest: &str,
) -> Result<()> {
    let args = seeded(config, &["delete", "-f", "-"]);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_checked(runner, "kubectl", &args, Some(manifest)).await?;
    Ok(())
}

/// Forward arguments verbatim after the seeded override, inheriting stdio.
pub async fn passthrough(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    extra: &[String],
) -> Result<i32> {
    let mut args = base_args(config);
    args.extend(extra.iter().cloned());
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    runner.run_streamed("kubectl", &args, None).await
}

/// Run a command in a pod, streaming its output.
pub async fn exec(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    pod: &str,
    command: &[&str],
) -> Result<i32> {
    let mut rest = vec!["exec", pod, "--"];
    rest.extend(command);
    let args = seeded(config, &rest);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    runner.run_streamed("kubectl", &args, None).await
}

#[derive(Debug, Deserialize)]
struct PodStatus {
    phase: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PodDoc {
    status: Option<PodStatus>,
}

#[derive(Debug, Deserialize)]
struct ServiceSpec {
    #[serde(rename = "clusterIP")]
    cluster_ip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceDoc {
    spec: Option<ServiceSpec>,
}

/// Current phase of a pod, or None if the pod does not exist.
pub async fn pod_phase(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    pod: &str,
) -> Result<Option<String>> {
    let args = seeded(config, &["get", "pod", pod, "-o", "json"]);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = runner.run("kubectl", &args, None).await?;

    if !output.success() {
        // NotFound and friends; the pod is simply not there
        return Ok(None);
    }

    let doc: PodDoc = serde_json::from_str(&output.stdout)?;
    Ok(doc.status.and_then(|s| s.phase))
}

/// Block until the pod reports the given phase, bounded by the configured
/// retry policy.
pub async fn wait_for_pod_phase(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    pod: &str,
    phase: &str,
) -> Result<()> {
    let policy = ConstantBuilder::default()
        .with_delay(config.poll_interval)
        .with_max_times(config.max_poll_attempts as usize);

    (|| async move {
        match pod_phase(runner, config, pod).await? {
            Some(current) if current == phase => Ok(()),
            _ => Err(KidError::timeout(
                format!("pod '{}' to reach phase {}", pod, phase),
                config.max_poll_attempts,
            )),
        }
    })
    .retry(&policy)
    .when(|e| matches!(e, KidError::Timeout { .. }))
    .notify(|_, _| tracing::debug!(pod, phase, "Still waiting for pod phase"))
    .await
}

/// Block until the pod is gone, bounded by the configured retry policy.
pub async fn wait_for_pod_gone(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    pod: &str,
) -> Result<()> {
    let policy = ConstantBuilder::default()
        .with_delay(config.poll_interval)
        .with_max_times(config.max_poll_attempts as usize);

    (|| async move {
        match pod_phase(runner, config, pod).await? {
            None => Ok(()),
            Some(_) => Err(KidError::timeout(
                format!("pod '{}' to terminate", pod),
                config.max_poll_attempts,
            )),
        }
    })
    .retry(&policy)
    .when(|e| matches!(e, KidError::Timeout { .. }))
    .notify(|_, _| tracing::debug!(pod, "Still waiting for pod removal"))
    .await
}

/// Cluster IP of a service.
pub async fn service_cluster_ip(
    runner: &dyn ToolRunner,
    config: &ClusterConfig,
    service: &str,
) -> Result<String> {
    let args = seeded(config, &["get", "svc", service, "-o", "json"]);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = run_checked(runner, "kubectl", &args, None).await?;

    let doc: ServiceDoc = serde_json::from_str(&output.stdout)?;
    doc.spec
        .and_then(|s| s.cluster_ip)
        .ok_or_else(|| KidError::config_error(format!("service '{}' has no cluster IP", service)))
}
