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

use crate::infrastructure::constants::KUBELET_CONTAINER_PREFIX;
use crate::infrastructure::process::ToolRunner;
use crate::shared::error::Result;

/// Remove containers the kubelet left behind (`k8s_*` names). Compose only
/// knows about the kubelet container itself; pods it started are plain docker
/// containers. Best-effort: finding nothing is success.
pub async fn remove_cluster_containers(runner: &dyn ToolRunner) -> Result<()> {
    let filter = format!("name={}", KUBELET_CONTAINER_PREFIX);
    let listing = runner
        .run("docker", &["ps", "-aq", "--filter", &filter], None)
        .await?;

    if !listing.success() {
        tracing::warn!(stderr = %listing.stderr.trim(), "Could not list leftover containers");
        return Ok(());
    }

    let ids: Vec<&str> = listing.stdout.split_whitespace().collect();
    if ids.is_empty() {
        tracing::debug!("No leftover cluster containers");
        return Ok(());
    }

    tracing::info!(count = ids.len(), "Removing leftover cluster containers");
    let mut args = vec!["rm", "-f", "-v"];
    args.extend(ids.iter().copied());

    let removal = runner.run("docker", &args, None).await?;
    if !removal.success() {
        tracing::warn!(stderr = %removal.stderr.trim(), "Some containers could not be removed");
    }
    Ok(())
}
