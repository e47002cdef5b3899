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

//! Fail-fast checks that run before every command except help/usage.

use crate::infrastructure::constants::REQUIRED_TOOLS;
use crate::infrastructure::process::ToolRunner;
use crate::shared::error::{KidError, Result};

/// Verify every required program is on PATH. Aborts on the first miss, before
/// any stateful action has been attempted.
pub async fn check_tools(runner: &dyn ToolRunner) -> Result<()> {
    for tool in REQUIRED_TOOLS.iter().copied() {
        let found = runner
            .run("which", &[tool], None)
            .await
            .map(|o| o.success())
            .unwrap_or(false);

        if !found {
            return Err(KidError::MissingPrerequisite(tool.to_string()));
        }
    }
    Ok(())
}

/// Lightweight engine liveness check (`docker info`).
pub async fn check_engine(runner: &dyn ToolRunner) -> Result<()> {
    let output = runner.run("docker", &["info"], None).await?;
    if !output.success() {
        return Err(KidError::EngineUnreachable(
            output.stderr.trim().to_string(),
        ));
    }
    Ok(())
}

/// Both checks, in order. Tool presence first so a missing docker binary is
/// reported as such rather than as an unreachable engine.
pub async fn check_all(runner: &dyn ToolRunner) -> Result<()> {
    check_tools(runner).await?;
    check_engine(runner).await
}
