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

use crate::shared::error::{KidError, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Captured result of an external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Seam over external tool invocation. Everything the CLI does to the outside
/// world (docker, docker-compose, docker-machine, kubectl, ssh helpers) goes
/// through this trait so flows can be exercised with a recording fake.
#[async_trait::async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run to completion, capturing stdout/stderr. A non-zero exit is not an
    /// error here; callers decide whether the status is fatal.
    async fn run(&self, program: &str, args: &[&str], stdin: Option<&str>) -> Result<ToolOutput>;

    /// Run with stdout/stderr inherited from this process, returning the exit
    /// code. Used by passthrough commands.
    async fn run_streamed(&self, program: &str, args: &[&str], stdin: Option<&str>)
        -> Result<i32>;

    /// Fire and forget. The child is not waited on; used for the backgrounded
    /// SSH tunnel.
    async fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<()>;
}

/// Production runner backed by `tokio::process::Command`.
pub struct SystemToolRunner;

impl SystemToolRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ToolRunner for SystemToolRunner {
    async fn run(&self, program: &str, args: &[&str], stdin: Option<&str>) -> Result<ToolOutput> {
        tracing::debug!(program, ?args, "Running external tool");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| KidError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

        if let Some(payload) = stdin {
            // take() so the pipe closes once the payload is written
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(payload.as_bytes()).await?;
            }
        }

        let output = child.wait_with_output().await?;
        Ok(ToolOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_streamed(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<&str>,
    ) -> Result<i32> {
        tracing::debug!(program, ?args, "Running external tool (streamed)");

        let mut command = Command::new(program);
        command.args(args).stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });

        let mut child = command.spawn().map_err(|e| KidError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

        if let Some(payload) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(payload.as_bytes()).await?;
            }
        }

        let status = child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }

    async fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<()> {
        tracing::debug!(program, ?args, "Spawning detached process");

        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| KidError::Spawn {
                program: program.to_string(),
                source: e,
            })?;

        Ok(())
    }
}

/// Run a tool and require a zero exit, mapping failure to `ExternalTool`.
pub async fn run_checked(
    runner: &dyn ToolRunner,
    program: &str,
    args: &[&str],
    stdin: Option<&str>,
) -> Result<ToolOutput> {
    let output = runner.run(program, args, stdin).await?;
    if !output.success() {
        return Err(KidError::external_tool(
            program,
            output.status,
            output.stderr.trim(),
        ));
    }
    Ok(output)
}
