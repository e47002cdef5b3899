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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, KidError>;

#[derive(Error, Debug)]
pub enum KidError {
    #[error("Required program not found on PATH: '{0}'. Install it and try again.")]
    MissingPrerequisite(String),

    #[error("Docker engine is not reachable: {0}")]
    EngineUnreachable(String),

    #[error("Timed out waiting for {target} after {attempts} attempts")]
    Timeout { target: String, attempts: u32 },

    #[error("'{program}' exited with status {code}: {stderr}")]
    ExternalTool {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl KidError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn timeout(target: impl Into<String>, attempts: u32) -> Self {
        Self::Timeout {
            target: target.into(),
            attempts,
        }
    }

    pub fn external_tool(program: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        Self::ExternalTool {
            program: program.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Exit code to surface when the process terminates on this error.
    /// Passthrough commands propagate the underlying tool's status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExternalTool { code, .. } if *code > 0 => *code,
            _ => 1,
        }
    }
}
