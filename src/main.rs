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

use clap::{CommandFactory, Parser};
use colored::Colorize;
use kid::cli::{commands::Commands, CliArgs};
use kid::domain::config::ClusterConfig;
use kid::infrastructure::{prereq, process::SystemToolRunner};
use kid::shared::KidError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();

    // Bare invocation prints usage and succeeds
    let Some(command) = args.command else {
        CliArgs::command().print_help()?;
        return Ok(());
    };

    // Environment is read exactly once, here
    let config = ClusterConfig::from_env();

    if command.needs_prerequisites() {
        let runner = SystemToolRunner::new();
        if let Err(e) = prereq::check_all(&runner).await {
            eprintln!("{} {}", "✗".red(), e);
            std::process::exit(e.exit_code());
        }
    }

    let result = match command {
        Commands::Up(cmd) => cmd.execute(&config).await,
        Commands::Down(cmd) => cmd.execute(&config).await,
        Commands::Busybox(cmd) => cmd.execute(&config).await,
        Commands::Kubeconfig(cmd) => cmd.execute(&config).await,
        Commands::Nginx(cmd) => cmd.execute(&config).await,
        Commands::Test(cmd) => cmd.execute(&config).await,
        Commands::Ip(cmd) => cmd.execute(&config).await,
        Commands::Kubectl(cmd) => cmd.execute(&config).await,
        Commands::Logs(cmd) => cmd.execute(&config, "logs").await,
        Commands::Ps(cmd) => cmd.execute(&config, "ps").await,
        Commands::Events(cmd) => cmd.execute(&config, "events").await,
        Commands::Version(cmd) => cmd.execute().await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "✗".red(), e);
        let code = e
            .downcast_ref::<KidError>()
            .map(KidError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }

    Ok(())
}
