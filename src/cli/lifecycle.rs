//! Command implementations

use crate::domain::cluster::{HostEndpoint, LifecycleSequencer};
use crate::domain::config::ClusterConfig;
use crate::infrastructure::constants::KUBECONFIG_FILE_NAME;
use crate::infrastructure::manifests::Manifest;
use crate::infrastructure::process::SystemToolRunner;
use crate::infrastructure::{compose, kubectl};
use clap::Parser;
use colored::Colorize;

#[derive(Parser, Debug)]
pub struct UpCommand {}

#[derive(Parser, Debug)]
pub struct DownCommand {
    /// Also wipe the kubelet state directory on the docker-machine host
    #[arg(long)]
    pub purge_state: bool,
}

#[derive(Parser, Debug)]
pub struct BusyboxCommand {}

#[derive(Parser, Debug)]
pub struct KubeconfigCommand {}

#[derive(Parser, Debug)]
pub struct NginxCommand {}

#[derive(Parser, Debug)]
pub struct TestCommand {}

#[derive(Parser, Debug)]
pub struct IpCommand {}

#[derive(Parser, Debug)]
pub struct KubectlCommand {
    /// Arguments forwarded verbatim after the fixed server override
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct PassthroughCommand {
    /// Arguments forwarded to the docker-compose subcommand
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct VersionCommand {}

/// Exit with the external tool's code when it failed, so passthrough commands
/// behave like the tool itself.
fn exit_on_failure(code: i32) {
    if code != 0 {
        std::process::exit(code);
    }
}

impl UpCommand {
    pub async fn execute(&self, config: &ClusterConfig) -> anyhow::Result<()> {
        let sequencer = LifecycleSequencer::new(config.clone());
        sequencer.up().await?;
        println!("Run 'kid kubeconfig' to write a kubectl config for this cluster.");
        Ok(())
    }
}

impl DownCommand {
    pub async fn execute(&self, config: &ClusterConfig) -> anyhow::Result<()> {
        let sequencer = LifecycleSequencer::new(config.clone());
        sequencer.down(self.purge_state).await?;
        Ok(())
    }
}

impl BusyboxCommand {
    pub async fn execute(&self, config: &ClusterConfig) -> anyhow::Result<()> {
        let runner = SystemToolRunner::new();
        let manifest = Manifest::BusyboxPod.render(config);
        kubectl::create_from_stdin(&runner, config, &manifest).await?;
        println!("{} busybox pod created in namespace 'default'", "✓".green());
        Ok(())
    }
}

impl KubeconfigCommand {
    pub async fn execute(&self, config: &ClusterConfig) -> anyhow::Result<()> {
        let contents = Manifest::Kubeconfig.render(config);
        tokio::fs::write(KUBECONFIG_FILE_NAME, contents).await?;
        println!(
            "Wrote ./{} pointing at {}",
            KUBECONFIG_FILE_NAME,
            config.api_server_url()
        );
        Ok(())
    }
}

impl NginxCommand {
    pub async fn execute(&self, config: &ClusterConfig) -> anyhow::Result<()> {
        let runner = SystemToolRunner::new();
        let manifest = Manifest::NginxStack.render(config);
        kubectl::create_from_stdin(&runner, config, &manifest).await?;

        let cluster_ip = kubectl::service_cluster_ip(&runner, config, "nginx").await?;
        println!("nginx is available inside the cluster at http://{}", cluster_ip);
        Ok(())
    }
}

impl TestCommand {
    pub async fn execute(&self, config: &ClusterConfig) -> anyhow::Result<()> {
        let runner = SystemToolRunner::new();
        let manifest = Manifest::BusyboxPod.render(config);

        println!("Creating busybox test pod...");
        kubectl::create_from_stdin(&runner, config, &manifest).await?;
        kubectl::wait_for_pod_phase(&runner, config, "busybox", "Running").await?;

        println!("Resolving kubernetes.default through cluster DNS...");
        let lookup_code =
            kubectl::exec(&runner, config, "busybox", &["nslookup", "kubernetes.default"]).await?;

        println!("Cleaning up test pod...");
        kubectl::delete_from_stdin(&runner, config, &manifest).await?;
        kubectl::wait_for_pod_gone(&runner, config, "busybox").await?;

        if lookup_code == 0 {
            println!("{} Cluster DNS is working", "✓".green());
        } else {
            println!("{} Cluster DNS lookup failed", "✗".red());
        }
        exit_on_failure(lookup_code);
        Ok(())
    }
}

impl IpCommand {
    pub async fn execute(&self, config: &ClusterConfig) -> anyhow::Result<()> {
        let runner = SystemToolRunner::new();
        let endpoint = HostEndpoint::resolve(config, &runner).await;
        println!("{}", endpoint.display_ip());
        Ok(())
    }
}

impl KubectlCommand {
    pub async fn execute(&self, config: &ClusterConfig) -> anyhow::Result<()> {
        let runner = SystemToolRunner::new();
        let code = kubectl::passthrough(&runner, config, &self.args).await?;
        exit_on_failure(code);
        Ok(())
    }
}

impl PassthroughCommand {
    pub async fn execute(&self, config: &ClusterConfig, subcommand: &str) -> anyhow::Result<()> {
        let runner = SystemToolRunner::new();
        let code = compose::passthrough(&runner, config, subcommand, &self.args).await?;
        exit_on_failure(code);
        Ok(())
    }
}

impl VersionCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        println!("kid {}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
