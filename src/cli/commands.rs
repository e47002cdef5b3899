// CLI command definitions

use super::lifecycle::{
    BusyboxCommand, DownCommand, IpCommand, KubeconfigCommand, KubectlCommand, NginxCommand,
    PassthroughCommand, TestCommand, UpCommand, VersionCommand,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "kid",
    version,
    about = "Kubernetes in Docker",
    long_about = "Launches a single-node Kubernetes cluster on the local Docker daemon using Docker Compose"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Start the cluster: compose stack, SSH tunnel if needed, DNS addon
    Up(UpCommand),

    /// Stop the cluster and remove its containers
    Down(DownCommand),

    /// Launch a busybox test pod in the default namespace
    Busybox(BusyboxCommand),

    /// Write a kubeconfig for this cluster to the current directory
    Kubeconfig(KubeconfigCommand),

    /// Deploy nginx and print its service cluster IP
    Nginx(NginxCommand),

    /// Smoke-test the cluster: busybox pod + DNS lookup, then clean up
    Test(TestCommand),

    /// Print the resolved Docker host IP
    Ip(IpCommand),

    /// Forward arguments to kubectl against this cluster
    Kubectl(KubectlCommand),

    /// Forward to docker-compose logs
    Logs(PassthroughCommand),

    /// Forward to docker-compose ps
    Ps(PassthroughCommand),

    /// Forward to docker-compose events
    Events(PassthroughCommand),

    /// Print the kid version
    Version(VersionCommand),
}

impl Commands {
    /// Commands that only print fixed text skip the prerequisite checks.
    pub fn needs_prerequisites(&self) -> bool {
        !matches!(self, Commands::Version(_))
    }
}
