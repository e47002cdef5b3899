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

/// API server
pub const DEFAULT_API_PORT: u16 = 8080;

/// Kubernetes release the hyperkube image tracks
pub const KUBERNETES_VERSION: &str = "v1.2.4";
pub const HYPERKUBE_IMAGE: &str = "gcr.io/google_containers/hyperkube-amd64";

/// Compose project name; container names start with it
pub const COMPOSE_PROJECT: &str = "kid";

/// Cluster DNS
pub const DNS_CLUSTER_IP: &str = "10.0.0.10";
pub const DNS_REPLICAS: u32 = 1;
pub const CLUSTER_DOMAIN: &str = "cluster.local";
pub const SYSTEM_NAMESPACE: &str = "kube-system";

/// DNS addon images (skydns stack)
pub const ETCD_IMAGE: &str = "gcr.io/google_containers/etcd-amd64:2.2.1";
pub const KUBE2SKY_IMAGE: &str = "gcr.io/google_containers/kube2sky:1.14";
pub const SKYDNS_IMAGE: &str = "gcr.io/google_containers/skydns:2015-10-13-8c72f8c";
pub const HEALTHZ_IMAGE: &str = "gcr.io/google_containers/exechealthz:1.0";

/// Readiness polling
pub const POLL_INTERVAL_SECS: u64 = 7;
pub const MAX_POLL_ATTEMPTS: u32 = 3600;

/// Containers the kubelet spawns are named k8s_<container>_<pod>_...
pub const KUBELET_CONTAINER_PREFIX: &str = "k8s_";

/// Remote state directory cleaned up on `down --purge-state`
pub const KUBELET_STATE_DIR: &str = "/var/lib/kubelet";

/// Programs that must be present before any command runs
pub const REQUIRED_TOOLS: &[&str] = &["docker", "docker-compose", "kubectl"];

/// kubeconfig written by the `kubeconfig` command
pub const KUBECONFIG_FILE_NAME: &str = "kubeconfig";
pub const KUBECONFIG_CLUSTER_NAME: &str = "kid";
