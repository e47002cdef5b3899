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

//! Static configuration payloads piped to the external tools.
//!
//! Rendering is a pure function of `ClusterConfig`; the same config always
//! produces byte-identical output. There is no conditional content.

use crate::domain::config::ClusterConfig;
use crate::infrastructure::constants::{
    DNS_REPLICAS, ETCD_IMAGE, HEALTHZ_IMAGE, HYPERKUBE_IMAGE, KUBE2SKY_IMAGE,
    KUBECONFIG_CLUSTER_NAME, SKYDNS_IMAGE, SYSTEM_NAMESPACE,
};

/// The closed set of documents this tool ever emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manifest {
    /// docker-compose service definition for the kubelet container
    ComposeFile,
    /// kube-system Namespace
    Namespace,
    /// kube-dns ReplicationController + Service (skydns stack)
    DnsAddon,
    /// Anonymous single-cluster client config for the local API server
    Kubeconfig,
    /// Throwaway busybox Pod used for smoke testing
    BusyboxPod,
    /// nginx ReplicationController + Service
    NginxStack,
}

impl Manifest {
    pub fn render(&self, config: &ClusterConfig) -> String {
        match self {
            Manifest::ComposeFile => compose_file(config),
            Manifest::Namespace => namespace(),
            Manifest::DnsAddon => dns_addon(config),
            Manifest::Kubeconfig => kubeconfig(config),
            Manifest::BusyboxPod => busybox_pod(),
            Manifest::NginxStack => nginx_stack(),
        }
    }
}

fn compose_file(config: &ClusterConfig) -> String {
    format!(
        r#"kubelet:
  image: {image}:{version}
  command: >
    /hyperkube kubelet
    --containerized
    --hostname-override=127.0.0.1
    --address=0.0.0.0
    --api-servers=http://localhost:{port}
    --config=/etc/kubernetes/manifests
    --cluster-dns={dns_ip}
    --cluster-domain={domain}
    --allow-privileged=true
    --v=2
  net: host
  pid: host
  privileged: true
  volumes:
    - /:/rootfs:ro
    - /sys:/sys:ro
    - /var/lib/docker/:/var/lib/docker:rw
    - /var/lib/kubelet/:/var/lib/kubelet:rw,shared
    - /var/run:/var/run:rw
"#,
        image = HYPERKUBE_IMAGE,
        version = config.kubernetes_version,
        port = config.api_port,
        dns_ip = config.dns_cluster_ip,
        domain = config.cluster_domain,
    )
}

fn namespace() -> String {
    format!(
        r#"apiVersion: v1
kind: Namespace
metadata:
  name: {ns}
"#,
        ns = SYSTEM_NAMESPACE
    )
}

fn dns_addon(config: &ClusterConfig) -> String {
    format!(
        r#"apiVersion: v1
kind: ReplicationController
metadata:
  name: kube-dns-v10
  namespace: {ns}
  labels:
    k8s-app: kube-dns
    version: v10
    kubernetes.io/cluster-service: "true"
spec:
  replicas: {replicas}
  selector:
    k8s-app: kube-dns
    version: v10
  template:
    metadata:
      labels:
        k8s-app: kube-dns
        version: v10
        kubernetes.io/cluster-service: "true"
    spec:
      containers:
      - name: etcd
        image: {etcd_image}
        command:
        - /usr/local/bin/etcd
        - -data-dir
        - /var/etcd/data
        - -listen-client-urls
        - http://127.0.0.1:2379,http://127.0.0.1:4001
        - -advertise-client-urls
        - http://127.0.0.1:2379,http://127.0.0.1:4001
        - -initial-cluster-token
        - skydns-etcd
        volumeMounts:
        - name: etcd-storage
          mountPath: /var/etcd/data
      - name: kube2sky
        image: {kube2sky_image}
        args:
        - -domain={domain}
        - -kube_master_url=http://localhost:{port}
      - name: skydns
        image: {skydns_image}
        args:
        - -machines=http://127.0.0.1:4001
        - -addr=0.0.0.0:53
        - -ns-rotate=false
        - -domain={domain}.
        ports:
        - containerPort: 53
          name: dns
          protocol: UDP
        - containerPort: 53
          name: dns-tcp
          protocol: TCP
        livenessProbe:
          httpGet:
            path: /healthz
            port: 8080
            scheme: HTTP
          initialDelaySeconds: 30
          timeoutSeconds: 5
        readinessProbe:
          httpGet:
            path: /healthz
            port: 8080
            scheme: HTTP
          initialDelaySeconds: 1
          timeoutSeconds: 5
      - name: healthz
        image: {healthz_image}
        args:
        - -cmd=nslookup kubernetes.default.svc.{domain} 127.0.0.1 >/dev/null
        - -port=8080
        ports:
        - containerPort: 8080
          protocol: TCP
      volumes:
      - name: etcd-storage
        emptyDir: {{}}
      dnsPolicy: Default
---
apiVersion: v1
kind: Service
metadata:
  name: kube-dns
  namespace: {ns}
  labels:
    k8s-app: kube-dns
    kubernetes.io/cluster-service: "true"
    kubernetes.io/name: KubeDNS
spec:
  selector:
    k8s-app: kube-dns
  clusterIP: {dns_ip}
  ports:
  - name: dns
    port: 53
    protocol: UDP
  - name: dns-tcp
    port: 53
    protocol: TCP
"#,
        ns = SYSTEM_NAMESPACE,
        replicas = DNS_REPLICAS,
        etcd_image = ETCD_IMAGE,
        kube2sky_image = KUBE2SKY_IMAGE,
        skydns_image = SKYDNS_IMAGE,
        healthz_image = HEALTHZ_IMAGE,
        domain = config.cluster_domain,
        port = config.api_port,
        dns_ip = config.dns_cluster_ip,
    )
}

fn kubeconfig(config: &ClusterConfig) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
preferences: {{}}
clusters:
- cluster:
    server: http://127.0.0.1:{port}
  name: {name}
contexts:
- context:
    cluster: {name}
    user: ""
  name: {name}
current-context: {name}
users: []
"#,
        port = config.api_port,
        name = KUBECONFIG_CLUSTER_NAME,
    )
}

fn busybox_pod() -> String {
    r#"apiVersion: v1
kind: Pod
metadata:
  name: busybox
  namespace: default
spec:
  containers:
  - name: busybox
    image: busybox
    imagePullPolicy: IfNotPresent
    command:
    - sleep
    - "3600"
  restartPolicy: Always
"#
    .to_string()
}

fn nginx_stack() -> String {
    r#"apiVersion: v1
kind: ReplicationController
metadata:
  name: nginx
  namespace: default
  labels:
    run: nginx
spec:
  replicas: 1
  selector:
    run: nginx
  template:
    metadata:
      labels:
        run: nginx
    spec:
      containers:
      - name: nginx
        image: nginx
        ports:
        - containerPort: 80
---
apiVersion: v1
kind: Service
metadata:
  name: nginx
  namespace: default
  labels:
    run: nginx
spec:
  selector:
    run: nginx
  ports:
  - port: 80
    protocol: TCP
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_file_mentions_port_and_dns() {
        let config = ClusterConfig::default();
        let doc = Manifest::ComposeFile.render(&config);
        assert!(doc.contains("--api-servers=http://localhost:8080"));
        assert!(doc.contains("--cluster-dns=10.0.0.10"));
        assert!(doc.contains("hyperkube"));
    }

    #[test]
    fn test_dns_addon_names() {
        let config = ClusterConfig::default();
        let doc = Manifest::DnsAddon.render(&config);
        assert!(doc.contains("name: kube-dns-v10"));
        assert!(doc.contains("name: kube-dns"));
        assert!(doc.contains("clusterIP: 10.0.0.10"));
        assert!(doc.contains("namespace: kube-system"));
    }

    #[test]
    fn test_kubeconfig_tracks_api_port() {
        let config = ClusterConfig {
            api_port: 9999,
            ..Default::default()
        };
        let doc = Manifest::Kubeconfig.render(&config);
        assert!(doc.contains("server: http://127.0.0.1:9999"));
    }
}
