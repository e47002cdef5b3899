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

//! Flow-level tests using a recording fake in place of the external tools.

use kid::infrastructure::{kubectl, prereq, tunnel};
use kid::{
    ClusterConfig, HttpProbe, KidError, LifecycleSequencer, ReadinessProbe, ToolOutput, ToolRunner,
};
use std::sync::{Arc, Mutex};

/// One recorded invocation: the command line plus whatever was piped in.
#[derive(Debug, Clone)]
struct RecordedCall {
    line: String,
    stdin: Option<String>,
}

/// Scriptable stand-in for the external tools. Defaults model a quiet local
/// machine: every required tool present, no docker-machine, no tunnel,
/// nothing running.
#[derive(Clone)]
struct RecordingRunner {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    missing_tools: Vec<String>,
    active_machine: Option<String>,
    tunnel_running: bool,
}

impl RecordingRunner {
    fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            missing_tools: Vec::new(),
            active_machine: None,
            tunnel_running: false,
        }
    }

    fn record(&self, program: &str, args: &[&str], stdin: Option<&str>) -> String {
        let line = if args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, args.join(" "))
        };
        self.calls.lock().unwrap().push(RecordedCall {
            line: line.clone(),
            stdin: stdin.map(str::to_string),
        });
        line
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn lines(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.line).collect()
    }
}

#[async_trait::async_trait]
impl ToolRunner for RecordingRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<&str>,
    ) -> kid::Result<ToolOutput> {
        self.record(program, args, stdin);

        let (status, stdout) = match program {
            "which" => {
                let tool = args.first().copied().unwrap_or_default();
                if self.missing_tools.iter().any(|t| t == tool) {
                    (1, String::new())
                } else {
                    (0, format!("/usr/local/bin/{}", tool))
                }
            }
            "docker-machine" if args.first() == Some(&"active") => match &self.active_machine {
                Some(machine) => (0, format!("{}\n", machine)),
                None => (1, String::new()),
            },
            "pgrep" | "pkill" => {
                if self.tunnel_running {
                    (0, "4242\n".to_string())
                } else {
                    (1, String::new())
                }
            }
            // `docker ps -aq` finds nothing; `docker info` succeeds
            _ => (0, String::new()),
        };

        Ok(ToolOutput {
            status,
            stdout,
            stderr: String::new(),
        })
    }

    async fn run_streamed(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<&str>,
    ) -> kid::Result<i32> {
        self.record(program, args, stdin);
        Ok(0)
    }

    async fn spawn_detached(&self, program: &str, args: &[&str]) -> kid::Result<()> {
        self.record(program, args, None);
        Ok(())
    }
}

struct AlwaysReady;

#[async_trait::async_trait]
impl ReadinessProbe for AlwaysReady {
    async fn probe(&self) -> bool {
        true
    }
}

fn test_config() -> ClusterConfig {
    ClusterConfig {
        poll_interval: std::time::Duration::from_millis(1),
        max_poll_attempts: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_up_flow_ordering_on_local_daemon() {
    let runner = RecordingRunner::new();
    let sequencer = LifecycleSequencer::with_runner(test_config(), Box::new(runner.clone()));

    sequencer.up_with_probe(&AlwaysReady).await.unwrap();

    let lines = runner.lines();
    let compose_up = lines
        .iter()
        .position(|l| l == "docker-compose -f - -p kid up -d")
        .expect("compose up not invoked");

    let creates: Vec<RecordedCall> = runner
        .calls()
        .into_iter()
        .filter(|c| c.line.starts_with("kubectl") && c.line.ends_with("create -f -"))
        .collect();

    assert_eq!(creates.len(), 2, "expected namespace + DNS creates");
    assert!(creates[0].stdin.as_ref().unwrap().contains("kind: Namespace"));
    assert!(creates[1].stdin.as_ref().unwrap().contains("kube-dns-v10"));

    // the stack starts before anything talks to the API server
    let first_kubectl = lines.iter().position(|l| l.starts_with("kubectl")).unwrap();
    assert!(compose_up < first_kubectl);

    // no machine backend, so no tunnel process was spawned
    assert!(!lines.iter().any(|l| l.contains("ssh")));
}

#[tokio::test]
async fn test_up_skips_existing_tunnel() {
    let mut runner = RecordingRunner::new();
    runner.active_machine = Some("dev".to_string());
    runner.tunnel_running = true;

    let sequencer = LifecycleSequencer::with_runner(test_config(), Box::new(runner.clone()));
    sequencer.up_with_probe(&AlwaysReady).await.unwrap();

    let lines = runner.lines();
    assert!(lines.iter().any(|l| l.starts_with("pgrep")));
    assert!(
        !lines.iter().any(|l| l.starts_with("docker-machine ssh")),
        "tunnel must not be re-established"
    );
}

#[tokio::test]
async fn test_up_establishes_tunnel_for_machine_backend() {
    let mut runner = RecordingRunner::new();
    runner.active_machine = Some("dev".to_string());

    let sequencer = LifecycleSequencer::with_runner(test_config(), Box::new(runner.clone()));
    sequencer.up_with_probe(&AlwaysReady).await.unwrap();

    let lines = runner.lines();
    assert!(lines
        .iter()
        .any(|l| l == "docker-machine ssh dev -f -N -L 8080:localhost:8080"));
}

#[tokio::test]
async fn test_down_is_idempotent_when_nothing_runs() {
    let runner = RecordingRunner::new();
    let sequencer = LifecycleSequencer::with_runner(test_config(), Box::new(runner.clone()));

    // nothing running: pkill finds no tunnel, docker ps lists no containers
    sequencer.down(false).await.unwrap();
    sequencer.down(false).await.unwrap();

    let lines = runner.lines();
    assert_eq!(
        lines
            .iter()
            .filter(|l| l.starts_with("docker-compose") && l.ends_with("stop"))
            .count(),
        2
    );
    // no removal was ever attempted since nothing was found
    assert!(!lines.iter().any(|l| l.starts_with("docker rm")));
}

#[tokio::test]
async fn test_down_purges_remote_state_only_with_flag_and_machine() {
    let mut runner = RecordingRunner::new();
    runner.active_machine = Some("dev".to_string());

    let sequencer =
        LifecycleSequencer::with_runner(test_config(), Box::new(runner.clone()));
    sequencer.down(false).await.unwrap();
    assert!(!runner.lines().iter().any(|l| l.contains("rm -rf")));

    sequencer.down(true).await.unwrap();
    assert!(runner
        .lines()
        .iter()
        .any(|l| l.starts_with("docker-machine ssh dev") && l.contains("rm -rf")));
}

#[tokio::test]
async fn test_missing_prerequisite_aborts_before_any_action() {
    let mut runner = RecordingRunner::new();
    runner.missing_tools = vec!["kubectl".to_string()];

    let err = prereq::check_all(&runner).await.unwrap_err();
    assert!(matches!(err, KidError::MissingPrerequisite(ref tool) if tool == "kubectl"));

    // only presence lookups ran; nothing touched the engine or the cluster
    let lines = runner.lines();
    assert!(lines.iter().all(|l| l.starts_with("which")));
}

#[tokio::test]
async fn test_kubectl_passthrough_is_seeded() {
    let runner = RecordingRunner::new();
    let config = test_config();

    kubectl::passthrough(&runner, &config, &["get".to_string(), "pods".to_string()])
        .await
        .unwrap();

    assert_eq!(
        runner.lines(),
        vec!["kubectl -s http://127.0.0.1:8080 --context= --cluster= get pods"]
    );
}

#[tokio::test]
async fn test_tunnel_noop_without_machine() {
    let runner = RecordingRunner::new();
    let config = test_config();

    tunnel::establish(&runner, &config, "").await.unwrap();
    assert!(runner.lines().is_empty());
}

#[tokio::test]
async fn test_tunnel_teardown_tolerates_nothing_running() {
    let runner = RecordingRunner::new();
    let config = test_config();

    tunnel::teardown(&runner, &config).await.unwrap();
    tunnel::teardown(&runner, &config).await.unwrap();
}

#[tokio::test]
async fn test_http_probe_treats_any_response_as_ready() {
    use wiremock::matchers::any;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = ClusterConfig {
        api_port: server.address().port(),
        ..Default::default()
    };
    // the server answering at all counts, even with a 5xx
    assert!(HttpProbe::new(&config).probe().await);
}

#[tokio::test]
async fn test_http_probe_not_ready_when_nothing_listens() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ClusterConfig {
        api_port: port,
        ..Default::default()
    };
    assert!(!HttpProbe::new(&config).probe().await);
}
