// Copyright 2025 JiangLong.
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

use crate::domain::config::OrchestratorConfig;
use crate::domain::resource::ResourceType;
use crate::infrastructure::constants::*;
use crate::infrastructure::executor::CommandExecutor;
use crate::shared::error::Result;
use std::sync::Arc;

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Typed wrapper over the cluster CLI sub-commands used by the workflows.
#[derive(Clone)]
pub struct ClusterClient {
    executor: Arc<dyn CommandExecutor>,
    orchestrator: OrchestratorConfig,
}

impl ClusterClient {
    pub fn new(executor: Arc<dyn CommandExecutor>, orchestrator: OrchestratorConfig) -> Self {
        Self {
            executor,
            orchestrator,
        }
    }

    pub async fn login(&self) -> Result<()> {
        let args = owned(&[
            "--context",
            &self.orchestrator.project_id,
            "-t",
            &self.orchestrator.login_token(),
            &self.orchestrator.url,
        ]);
        self.executor.execute(CMD_LOGIN, &args, None).await?;
        Ok(())
    }

    pub async fn inspect(&self, args: &[&str]) -> Result<String> {
        self.executor.execute(CMD_INSPECT, &owned(args), None).await
    }

    /// Inspect a deployed resource the way the state checks expect it.
    pub async fn inspect_resource(&self, resource_type: ResourceType, target: &str) -> Result<String> {
        match resource_type {
            ResourceType::Ingress => self.inspect(&["--type", TYPE_INGRESS, target]).await,
            other => {
                self.inspect(&[&format!("{}:{}", other.as_str(), target)])
                    .await
            }
        }
    }

    pub async fn kubectl(&self, args: &[&str], allow_failure_pattern: Option<&str>) -> Result<String> {
        self.executor
            .execute(CMD_KUBECTL, &owned(args), allow_failure_pattern)
            .await
    }

    pub async fn apply_manifest(&self, path: &str) -> Result<String> {
        self.kubectl(&["apply", "-f", path], None).await
    }

    pub async fn apply_manifest_in_namespace(&self, namespace: &str, path: &str) -> Result<String> {
        self.kubectl(&["apply", &format!("--namespace={}", namespace), "-f", path], None)
            .await
    }

    pub async fn delete_ingress(&self, name: &str, namespace: &str) -> Result<String> {
        self.kubectl(
            &["delete", TYPE_INGRESS, name, "-n", namespace],
            Some(NOT_FOUND_PATTERN),
        )
        .await
    }

    /// Strategic-merge patch of a workload (`deployment` or `statefulset`).
    pub async fn patch_workload(
        &self,
        namespace: &str,
        resource_type: ResourceType,
        service: &str,
        patch: &str,
    ) -> Result<String> {
        self.kubectl(
            &[
                &format!("--namespace={}", namespace),
                "patch",
                resource_type.as_str(),
                service,
                "--type=strategic",
                "-p",
                patch,
            ],
            None,
        )
        .await
    }

    pub async fn export_secret(&self, name: &str, namespace: &str) -> Result<String> {
        self.kubectl(
            &[
                "get",
                "secret",
                name,
                &format!("--namespace={}", namespace),
                "--export",
                "-o",
                "yaml",
            ],
            None,
        )
        .await
    }

    pub async fn exec_in_pod(&self, pod: &str, namespace: &str, command: &str) -> Result<String> {
        let mut args = vec!["exec", pod, "-n", namespace, "--"];
        args.extend(command.split(' ').filter(|part| !part.is_empty()));
        self.kubectl(&args, None).await
    }

    pub async fn inspect_namespace(&self, namespace: &str) -> Result<String> {
        self.inspect(&["--type", TYPE_NAMESPACE, namespace]).await
    }

    pub async fn create_namespace(&self, namespace: &str) -> Result<String> {
        self.executor
            .execute(CMD_NAMESPACE, &owned(&["create", namespace]), None)
            .await
    }

    pub async fn delete_namespace(&self, namespace: &str) -> Result<String> {
        self.executor
            .execute(
                CMD_NAMESPACES,
                &owned(&["delete", namespace]),
                Some(NOT_FOUND_PATTERN),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::executor::testing::ScriptedExecutor;

    fn client(executor: Arc<ScriptedExecutor>) -> ClusterClient {
        ClusterClient::new(
            executor,
            OrchestratorConfig::new("https://rancher.local", "access", "secret", "c-1:p-1"),
        )
    }

    #[tokio::test]
    async fn test_command_lines() {
        let executor = Arc::new(ScriptedExecutor::new(|_| Ok(String::new())));
        let cluster = client(executor.clone());

        cluster.login().await.unwrap();
        cluster
            .inspect_resource(ResourceType::Ingress, "web")
            .await
            .unwrap();
        cluster
            .inspect_resource(ResourceType::StatefulSet, "prod:db")
            .await
            .unwrap();
        cluster.exec_in_pod("api-1", "prod", "ls  -la").await.unwrap();
        cluster.inspect_namespace("prod").await.unwrap();

        assert_eq!(
            executor.calls(),
            vec![
                "login --context c-1:p-1 -t access:secret https://rancher.local",
                "inspect --type ingress web",
                "inspect statefulset:prod:db",
                "kubectl exec api-1 -n prod -- ls -la",
                "inspect --type namespace prod",
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_namespace_tolerates_not_found() {
        let executor = Arc::new(ScriptedExecutor::new(|_| {
            Err("Error: namespace not found".to_string())
        }));
        let cluster = client(executor.clone());

        let result = cluster.delete_namespace("gone").await.unwrap();
        assert_eq!(result, "Allowed failure: Not found");
        assert_eq!(executor.calls(), vec!["namespaces delete gone"]);

        assert!(cluster.create_namespace("gone").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_ingress_tolerates_not_found() {
        let executor = Arc::new(ScriptedExecutor::new(|_| {
            Err("Error from server (NotFound): ingresses.networking.k8s.io \"web\" not found".to_string())
        }));
        let cluster = client(executor.clone());

        let result = cluster.delete_ingress("web", "staging").await.unwrap();
        assert_eq!(result, "Allowed failure: Not found");
        assert_eq!(executor.calls(), vec!["kubectl delete ingress web -n staging"]);
    }

    #[tokio::test]
    async fn test_patch_targets_workload_kind() {
        let executor = Arc::new(ScriptedExecutor::new(|_| Ok(String::new())));
        let cluster = client(executor.clone());

        cluster
            .patch_workload("prod", ResourceType::StatefulSet, "db", "{}")
            .await
            .unwrap();
        cluster
            .patch_workload("prod", ResourceType::Deployment, "api", "{}")
            .await
            .unwrap();

        assert_eq!(
            executor.calls(),
            vec![
                "kubectl --namespace=prod patch statefulset db --type=strategic -p {}",
                "kubectl --namespace=prod patch deployment api --type=strategic -p {}",
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "current_thread")]
    async fn test_login_keeps_secret_out_of_logs() {
        use crate::infrastructure::executor::ShellExecutor;
        use std::io::Write;
        use std::sync::Mutex;

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let cluster = ClusterClient::new(
            Arc::new(ShellExecutor::with_program("true")),
            OrchestratorConfig::new("https://rancher.local", "token-a", "TOPSECRET", "c-1:p-1"),
        );
        cluster.login().await.unwrap();

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Executing true login"));
        assert!(logs.contains("-t ********"));
        assert!(!logs.contains("TOPSECRET"));
    }
}
