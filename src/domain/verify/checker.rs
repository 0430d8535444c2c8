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

use crate::domain::config::{AppConfig, ExpectedCheck, ExpectedValue};
use crate::domain::resource::ResourceDescriptor;
use crate::domain::verify::poll::{poll_until_match, PollOutcome, PollSettings};
use crate::infrastructure::rancher::ClusterClient;
use crate::shared::error::Result;
use crate::shared::progress::ProgressReporter;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Checks of the descriptor's resource type, with the declared replica count
/// substituted when template replica assertion applies.
pub fn effective_checks(config: &AppConfig, descriptor: &ResourceDescriptor) -> Vec<ExpectedCheck> {
    let mut checks = config.checks.for_type(descriptor.resource_type).expect.clone();

    if !descriptor.assert_against_template_replicas {
        return checks;
    }

    let replicas = descriptor.replicas.filter(|r| *r > 0);
    let key = config.replica_checks.key_for(descriptor.resource_type);

    if let (Some(replicas), Some(key)) = (replicas, key) {
        if let Some(check) = checks.iter_mut().find(|c| c.key == key) {
            check.value = ExpectedValue::Number(i64::from(replicas));
        }
    }

    checks
}

pub fn describe_checks(checks: &[ExpectedCheck]) -> String {
    checks.iter().fold(
        "Checking that status of service match: ".to_string(),
        |mut text, check| {
            text.push_str(&format!("\n  {} = {}", check.key, check.value));
            text
        },
    )
}

/// Verifies a freshly mutated resource against its check policy.
#[derive(Clone)]
pub struct DeployStateChecker {
    config: Arc<AppConfig>,
    cluster: ClusterClient,
}

impl DeployStateChecker {
    pub fn new(config: Arc<AppConfig>, cluster: ClusterClient) -> Self {
        Self { config, cluster }
    }

    pub async fn check_deployed(
        &self,
        descriptor: &ResourceDescriptor,
        target: &str,
        reporter: &dyn ProgressReporter,
    ) -> Result<PollOutcome> {
        let policy = self.config.checks.for_type(descriptor.resource_type);
        let checks = effective_checks(&self.config, descriptor);

        reporter.info(&describe_checks(&checks));
        debug!(
            "Polling {} {} up to {} time(s)",
            descriptor.resource_type, target, policy.max_retries
        );

        let settings = PollSettings {
            max_retries: policy.max_retries,
            initial_wait_delay: Duration::from_millis(policy.initial_wait_delay),
            retry_timeout: Duration::from_secs(self.config.retry_timeout_secs),
            decode_as_json: true,
        };

        let cluster = &self.cluster;
        let resource_type = descriptor.resource_type;
        poll_until_match(
            move || cluster.inspect_resource(resource_type, target),
            &checks,
            &settings,
            reporter,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::OrchestratorConfig;
    use crate::domain::resource::ResourceType;
    use crate::infrastructure::executor::testing::ScriptedExecutor;
    use crate::shared::progress::RecordingReporter;

    fn statefulset(replicas: Option<u32>, assert: bool) -> ResourceDescriptor {
        ResourceDescriptor::new("prod")
            .with_service("db")
            .with_type(ResourceType::StatefulSet)
            .with_replicas(replicas)
            .with_template_replica_assertion(assert)
    }

    #[test]
    fn test_replica_override_only_touches_replica_key() {
        let config = AppConfig::default();
        let checks = effective_checks(&config, &statefulset(Some(2), true));

        assert_eq!(
            checks,
            vec![
                ExpectedCheck::new("state", "active"),
                ExpectedCheck::new("statefulSetStatus.readyReplicas", 2),
            ]
        );
    }

    #[test]
    fn test_replica_override_requires_flag_and_positive_count() {
        let config = AppConfig::default();
        let defaults = config.checks.statefulset.expect.clone();

        assert_eq!(effective_checks(&config, &statefulset(Some(2), false)), defaults);
        assert_eq!(effective_checks(&config, &statefulset(Some(0), true)), defaults);
        assert_eq!(effective_checks(&config, &statefulset(None, true)), defaults);
    }

    #[test]
    fn test_ingress_has_no_replica_override() {
        let config = AppConfig::default();
        let descriptor = ResourceDescriptor::new("prod")
            .with_ingress(crate::domain::resource::IngressDescriptor::named("web"))
            .with_replicas(Some(3))
            .with_template_replica_assertion(true);

        assert_eq!(effective_checks(&config, &descriptor), config.checks.ingress.expect);
    }

    #[test]
    fn test_describe_checks() {
        assert_eq!(
            describe_checks(&AppConfig::default().checks.deployment.expect),
            "Checking that status of service match: \n  state = active\n  deploymentStatus.availableReplicas = 1"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_deployed_inspects_type_prefixed_target() {
        let executor = Arc::new(ScriptedExecutor::new(|_| {
            Ok(r#"{"state":"active","statefulSetStatus":{"readyReplicas":2}}"#.to_string())
        }));
        let cluster = ClusterClient::new(executor.clone(), OrchestratorConfig::default());
        let checker = DeployStateChecker::new(Arc::new(AppConfig::default()), cluster);
        let reporter = RecordingReporter::new();

        let outcome = checker
            .check_deployed(&statefulset(Some(2), true), "prod:db", &reporter)
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::Matched);
        assert_eq!(executor.calls(), vec!["inspect statefulset:prod:db"]);
        assert!(reporter.contains("statefulSetStatus.readyReplicas = 2"));
        assert!(reporter.contains("Waiting for command dispatch"));
    }
}
