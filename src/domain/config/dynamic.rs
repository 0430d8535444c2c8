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

use crate::domain::config::settings::{AppConfig, ExpectedCheck, ExpectedValue};
use crate::domain::resource::ResourceType;
use crate::shared::error::{DeployError, Result};
use std::collections::BTreeMap;
use tracing::warn;

/// Parse `-D key=value` properties.
pub fn parse_dynamic_configs(configs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();

    for config in configs {
        let parts: Vec<&str> = config.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(DeployError::config_error(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            )));
        }

        let key = parts[0].trim();
        let value = parts[1].trim();

        if key.is_empty() {
            return Err(DeployError::config_error(format!(
                "Empty key in config: '{}'",
                config
            )));
        }

        map.insert(key.to_string(), value.to_string());
    }

    Ok(map)
}

/// Apply dynamic properties on top of the loaded configuration.
///
/// Recognized keys:
/// - `retry.timeout` (seconds)
/// - `checks.<type>.max-retries`, `checks.<type>.initial-wait-delay` (milliseconds)
/// - `checks.<type>.expect.<dotted.key>` (adds or replaces an expected value)
/// - `replicas.<type>.status-key`
/// - `templates.directory`, `templates.destination`, `templates.ingress-file`
/// - `stack.deployable-kinds` (comma-separated)
pub fn apply_to_app_config(configs: &BTreeMap<String, String>, config: &mut AppConfig) {
    if let Some(timeout) = configs.get("retry.timeout") {
        match timeout.parse::<u64>() {
            Ok(secs) => config.retry_timeout_secs = secs,
            Err(_) => warn!("Ignoring invalid retry.timeout: {}", timeout),
        }
    }

    if let Some(dir) = configs.get("templates.directory") {
        config.templates.directory = dir.clone();
    }

    if let Some(dir) = configs.get("templates.destination") {
        config.templates.destination = dir.clone();
    }

    if let Some(file) = configs.get("templates.ingress-file") {
        config.templates.ingress_file = file.clone();
    }

    if let Some(kinds) = configs.get("stack.deployable-kinds") {
        let parsed: Vec<ResourceType> = kinds
            .split(',')
            .filter_map(|kind| kind.trim().parse::<ResourceType>().ok())
            .collect();
        if !parsed.is_empty() {
            config.deployable_kinds = parsed;
        }
    }

    for resource_type in ResourceType::ALL {
        let prefix = format!("checks.{}.", resource_type);
        let policy = config.checks.for_type_mut(resource_type);

        if let Some(retries) = configs.get(&format!("{}max-retries", prefix)) {
            match retries.parse::<u32>() {
                Ok(n) => policy.max_retries = n,
                Err(_) => warn!("Ignoring invalid {}max-retries: {}", prefix, retries),
            }
        }

        if let Some(delay) = configs.get(&format!("{}initial-wait-delay", prefix)) {
            match delay.parse::<u64>() {
                Ok(ms) => policy.initial_wait_delay = ms,
                Err(_) => warn!("Ignoring invalid {}initial-wait-delay: {}", prefix, delay),
            }
        }

        let expect_prefix = format!("{}expect.", prefix);
        for (key, value) in configs {
            let Some(check_key) = key.strip_prefix(&expect_prefix) else {
                continue;
            };

            let expected = value
                .parse::<i64>()
                .map(ExpectedValue::Number)
                .unwrap_or_else(|_| ExpectedValue::Text(value.clone()));

            match policy.expect.iter_mut().find(|c| c.key == check_key) {
                Some(existing) => existing.value = expected,
                None => policy.expect.push(ExpectedCheck::new(check_key, expected)),
            }
        }

        if let Some(key) = configs.get(&format!("replicas.{}.status-key", resource_type)) {
            match resource_type {
                ResourceType::Deployment => config.replica_checks.deployment = Some(key.clone()),
                ResourceType::StatefulSet => config.replica_checks.statefulset = Some(key.clone()),
                ResourceType::Ingress => warn!("Ingress resources have no replica status key"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[&str]) -> BTreeMap<String, String> {
        parse_dynamic_configs(&pairs.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(parse_dynamic_configs(&["retry.timeout".to_string()]).is_err());
        assert!(parse_dynamic_configs(&[" =1".to_string()]).is_err());
    }

    #[test]
    fn test_overrides_policy_values() {
        let mut config = AppConfig::default();
        apply_to_app_config(
            &props(&[
                "retry.timeout=1",
                "checks.deployment.max-retries=3",
                "checks.ingress.initial-wait-delay=0",
                "checks.statefulset.expect.statefulSetStatus.readyReplicas=3",
                "checks.deployment.expect.paused=false",
                "stack.deployable-kinds=deployment, statefulset",
            ]),
            &mut config,
        );

        assert_eq!(config.retry_timeout_secs, 1);
        assert_eq!(config.checks.deployment.max_retries, 3);
        assert_eq!(config.checks.ingress.initial_wait_delay, 0);
        assert_eq!(
            config.checks.statefulset.expect[1].value,
            ExpectedValue::Number(3)
        );
        assert_eq!(
            config.checks.deployment.expect.last(),
            Some(&ExpectedCheck::new("paused", "false"))
        );
        assert_eq!(
            config.deployable_kinds,
            vec![ResourceType::Deployment, ResourceType::StatefulSet]
        );
    }

    #[test]
    fn test_invalid_numbers_are_ignored() {
        let mut config = AppConfig::default();
        apply_to_app_config(&props(&["checks.ingress.max-retries=many"]), &mut config);
        assert_eq!(config.checks.ingress.max_retries, 20);
    }
}
