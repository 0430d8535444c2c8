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

use crate::domain::resource::ResourceType;
use crate::infrastructure::constants::*;
use crate::shared::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::read_to_string;

// ============================================================================
// Check policies
// ============================================================================

/// Expected value of a status key, compared against the inspect output as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedValue::Number(n) => write!(f, "{}", n),
            ExpectedValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ExpectedValue {
    fn from(value: &str) -> Self {
        ExpectedValue::Text(value.to_string())
    }
}

impl From<i64> for ExpectedValue {
    fn from(value: i64) -> Self {
        ExpectedValue::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedCheck {
    pub key: String,
    pub value: ExpectedValue,
}

impl ExpectedCheck {
    pub fn new(key: impl Into<String>, value: impl Into<ExpectedValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckPolicy {
    pub expect: Vec<ExpectedCheck>,
    pub max_retries: u32,
    /// Milliseconds
    #[serde(default)]
    pub initial_wait_delay: u64,
}

impl CheckPolicy {
    pub fn ingress() -> Self {
        Self {
            expect: vec![ExpectedCheck::new("state", ACTIVE_STATE)],
            max_retries: INGRESS_MAX_RETRIES,
            initial_wait_delay: INGRESS_INITIAL_WAIT_MS,
        }
    }

    pub fn deployment() -> Self {
        Self {
            expect: vec![
                ExpectedCheck::new("state", ACTIVE_STATE),
                ExpectedCheck::new(DEPLOYMENT_REPLICAS_KEY, 1),
            ],
            max_retries: WORKLOAD_MAX_RETRIES,
            initial_wait_delay: WORKLOAD_INITIAL_WAIT_MS,
        }
    }

    pub fn statefulset() -> Self {
        Self {
            expect: vec![
                ExpectedCheck::new("state", ACTIVE_STATE),
                ExpectedCheck::new(STATEFULSET_REPLICAS_KEY, 1),
            ],
            max_retries: WORKLOAD_MAX_RETRIES,
            initial_wait_delay: WORKLOAD_INITIAL_WAIT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckPolicies {
    #[serde(default = "CheckPolicy::ingress")]
    pub ingress: CheckPolicy,
    #[serde(default = "CheckPolicy::deployment")]
    pub deployment: CheckPolicy,
    #[serde(default = "CheckPolicy::statefulset")]
    pub statefulset: CheckPolicy,
}

impl Default for CheckPolicies {
    fn default() -> Self {
        Self {
            ingress: CheckPolicy::ingress(),
            deployment: CheckPolicy::deployment(),
            statefulset: CheckPolicy::statefulset(),
        }
    }
}

impl CheckPolicies {
    pub fn for_type(&self, resource_type: ResourceType) -> &CheckPolicy {
        match resource_type {
            ResourceType::Ingress => &self.ingress,
            ResourceType::Deployment => &self.deployment,
            ResourceType::StatefulSet => &self.statefulset,
        }
    }

    pub fn for_type_mut(&mut self, resource_type: ResourceType) -> &mut CheckPolicy {
        match resource_type {
            ResourceType::Ingress => &mut self.ingress,
            ResourceType::Deployment => &mut self.deployment,
            ResourceType::StatefulSet => &mut self.statefulset,
        }
    }
}

/// Resource types whose replica status key may be asserted against a declared count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaCheckKeys {
    pub deployment: Option<String>,
    pub statefulset: Option<String>,
}

impl Default for ReplicaCheckKeys {
    fn default() -> Self {
        Self {
            deployment: Some(DEPLOYMENT_REPLICAS_KEY.to_string()),
            statefulset: Some(STATEFULSET_REPLICAS_KEY.to_string()),
        }
    }
}

impl ReplicaCheckKeys {
    pub fn key_for(&self, resource_type: ResourceType) -> Option<&str> {
        match resource_type {
            ResourceType::Ingress => None,
            ResourceType::Deployment => self.deployment.as_deref(),
            ResourceType::StatefulSet => self.statefulset.as_deref(),
        }
    }
}

// ============================================================================
// Template replacement
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub token: String,
    pub attribute: String,
}

impl Replacement {
    fn new(token: &str, attribute: &str) -> Self {
        Self {
            token: token.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

fn ingress_replacements() -> Vec<Replacement> {
    vec![
        Replacement::new("INGRESS_CERT_ISSUER", "issuer"),
        Replacement::new("NAMESPACE", "namespace"),
        Replacement::new("INGRESS_NAME", "name"),
        Replacement::new("INGRESS_HOST", "host"),
        Replacement::new("INGRESS_BACKEND_NAME", "backend"),
        Replacement::new("INGRESS_BACKEND_PORT", "port"),
        Replacement::new("INGRESS_SSL_CERT_SECRET", "cert"),
    ]
}

fn stack_replacements() -> Vec<Replacement> {
    let mut map = vec![
        Replacement::new("UNIQUE_ID", "unique_id"),
        Replacement::new("TAG", "image"),
    ];
    map.extend(ingress_replacements());
    map
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementMaps {
    #[serde(default = "ingress_replacements")]
    pub ingress: Vec<Replacement>,
    #[serde(default = "stack_replacements")]
    pub stack: Vec<Replacement>,
}

impl Default for ReplacementMaps {
    fn default() -> Self {
        Self {
            ingress: ingress_replacements(),
            stack: stack_replacements(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConf {
    pub directory: String,
    pub destination: String,
    pub ingress_file: String,
}

impl Default for TemplateConf {
    fn default() -> Self {
        Self {
            directory: TEMPLATE_DIRECTORY.to_string(),
            destination: TEMPLATE_DESTINATION_DIRECTORY.to_string(),
            ingress_file: INGRESS_TEMPLATE_FILE.to_string(),
        }
    }
}

impl TemplateConf {
    pub fn ingress_template_path(&self) -> String {
        format!("{}/{}", self.directory.trim_end_matches('/'), self.ingress_file)
    }
}

// ============================================================================
// Application configuration
// ============================================================================

/// Process-wide settings. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between two status attempts
    pub retry_timeout_secs: u64,
    pub deployable_kinds: Vec<ResourceType>,
    pub checks: CheckPolicies,
    pub replica_checks: ReplicaCheckKeys,
    pub templates: TemplateConf,
    pub replacements: ReplacementMaps,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            retry_timeout_secs: DEFAULT_RETRY_TIMEOUT_SECS,
            deployable_kinds: ResourceType::ALL.to_vec(),
            checks: CheckPolicies::default(),
            replica_checks: ReplicaCheckKeys::default(),
            templates: TemplateConf::default(),
            replacements: ReplacementMaps::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<T: AsRef<str>>(path: T) -> Result<Self> {
        let content = read_to_string(path.as_ref()).map_err(|e| {
            DeployError::config_error(format!(
                "Failed to read config file {}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let conf: Self = toml::from_str(content)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Defaults, or the given file when present.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for resource_type in ResourceType::ALL {
            if self.checks.for_type(resource_type).max_retries == 0 {
                return Err(DeployError::config_error(format!(
                    "checks.{}.max_retries must be > 0",
                    resource_type
                )));
            }
        }

        if self.templates.directory.is_empty() || self.templates.destination.is_empty() {
            return Err(DeployError::config_error(
                "templates.directory and templates.destination cannot be empty",
            ));
        }

        if self.deployable_kinds.is_empty() {
            return Err(DeployError::config_error(
                "deployable_kinds must contain at least one resource type",
            ));
        }

        Ok(())
    }
}
