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

use crate::domain::resource::manifest::StackItem;
use crate::infrastructure::constants::{TYPE_DEPLOYMENT, TYPE_INGRESS, TYPE_STATEFULSET};
use crate::shared::error::{DeployError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Ingress,
    Deployment,
    StatefulSet,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Ingress,
        ResourceType::Deployment,
        ResourceType::StatefulSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Ingress => TYPE_INGRESS,
            ResourceType::Deployment => TYPE_DEPLOYMENT,
            ResourceType::StatefulSet => TYPE_STATEFULSET,
        }
    }

    /// Ingress wins over an explicit type, which wins over the deployment default.
    pub fn resolve(has_ingress: bool, explicit: Option<ResourceType>) -> Self {
        if has_ingress {
            ResourceType::Ingress
        } else {
            explicit.unwrap_or(ResourceType::Deployment)
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = DeployError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            TYPE_INGRESS => Ok(ResourceType::Ingress),
            TYPE_DEPLOYMENT => Ok(ResourceType::Deployment),
            TYPE_STATEFULSET => Ok(ResourceType::StatefulSet),
            _ => Err(DeployError::ConfigError(format!(
                "Invalid resource type: {}",
                s
            ))),
        }
    }
}

/// Ingress fields used by the ingress template and the ingress check target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressDescriptor {
    pub name: String,
    pub host: String,
    pub backend: String,
    #[serde(deserialize_with = "string_or_number")]
    pub port: String,
    pub cert: String,
    pub issuer: String,
}

impl IngressDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            DeployError::ConfigError(format!("Invalid ingress JSON object: {}", e))
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        let value = match name {
            "name" => &self.name,
            "host" => &self.host,
            "backend" => &self.backend,
            "port" => &self.port,
            "cert" => &self.cert,
            "issuer" => &self.issuer,
            _ => return None,
        };

        if value.is_empty() {
            None
        } else {
            Some(value.as_str())
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(s) => s,
        StringOrNumber::Integer(n) => n.to_string(),
        StringOrNumber::Float(n) => n.to_string(),
    })
}

/// Per-invocation context shared by every workflow step.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    pub namespace: String,
    pub service: Option<String>,
    pub unique_id: String,
    pub resource_type: ResourceType,
    pub image: Option<String>,
    pub force: bool,
    pub replicas: Option<u32>,
    pub ingress: Option<IngressDescriptor>,
    pub assert_against_template_replicas: bool,
    pub create_missing_namespace: bool,
    pub certificate_source_namespace: Option<String>,
    pub verbose: bool,
}

impl ResourceDescriptor {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            service: None,
            unique_id: uuid::Uuid::new_v4().to_string(),
            resource_type: ResourceType::Deployment,
            image: None,
            force: false,
            replicas: None,
            ingress: None,
            assert_against_template_replicas: false,
            create_missing_namespace: true,
            certificate_source_namespace: None,
            verbose: false,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_ingress(mut self, ingress: IngressDescriptor) -> Self {
        self.ingress = Some(ingress);
        self.resource_type = ResourceType::resolve(true, None);
        self
    }

    /// Explicit type, ignored while an ingress descriptor is attached.
    pub fn with_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = ResourceType::resolve(self.ingress.is_some(), Some(resource_type));
        self
    }

    pub fn with_unique_id(mut self, unique_id: Option<String>) -> Self {
        if let Some(id) = unique_id.filter(|id| !id.is_empty()) {
            self.unique_id = id;
        }
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image.filter(|i| !i.is_empty());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_replicas(mut self, replicas: Option<u32>) -> Self {
        self.replicas = replicas;
        self
    }

    pub fn with_template_replica_assertion(mut self, enabled: bool) -> Self {
        self.assert_against_template_replicas = enabled;
        self
    }

    pub fn with_namespace_creation(mut self, enabled: bool) -> Self {
        self.create_missing_namespace = enabled;
        self
    }

    pub fn with_certificate_source(mut self, namespace: Option<String>) -> Self {
        self.certificate_source_namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Copy for one branch of a multi-service upgrade.
    pub fn for_service(&self, service: &str, image: Option<String>) -> Self {
        let mut branch = self.clone();
        branch.service = Some(service.to_string());
        branch.image = image.filter(|i| !i.is_empty());
        branch
    }

    /// Copy for one resource extracted from a stack manifest. Ingress items are
    /// addressed by their manifest name, so the ingress sub-descriptor is dropped.
    pub fn for_stack_item(&self, item: &StackItem) -> Self {
        let mut branch = self.clone();
        branch.resource_type = item.resource_type;
        branch.service = Some(item.name.clone());
        branch.replicas = item.replicas;
        if item.resource_type == ResourceType::Ingress {
            branch.ingress = None;
        }
        branch
    }

    /// Attribute lookup used by template substitution: descriptor first, then ingress.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let own = match name {
            "namespace" => Some(self.namespace.as_str()),
            "service" => self.service.as_deref(),
            "unique_id" => Some(self.unique_id.as_str()),
            "image" => self.image.as_deref(),
            "type" => Some(self.resource_type.as_str()),
            _ => None,
        };

        own.filter(|v| !v.is_empty())
            .or_else(|| self.ingress.as_ref().and_then(|i| i.attribute(name)))
            .map(str::to_string)
    }

    /// Name used to address the resource with the cluster CLI.
    pub fn target(&self) -> Result<String> {
        let service = self.service.as_deref().filter(|s| !s.is_empty());
        let name = if self.resource_type == ResourceType::Ingress {
            self.ingress
                .as_ref()
                .map(|i| i.name.as_str())
                .filter(|n| !n.is_empty())
                .or(service)
        } else {
            service
        };

        match name {
            Some(name) if !self.namespace.is_empty() => {
                if self.resource_type == ResourceType::Ingress {
                    Ok(name.to_string())
                } else {
                    Ok(format!("{}:{}", self.namespace, name))
                }
            }
            _ => Err(DeployError::validation(
                "You must specify a namespace and a target name",
            )),
        }
    }

    /// Label shown in step messages.
    pub fn label(&self) -> &str {
        if self.resource_type == ResourceType::Ingress {
            if let Some(name) = self.ingress.as_ref().map(|i| i.name.as_str()) {
                if !name.is_empty() {
                    return name;
                }
            }
        }
        self.service.as_deref().unwrap_or(&self.namespace)
    }
}
