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

//! Stack manifest scanning

use crate::domain::resource::ResourceType;
use crate::shared::error::Result;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::warn;

/// A resource declared in a stack manifest that can be verified after apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackItem {
    pub name: String,
    pub resource_type: ResourceType,
    pub replicas: Option<u32>,
}

/// Collect deployable resources from every YAML document of a rendered stack.
///
/// Documents of kind `List` contribute their `items`; any other document is
/// considered on its own. Kinds are matched case-insensitively.
pub fn scan_deployable_items(content: &str, deployable: &[ResourceType]) -> Result<Vec<StackItem>> {
    let mut items = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }

        match value.get("items").and_then(Value::as_sequence) {
            Some(list) => {
                for entry in list {
                    collect_item(entry, deployable, &mut items);
                }
            }
            None => collect_item(&value, deployable, &mut items),
        }
    }

    Ok(items)
}

fn collect_item(entry: &Value, deployable: &[ResourceType], items: &mut Vec<StackItem>) {
    let Some(kind) = entry.get("kind").and_then(Value::as_str) else {
        return;
    };

    let Some(resource_type) = kind
        .parse::<ResourceType>()
        .ok()
        .filter(|t| deployable.contains(t))
    else {
        return;
    };

    let name = entry
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str);

    let Some(name) = name else {
        warn!("Skipping {} without metadata.name", kind);
        return;
    };

    let replicas = entry
        .get("spec")
        .and_then(|s| s.get("replicas"))
        .and_then(Value::as_u64)
        .and_then(|r| u32::try_from(r).ok());

    items.push(StackItem {
        name: name.to_string(),
        resource_type,
        replicas,
    });
}
