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

//! Upgrade payload handling and the strategic-merge patch body

use crate::infrastructure::constants::{ACTIVE_STATE, FORCE_UPGRADE_ENV, SCHEDULING_KEY};
use crate::shared::error::{DeployError, Result};
use serde::Serialize;
use serde_json::Value;

/// Parse an inspect result and drop its scheduling section.
pub fn upgrade_payload(raw: &str) -> Result<Value> {
    let mut payload: Value = serde_json::from_str(raw)?;
    if let Some(object) = payload.as_object_mut() {
        object.remove(SCHEDULING_KEY);
    }
    Ok(payload)
}

/// A workload may be upgraded when it is active and not paused, or when forced.
pub fn check_state_before_upgrade(payload: &Value, force: bool) -> Result<String> {
    let active = payload.get("state").and_then(Value::as_str) == Some(ACTIVE_STATE);
    let paused = payload
        .get("paused")
        .map(|p| match p {
            Value::Bool(b) => *b,
            Value::Null => false,
            _ => true,
        })
        .unwrap_or(false);

    if (active && !paused) || force {
        Ok(format!("Service can be upgraded. Forced: {}", force))
    } else {
        Err(DeployError::UpgradeRefused(
            "We can't upgrade service which is not active and healthy".to_string(),
        ))
    }
}

#[derive(Serialize)]
struct PatchBody<'a> {
    spec: PatchSpec<'a>,
}

#[derive(Serialize)]
struct PatchSpec<'a> {
    template: PatchTemplate<'a>,
}

#[derive(Serialize)]
struct PatchTemplate<'a> {
    spec: PatchPodSpec<'a>,
}

#[derive(Serialize)]
struct PatchPodSpec<'a> {
    containers: Vec<PatchContainer<'a>>,
}

#[derive(Serialize)]
struct PatchContainer<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    env: Vec<PatchEnv<'a>>,
}

#[derive(Serialize)]
struct PatchEnv<'a> {
    name: &'a str,
    value: &'a str,
}

/// Strategic-merge patch that rolls the container by changing an env value.
pub fn force_upgrade_patch(service: &str, image: Option<&str>, unique_id: &str) -> Result<String> {
    let body = PatchBody {
        spec: PatchSpec {
            template: PatchTemplate {
                spec: PatchPodSpec {
                    containers: vec![PatchContainer {
                        name: service,
                        image: image.filter(|i| !i.is_empty()),
                        env: vec![PatchEnv {
                            name: FORCE_UPGRADE_ENV,
                            value: unique_id,
                        }],
                    }],
                },
            },
        },
    };

    Ok(serde_json::to_string(&body)?)
}

/// Accept either a JSON array of strings or a comma-separated list.
pub fn parse_name_list(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        let names: Vec<String> = serde_json::from_str(trimmed).map_err(|e| {
            DeployError::validation(format!("Invalid JSON array '{}': {}", trimmed, e))
        })?;
        return Ok(names);
    }

    Ok(trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
