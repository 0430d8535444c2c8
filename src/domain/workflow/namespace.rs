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

use crate::domain::resource::ResourceDescriptor;
use crate::domain::workflow::context::WorkflowContext;
use crate::domain::workflow::steps::run_step;
use crate::shared::error::{DeployError, Result};
use tracing::warn;

fn require_namespace(descriptor: &ResourceDescriptor) -> Result<&str> {
    if descriptor.namespace.is_empty() {
        Err(DeployError::validation("A namespace is required"))
    } else {
        Ok(&descriptor.namespace)
    }
}

/// Delete the namespace. A missing namespace counts as removed.
pub async fn remove_namespace(ctx: &WorkflowContext, descriptor: &ResourceDescriptor) -> Result<String> {
    let namespace = require_namespace(descriptor)?;
    let reporter = ctx.reporter();

    run_step(
        reporter,
        format!("[{}] Login to orchestrator...", namespace),
        ctx.cluster.login(),
        |_| "Login succeeded".to_string(),
        |e| e.to_string(),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Removing namespace from cluster. Please wait...", namespace),
        ctx.cluster.delete_namespace(namespace),
        |_| format!("[{}] Namespace was removed from cluster.", namespace),
        |e| format!("[{}] Namespace removal failed due to: {}", namespace, e),
    )
    .await
}

/// Make sure the namespace exists, creating it when allowed.
pub async fn ensure_namespace(ctx: &WorkflowContext, descriptor: &ResourceDescriptor) -> Result<String> {
    let namespace = require_namespace(descriptor)?;

    match ctx.cluster.inspect_namespace(namespace).await {
        Ok(found) => Ok(found),
        Err(e) if descriptor.create_missing_namespace => {
            warn!("Namespace {} not found, creating it: {}", namespace, e);
            ctx.cluster.create_namespace(namespace).await
        }
        Err(e) => Err(e),
    }
}
