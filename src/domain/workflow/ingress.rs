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
use crate::domain::verify::PollOutcome;
use crate::domain::workflow::context::WorkflowContext;
use crate::domain::workflow::steps::run_step;
use crate::shared::error::{DeployError, Result};

fn ingress_name(descriptor: &ResourceDescriptor) -> Result<String> {
    descriptor
        .ingress
        .as_ref()
        .map(|i| i.name.clone())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DeployError::validation("An ingress object with a name is required"))
}

/// Render, apply and verify the ingress.
pub async fn deploy_ingress(ctx: &WorkflowContext, descriptor: &ResourceDescriptor) -> Result<PollOutcome> {
    let name = ingress_name(descriptor)?;
    let reporter = ctx.reporter();

    let target = run_step(
        reporter,
        format!("[{}] Checking target resource...", name),
        async { descriptor.target() },
        |t| format!("Target resource parsed: {} - Type: {}", t, descriptor.resource_type),
        |e| e.to_string(),
    )
    .await?;

    let template_path = ctx.config.templates.ingress_template_path();
    let rendered = run_step(
        reporter,
        format!("[{}] Generating ingress template...", name),
        async {
            ctx.templates
                .render_file(&template_path, &ctx.config.replacements.ingress, descriptor)
        },
        |r| format!("Ingress template generated: {}", r.path_str()),
        |e| e.to_string(),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Login to orchestrator...", name),
        ctx.cluster.login(),
        |_| "Login succeeded".to_string(),
        |e| e.to_string(),
    )
    .await?;

    let manifest = rendered.path_str();
    run_step(
        reporter,
        format!("[{}] Deploying ingress on cluster. Please wait...", name),
        ctx.cluster.apply_manifest(&manifest),
        |_| format!("[{}] Ingress was deployed on cluster.", name),
        |e| format!("[{}] Ingress deployment failed due to: {}", name, e),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Retrieving state ...", name),
        ctx.checker.check_deployed(descriptor, &target, reporter),
        |r| format!("[{}] State was retrieved: {}", name, r),
        |e| {
            format!(
                "[{}] Checking upgrade failed. Please check in the orchestrator UI. {}",
                name, e
            )
        },
    )
    .await
}

/// Delete the ingress. A missing ingress counts as removed.
pub async fn remove_ingress(ctx: &WorkflowContext, descriptor: &ResourceDescriptor) -> Result<String> {
    let name = ingress_name(descriptor)?;
    let reporter = ctx.reporter();

    run_step(
        reporter,
        format!("[{}] Login to orchestrator...", name),
        ctx.cluster.login(),
        |_| "Login succeeded".to_string(),
        |e| e.to_string(),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Removing ingress from cluster. Please wait...", name),
        ctx.cluster.delete_ingress(&name, &descriptor.namespace),
        |_| format!("[{}] Ingress was removed from cluster.", name),
        |e| format!("[{}] Ingress removal failed due to: {}", name, e),
    )
    .await
}
