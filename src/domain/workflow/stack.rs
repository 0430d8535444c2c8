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

//! Multi-resource stack deployment

use crate::domain::resource::{scan_deployable_items, ResourceDescriptor};
use crate::domain::workflow::context::{ResourceResult, WorkflowContext};
use crate::domain::workflow::fanout::join_all_or_fail;
use crate::domain::workflow::namespace::ensure_namespace;
use crate::domain::workflow::steps::{run_step, StepValue};
use crate::infrastructure::constants::CERTIFICATE_FILE;
use crate::infrastructure::template::RenderedTemplate;
use crate::shared::error::{DeployError, Result};
use tracing::info;

const NO_CERTIFICATE_COPY: &str = "no need";

#[derive(Debug, Clone)]
pub struct StackDeployment {
    pub rendered: RenderedTemplate,
    pub results: Vec<ResourceResult>,
}

impl StepValue for Vec<ResourceResult> {}

/// Copy the ingress TLS secret from another namespace into the stack namespace.
pub async fn copy_certificate(ctx: &WorkflowContext, descriptor: &ResourceDescriptor) -> Result<String> {
    let Some(source_namespace) = descriptor.certificate_source_namespace.as_deref() else {
        return Ok(NO_CERTIFICATE_COPY.to_string());
    };

    let cert = descriptor
        .ingress
        .as_ref()
        .map(|i| i.cert.as_str())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            DeployError::validation(
                "Cert should be provided in ingress object for cert copy to be executed",
            )
        })?;

    let exported = ctx.cluster.export_secret(cert, source_namespace).await?;
    let path = ctx.templates.write_artifact(CERTIFICATE_FILE, &exported)?;
    info!("Certificate {} exported to {}", cert, path.display());

    ctx.cluster
        .apply_manifest_in_namespace(&descriptor.namespace, &path.display().to_string())
        .await
}

/// Verify every deployable resource of the rendered stack concurrently.
pub async fn check_stack(
    ctx: &WorkflowContext,
    descriptor: &ResourceDescriptor,
    content: &str,
) -> Result<Vec<ResourceResult>> {
    let items = scan_deployable_items(content, &ctx.config.deployable_kinds)?;

    let branches: Vec<_> = items
        .iter()
        .map(|item| {
            let ctx = ctx.clone();
            let branch = descriptor.for_stack_item(item);
            async move { check_stack_item(&ctx, &branch).await }
        })
        .collect();

    let results = join_all_or_fail(branches).await?;
    ctx.reporter().info("Tasks deployed with results:");

    Ok(results)
}

async fn check_stack_item(ctx: &WorkflowContext, branch: &ResourceDescriptor) -> Result<ResourceResult> {
    let reporter = ctx.reporter();
    let label = branch.label().to_string();

    let target = run_step(
        reporter,
        format!("[{}] Checking target resource...", label),
        async { branch.target() },
        |t| format!("Target resource parsed: {}", t),
        |e| e.to_string(),
    )
    .await?;

    let outcome = run_step(
        reporter,
        format!("[{}] Retrieving state ...", target),
        ctx.checker.check_deployed(branch, &target, reporter),
        |r| format!("[{}] State was retrieved: {}", target, r),
        |e| {
            format!(
                "[{}] Checking upgrade failed. Please check in the orchestrator UI. {}",
                target, e
            )
        },
    )
    .await?;

    Ok(ResourceResult::new(target, outcome))
}

/// Render, apply and verify a stack manifest.
pub async fn deploy_stack(
    ctx: &WorkflowContext,
    descriptor: &ResourceDescriptor,
    stack_file: &str,
) -> Result<StackDeployment> {
    let reporter = ctx.reporter();

    let rendered = run_step(
        reporter,
        format!("[{}] Generating stack template...", stack_file),
        async {
            ctx.templates
                .render_file(stack_file, &ctx.config.replacements.stack, descriptor)
        },
        |r| {
            if descriptor.verbose {
                format!("[{}] Stack template generated: \n{}", stack_file, r.content)
            } else {
                format!("[{}] Stack template generated", stack_file)
            }
        },
        |e| e.to_string(),
    )
    .await?;
    let manifest = rendered.path_str();

    run_step(
        reporter,
        format!("[{}] Login to orchestrator...", manifest),
        ctx.cluster.login(),
        |_| "Login succeeded".to_string(),
        |e| e.to_string(),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Creating namespace if not existing...", descriptor.namespace),
        ensure_namespace(ctx, descriptor),
        |_| "Namespace created/exists".to_string(),
        |e| e.to_string(),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Copying required certs...", descriptor.namespace),
        copy_certificate(ctx, descriptor),
        |r| r.clone(),
        |e| e.to_string(),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Deploying stack on cluster. Please wait...", manifest),
        ctx.cluster.apply_manifest(&manifest),
        |_| format!("[{}] Stack was deployed on cluster.", manifest),
        |e| format!("[{}] Stack deployment failed due to: {}", manifest, e),
    )
    .await?;

    let results = run_step(
        reporter,
        format!("[{}] Retrieving state ...", manifest),
        check_stack(ctx, descriptor, &rendered.content),
        |_| format!("[{}] State was retrieved: OK", manifest),
        |e| {
            format!(
                "[{}] Checking upgrade failed. Please check in the orchestrator UI. {}",
                manifest, e
            )
        },
    )
    .await?;

    Ok(StackDeployment { rendered, results })
}
