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

use crate::domain::resource::{
    check_state_before_upgrade, force_upgrade_patch, upgrade_payload, ResourceDescriptor,
    ResourceType,
};
use crate::domain::workflow::context::{ResourceResult, WorkflowContext};
use crate::domain::workflow::steps::run_step;
use crate::shared::error::{DeployError, Result};

const FIRST_LAUNCH_HINT: &str =
    "Please note a first launch of service is required before being able to upgrade it from CLI.";

/// Roll one workload by patching its pod template, then verify it.
pub async fn upgrade_service(ctx: &WorkflowContext, descriptor: &ResourceDescriptor) -> Result<ResourceResult> {
    if descriptor.resource_type == ResourceType::Ingress {
        return Err(DeployError::validation(
            "Only deployments and statefulsets can be upgraded",
        ));
    }

    let reporter = ctx.reporter();
    let service = descriptor.service.clone().unwrap_or_default();

    let target = run_step(
        reporter,
        format!("[{}] Checking target resource...", service),
        async { descriptor.target() },
        |t| format!("Target resource parsed: {}", t),
        |e| e.to_string(),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Login to orchestrator...", service),
        ctx.cluster.login(),
        |_| "Login succeeded".to_string(),
        |e| e.to_string(),
    )
    .await?;

    let payload = run_step(
        reporter,
        format!("[{}] Getting upgrade payload. Please wait...", service),
        async {
            let raw = ctx
                .cluster
                .inspect_resource(descriptor.resource_type, &target)
                .await?;
            upgrade_payload(&raw)
        },
        |_| {
            format!(
                "[{}] Upgrade payload retrieved successfuly for service {}",
                service, target
            )
        },
        |e| e.to_string(),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Getting service state. Please wait...", service),
        async { check_state_before_upgrade(&payload, descriptor.force) },
        |_| format!("[{}] Service can be upgraded", service),
        |e| e.to_string(),
    )
    .await?;

    run_step(
        reporter,
        format!("[{}] Upgrading the service. Please wait...", service),
        async {
            let patch = force_upgrade_patch(
                &service,
                descriptor.image.as_deref(),
                &descriptor.unique_id,
            )?;
            ctx.cluster
                .patch_workload(
                    &descriptor.namespace,
                    descriptor.resource_type,
                    &service,
                    &patch,
                )
                .await
        },
        |_| {
            format!(
                "[{}] Image upgrade request for service \"{}\" was made.",
                service, service
            )
        },
        |e| {
            format!(
                "[{}] Image upgrade failed due to: {} - {}",
                service, e, FIRST_LAUNCH_HINT
            )
        },
    )
    .await?;

    let outcome = run_step(
        reporter,
        format!("[{}] Retrieving state ...", service),
        ctx.checker.check_deployed(descriptor, &target, reporter),
        |r| format!("[{}] State was retrieved: {}", service, r),
        |e| {
            format!(
                "[{}] Checking upgrade failed. Please check in the orchestrator UI. {}",
                service, e
            )
        },
    )
    .await?;

    Ok(ResourceResult::new(service, outcome))
}
