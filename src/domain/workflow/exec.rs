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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub pod: String,
    pub output: String,
}

/// Run a command inside the first pod of the service's workload.
pub async fn exec_in_service(
    ctx: &WorkflowContext,
    descriptor: &ResourceDescriptor,
    command: &str,
) -> Result<ExecResult> {
    if command.trim().is_empty() {
        return Err(DeployError::validation("A command to execute is required"));
    }

    let reporter = ctx.reporter();
    let service = descriptor.service.clone().unwrap_or_default();

    let target = run_step(
        reporter,
        format!("[{}] Checking target service...", service),
        async { descriptor.target() },
        |t| format!("Target service parsed: {} - Type: {}", t, descriptor.resource_type),
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

    let pod = run_step(
        reporter,
        format!("[{}] Retrieving state ...", service),
        async {
            let pods = ctx.api.list_workload_pods(&target).await?;
            pods.find_for_service(&service)
                .map(|p| p.name.clone())
                .ok_or_else(|| {
                    DeployError::NotFound(format!("no pod matching {} in {}", service, target))
                })
        },
        |p| format!("[{}] Retrieved pod: {}", service, p),
        |e| {
            format!(
                "[{}] Checking resource failed. Please check in the orchestrator UI. {}",
                service, e
            )
        },
    )
    .await?;

    let output = run_step(
        reporter,
        format!(
            "[{}] Executing command {} on pod {}. Please wait...",
            pod, command, pod
        ),
        ctx.cluster
            .exec_in_pod(&pod, &descriptor.namespace, command),
        |r| {
            format!(
                "[{}] Command {} was properly executed on pod {} with results:\n{}.",
                pod, command, pod, r
            )
        },
        |e| format!("[{}] Execution of command failed due to: {}", pod, e),
    )
    .await?;

    Ok(ExecResult { pod, output })
}
