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

use crate::domain::config::{AppConfig, OrchestratorConfig};
use crate::domain::verify::{DeployStateChecker, PollOutcome};
use crate::infrastructure::executor::CommandExecutor;
use crate::infrastructure::rancher::{ClusterClient, OrchestratorApi};
use crate::infrastructure::template::{TemplateEngine, TemplateSource};
use crate::shared::error::Result;
use crate::shared::progress::ProgressReporter;
use chrono::{DateTime, Local};
use std::sync::Arc;

/// Collaborators shared by every workflow of one invocation.
#[derive(Clone)]
pub struct WorkflowContext {
    pub config: Arc<AppConfig>,
    pub cluster: ClusterClient,
    pub checker: DeployStateChecker,
    pub templates: Arc<TemplateEngine>,
    pub api: OrchestratorApi,
    pub reporter: Arc<dyn ProgressReporter>,
}

impl WorkflowContext {
    pub fn new(
        config: Arc<AppConfig>,
        orchestrator: OrchestratorConfig,
        executor: Arc<dyn CommandExecutor>,
        template_source: Arc<dyn TemplateSource>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<Self> {
        let cluster = ClusterClient::new(executor, orchestrator.clone());
        let checker = DeployStateChecker::new(config.clone(), cluster.clone());
        let templates = Arc::new(TemplateEngine::new(
            template_source,
            config.templates.destination.clone(),
        ));
        let api = OrchestratorApi::new(orchestrator)?;

        Ok(Self {
            config,
            cluster,
            checker,
            templates,
            api,
            reporter,
        })
    }

    pub fn reporter(&self) -> &dyn ProgressReporter {
        self.reporter.as_ref()
    }
}

/// Verification result of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceResult {
    pub service: String,
    pub outcome: PollOutcome,
    pub checked_at: DateTime<Local>,
}

impl ResourceResult {
    pub fn new(service: impl Into<String>, outcome: PollOutcome) -> Self {
        Self {
            service: service.into(),
            outcome,
            checked_at: Local::now(),
        }
    }
}
