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

use crate::domain::config::OrchestratorConfig;
use crate::infrastructure::constants::TYPE_DEPLOYMENT;
use crate::shared::error::{DeployError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PodSummary {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub data: Vec<PodSummary>,
}

impl PodList {
    /// First pod whose name contains `service`.
    pub fn find_for_service(&self, service: &str) -> Option<&PodSummary> {
        self.data.iter().find(|pod| pod.name.contains(service))
    }
}

/// Read-only client for the orchestrator HTTP API.
#[derive(Clone)]
pub struct OrchestratorApi {
    client: Client,
    config: OrchestratorConfig,
}

impl OrchestratorApi {
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stackpilot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn list_workload_pods(&self, target: &str) -> Result<PodList> {
        let url = format!("{}/project/{}/pods", self.config.api_url(), self.config.project_id);
        let workload = format!("{}:{}", TYPE_DEPLOYMENT, target);
        debug!("GET {}?workloadId={}", url, workload);

        let response = self
            .client
            .get(&url)
            .query(&[("workloadId", workload.as_str())])
            .basic_auth(&self.config.access_key, Some(&self.config.secret_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DeployError::Api(format!("{} {}", status.as_u16(), body)));
        }

        Ok(response.json::<PodList>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer) -> OrchestratorApi {
        OrchestratorApi::new(OrchestratorConfig::new(server.uri(), "user", "pass", "c-1:p-1")).unwrap()
    }

    #[tokio::test]
    async fn test_list_workload_pods() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/project/c-1:p-1/pods"))
            .and(query_param("workloadId", "deployment:prod:api"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"name": "sidecar-0"}, {"name": "api-7d9f-x2"}, {"name": "api-7d9f-y3"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pods = api(&server).list_workload_pods("prod:api").await.unwrap();
        assert_eq!(pods.data.len(), 3);
        assert_eq!(pods.find_for_service("api").unwrap().name, "api-7d9f-x2");
        assert!(pods.find_for_service("db").is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = api(&server).list_workload_pods("prod:api").await.unwrap_err();
        assert_eq!(err.to_string(), "Orchestrator API error: 401 Unauthorized");
    }
}
