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

use crate::infrastructure::constants::MASKED_VALUE as SECRET_MASK;
use crate::shared::error::{DeployError, Result};

/// Connection settings for the orchestrator and its CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub url: String,
    pub access_key: String,
    pub secret_key: String,
    pub project_id: String,
}

impl OrchestratorConfig {
    pub fn new(
        url: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            project_id: project_id.into(),
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}/v3", self.url.trim_end_matches('/'))
    }

    pub fn login_token(&self) -> String {
        format!("{}:{}", self.access_key, self.secret_key)
    }

    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("orchestrator-url", &self.url),
            ("orchestrator-access-key", &self.access_key),
            ("orchestrator-secret-key", &self.secret_key),
            ("project-id", &self.project_id),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DeployError::config_error(format!(
                "Missing orchestrator settings: {}",
                missing.join(", ")
            )))
        }
    }

    /// Label/value pairs shown at start-up. The secret key never appears.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("url", self.url.clone()),
            ("access-key", self.access_key.clone()),
            ("secret-key", SECRET_MASK.to_string()),
            ("project-id", self.project_id.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_values() {
        let conf = OrchestratorConfig::new("https://rancher.local/", "token-a", "s3cr3t", "c-1:p-2");
        assert_eq!(conf.api_url(), "https://rancher.local/v3");
        assert_eq!(conf.login_token(), "token-a:s3cr3t");
    }

    #[test]
    fn test_summary_masks_secret() {
        let conf = OrchestratorConfig::new("https://rancher.local", "token-a", "s3cr3t", "p");
        let summary = conf.summary();
        assert!(summary.iter().all(|(_, v)| !v.contains("s3cr3t")));
        assert_eq!(summary[2], ("secret-key", SECRET_MASK.to_string()));
    }

    #[test]
    fn test_validate_lists_missing_settings() {
        let err = OrchestratorConfig::new("https://rancher.local", "", "", "p")
            .validate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing orchestrator settings: orchestrator-access-key, orchestrator-secret-key"
        );
    }
}
