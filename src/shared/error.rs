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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, DeployError>;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("ENOENT - Cannot read: {path}")]
    TemplateNotFound { path: String },

    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    TemplateWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command \"{0}\" not found")]
    CommandNotFound(String),

    #[error("Exec err {0}")]
    CommandFailed(String),

    #[error("ERROR: Unexpected error while running retried task: {0}")]
    UnexpectedPoll(String),

    #[error("{0}")]
    UpgradeRefused(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Orchestrator API error: {0}")]
    Api(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("{message}")]
    StepFailed {
        message: String,
        #[source]
        source: Box<DeployError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for DeployError {
    fn from(err: reqwest::Error) -> Self {
        DeployError::Api(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DeployError {
    fn from(err: tokio::task::JoinError) -> Self {
        DeployError::TaskFailed(err.to_string())
    }
}

impl DeployError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn validation(context: impl Into<String>) -> Self {
        Self::ValidationError(context.into())
    }

    pub fn step_failed(message: impl Into<String>, source: DeployError) -> Self {
        Self::StepFailed {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Innermost error, unwrapping any step context.
    pub fn root_cause(&self) -> &DeployError {
        match self {
            Self::StepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
