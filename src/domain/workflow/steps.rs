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

use crate::domain::verify::PollOutcome;
use crate::shared::error::{DeployError, Result};
use crate::shared::progress::ProgressReporter;
use std::future::Future;

/// Values a step can resolve to. Some successful values still render as a failure.
pub trait StepValue {
    fn is_failure(&self) -> bool {
        false
    }
}

impl StepValue for PollOutcome {
    fn is_failure(&self) -> bool {
        !self.is_matched()
    }
}

impl StepValue for () {}
impl StepValue for String {}
impl StepValue for serde_json::Value {}
impl StepValue for crate::infrastructure::template::RenderedTemplate {}
impl StepValue for crate::infrastructure::rancher::PodList {}

/// Run one reported step.
///
/// A failing task is reported with `on_error` and surfaces as `StepFailed`
/// carrying that same message.
pub async fn run_step<T, Fut, S, E>(
    reporter: &dyn ProgressReporter,
    on_start: impl AsRef<str>,
    task: Fut,
    on_success: S,
    on_error: E,
) -> Result<T>
where
    T: StepValue,
    Fut: Future<Output = Result<T>>,
    S: FnOnce(&T) -> String,
    E: FnOnce(&DeployError) -> String,
{
    reporter.start(on_start.as_ref());

    match task.await {
        Ok(value) => {
            let message = on_success(&value);
            if value.is_failure() {
                reporter.fail(&message);
            } else {
                reporter.succeed(&message);
            }
            Ok(value)
        }
        Err(e) => {
            let message = on_error(&e);
            reporter.fail(&message);
            Err(DeployError::step_failed(message, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::progress::{ProgressEvent, RecordingReporter};

    #[tokio::test]
    async fn test_exhausted_outcome_renders_as_failure_without_error() {
        let reporter = RecordingReporter::new();
        let outcome = run_step(
            &reporter,
            "[api] Retrieving state ...",
            async { Ok(PollOutcome::Exhausted) },
            |r| format!("[api] State was retrieved: {}", r),
            |e| e.to_string(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Exhausted);
        assert_eq!(
            reporter.events(),
            vec![
                ProgressEvent::Start("[api] Retrieving state ...".to_string()),
                ProgressEvent::Fail("[api] State was retrieved: NOK".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_is_wrapped_with_step_message() {
        let reporter = RecordingReporter::new();
        let err = run_step(
            &reporter,
            "[web] Deploying ingress on cluster. Please wait...",
            async { Err::<String, _>(DeployError::CommandFailed("denied".to_string())) },
            |_| String::new(),
            |e| format!("[web] Ingress deployment failed due to: {}", e),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "[web] Ingress deployment failed due to: Exec err denied"
        );
        assert!(matches!(err.root_cause(), DeployError::CommandFailed(_)));
        assert_eq!(reporter.failures().len(), 1);
    }
}
