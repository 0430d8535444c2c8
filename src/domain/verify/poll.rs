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

//! Bounded polling of a status query until its JSON output carries the expected values.

use crate::domain::config::{ExpectedCheck, ExpectedValue};
use crate::infrastructure::constants::{
    DEFAULT_RETRY_TIMEOUT_SECS, POLL_EXHAUSTED, POLL_MATCHED, STATE_MISMATCH_PAUSE_MS,
};
use crate::shared::error::{DeployError, Result};
use crate::shared::progress::ProgressReporter;
use backon::{BackoffBuilder, ConstantBuilder};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Matched,
    Exhausted,
}

impl PollOutcome {
    pub fn as_sentinel(&self) -> &'static str {
        match self {
            PollOutcome::Matched => POLL_MATCHED,
            PollOutcome::Exhausted => POLL_EXHAUSTED,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, PollOutcome::Matched)
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sentinel())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub max_retries: u32,
    pub initial_wait_delay: Duration,
    pub retry_timeout: Duration,
    pub decode_as_json: bool,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_wait_delay: Duration::ZERO,
            retry_timeout: Duration::from_secs(DEFAULT_RETRY_TIMEOUT_SECS),
            decode_as_json: true,
        }
    }
}

/// Resolve a dotted path such as `deploymentStatus.availableReplicas`.
/// Numeric segments index into arrays.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => current.get(segment),
    })
}

fn as_comparable(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn expected_text(value: &ExpectedValue) -> String {
    value.to_string()
}

/// True when every check is satisfied. A missing path never matches.
pub fn matches_all(observed: &Value, checks: &[ExpectedCheck]) -> bool {
    checks.iter().all(|check| match lookup(observed, &check.key) {
        Some(found) => as_comparable(found) == expected_text(&check.value),
        None => {
            debug!("Key {} is missing from the observed state", check.key);
            false
        }
    })
}

/// Invoke `query` until the expected values show up or the attempts run out.
///
/// Exhausting the attempts is not an error. A failing query or an undecodable
/// output aborts immediately with `UnexpectedPoll`.
pub async fn poll_until_match<F, Fut>(
    mut query: F,
    checks: &[ExpectedCheck],
    settings: &PollSettings,
    reporter: &dyn ProgressReporter,
) -> Result<PollOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    if !settings.initial_wait_delay.is_zero() {
        reporter.info("Waiting for command dispatch");
        tokio::time::sleep(settings.initial_wait_delay).await;
    }

    let attempts = settings.max_retries.max(1);
    let mut retry_delays = ConstantBuilder::default()
        .with_delay(settings.retry_timeout)
        .with_max_times((attempts - 1) as usize)
        .build();

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;

        let output = query()
            .await
            .map_err(|e| DeployError::UnexpectedPoll(e.to_string()))?;

        let observed = if settings.decode_as_json {
            serde_json::from_str::<Value>(&output)
                .map_err(|e| DeployError::UnexpectedPoll(format!("invalid JSON output: {}", e)))?
        } else {
            Value::String(output)
        };

        if matches_all(&observed, checks) {
            debug!("Expected state observed after {} attempt(s)", attempt);
            return Ok(PollOutcome::Matched);
        }

        match retry_delays.next() {
            Some(delay) => {
                reporter.info("State differs from expected one");
                tokio::time::sleep(Duration::from_millis(STATE_MISMATCH_PAUSE_MS)).await;

                reporter.info(&format!(
                    "Waiting {}s before retry ({})",
                    delay.as_secs(),
                    attempt
                ));
                tokio::time::sleep(delay).await;
            }
            None => {
                warn!("Expected state not observed after {} attempt(s)", attempt);
                return Ok(PollOutcome::Exhausted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::progress::{ProgressEvent, RecordingReporter};
    use tokio::time::Instant;

    fn settings(max_retries: u32, initial_ms: u64) -> PollSettings {
        PollSettings {
            max_retries,
            initial_wait_delay: Duration::from_millis(initial_ms),
            ..Default::default()
        }
    }

    fn workload_checks() -> Vec<ExpectedCheck> {
        vec![
            ExpectedCheck::new("state", "active"),
            ExpectedCheck::new("deploymentStatus.availableReplicas", 1),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_matching_query_is_called_max_retries_times() {
        let reporter = RecordingReporter::new();
        let mut calls = 0;
        let started = Instant::now();

        let outcome = poll_until_match(
            || {
                calls += 1;
                async { Ok(r#"{"state":"updating"}"#.to_string()) }
            },
            &workload_checks(),
            &settings(3, 0),
            &reporter,
        )
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Exhausted);
        assert_eq!(outcome.as_sentinel(), "NOK");
        assert_eq!(calls, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(22));
        assert_eq!(
            reporter.events(),
            vec![
                ProgressEvent::Info("State differs from expected one".to_string()),
                ProgressEvent::Info("Waiting 10s before retry (1)".to_string()),
                ProgressEvent::Info("State differs from expected one".to_string()),
                ProgressEvent::Info("Waiting 10s before retry (2)".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_match_does_not_wait() {
        let reporter = RecordingReporter::new();
        let mut calls = 0;
        let started = Instant::now();

        let outcome = poll_until_match(
            || {
                calls += 1;
                async {
                    Ok(r#"{"state":"active","deploymentStatus":{"availableReplicas":1}}"#.to_string())
                }
            },
            &workload_checks(),
            &settings(20, 0),
            &reporter,
        )
        .await
        .unwrap();

        assert_eq!(outcome.as_sentinel(), "OK");
        assert_eq!(calls, 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(reporter.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_wait_then_match_on_second_attempt() {
        let reporter = RecordingReporter::new();
        let mut calls = 0;
        let started = Instant::now();

        let outcome = poll_until_match(
            || {
                calls += 1;
                let state = if calls < 2 { "pending" } else { "active" };
                async move { Ok(format!(r#"{{"state":"{}"}}"#, state)) }
            },
            &[ExpectedCheck::new("state", "active")],
            &settings(5, 3000),
            &reporter,
        )
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Matched);
        assert_eq!(calls, 2);
        assert_eq!(started.elapsed(), Duration::from_secs(3 + 1 + 10));
        assert_eq!(
            reporter.events()[0],
            ProgressEvent::Info("Waiting for command dispatch".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_checks_match_immediately() {
        let outcome = poll_until_match(
            || async { Ok("{}".to_string()) },
            &[],
            &settings(3, 0),
            &RecordingReporter::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Matched);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_failure_is_not_retried() {
        let mut calls = 0;
        let err = poll_until_match(
            || {
                calls += 1;
                async { Err(DeployError::CommandFailed("boom".to_string())) }
            },
            &workload_checks(),
            &settings(5, 0),
            &RecordingReporter::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(calls, 1);
        assert!(err
            .to_string()
            .starts_with("ERROR: Unexpected error while running retried task"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_json_is_unexpected() {
        let err = poll_until_match(
            || async { Ok("not json".to_string()) },
            &workload_checks(),
            &settings(5, 0),
            &RecordingReporter::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DeployError::UnexpectedPoll(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_still_queries_once() {
        let mut calls = 0;
        let outcome = poll_until_match(
            || {
                calls += 1;
                async { Ok(r#"{"state":"pending"}"#.to_string()) }
            },
            &workload_checks(),
            &settings(0, 0),
            &RecordingReporter::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Exhausted);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_lookup_and_comparison() {
        let observed = serde_json::json!({
            "state": "active",
            "paused": false,
            "statefulSetStatus": {"readyReplicas": 2},
            "containers": [{"image": "api:1"}]
        });

        assert_eq!(lookup(&observed, "containers.0.image"), Some(&Value::from("api:1")));
        assert!(lookup(&observed, "statefulSetStatus.missing").is_none());
        assert!(matches_all(
            &observed,
            &[
                ExpectedCheck::new("statefulSetStatus.readyReplicas", 2),
                ExpectedCheck::new("paused", "false"),
            ]
        ));
        assert!(!matches_all(
            &observed,
            &[ExpectedCheck::new("deploymentStatus.availableReplicas", 1)]
        ));
    }
}
