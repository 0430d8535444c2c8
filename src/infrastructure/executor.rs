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

use crate::infrastructure::constants::{ALLOWED_FAILURE_PREFIX, CLUSTER_CLI, MASKED_VALUE, TOKEN_FLAGS};
use crate::shared::error::{DeployError, Result};
use regex::RegexBuilder;
use std::io::ErrorKind;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs a sub-command of the cluster CLI and captures its stdout.
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// A non-zero exit whose stderr matches `allow_failure_pattern`
    /// (case-insensitive) resolves to `"Allowed failure: <pattern>"`.
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        allow_failure_pattern: Option<&str>,
    ) -> Result<String>;
}

/// Turn a failed invocation into either an allowed failure or `CommandFailed`.
pub fn resolve_failure(detail: &str, stderr: &str, allow_failure_pattern: Option<&str>) -> Result<String> {
    if let Some(pattern) = allow_failure_pattern.filter(|p| !p.is_empty()) {
        let matcher = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .or_else(|_| {
                RegexBuilder::new(&regex::escape(pattern))
                    .case_insensitive(true)
                    .build()
            });

        if let Ok(matcher) = matcher {
            if matcher.is_match(stderr) {
                return Ok(format!("{}{}", ALLOWED_FAILURE_PREFIX, pattern));
            }
        }
    }

    Err(DeployError::CommandFailed(
        format!("{} {}", detail, stderr.trim()).trim().to_string(),
    ))
}

/// Join arguments for logging, masking the value that follows a token flag.
pub fn redact_args(args: &[String]) -> String {
    let mut masked = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            masked.push(MASKED_VALUE);
            hide_next = false;
        } else {
            hide_next = TOKEN_FLAGS.contains(&arg.as_str());
            masked.push(arg.as_str());
        }
    }
    masked.join(" ")
}

pub struct ShellExecutor {
    program: String,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::with_program(CLUSTER_CLI)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        allow_failure_pattern: Option<&str>,
    ) -> Result<String> {
        if command.is_empty() {
            return Err(DeployError::validation("Command cannot be empty"));
        }

        info!("Executing {} {}", self.program, command);
        debug!("Arguments: {}", redact_args(args));

        let output = Command::new(&self.program)
            .arg(command)
            .args(args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DeployError::CommandNotFound(self.program.clone()),
                _ => DeployError::Io(e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("{} {} failed: {}", self.program, command, stderr.trim());

        resolve_failure(&output.status.to_string(), &stderr, allow_failure_pattern)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    type Handler = Box<dyn Fn(&str) -> std::result::Result<String, String> + Send + Sync>;

    /// Answers from a handler keyed on the joined command line and records every call.
    pub struct ScriptedExecutor {
        handler: Handler,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedExecutor {
        pub fn new<F>(handler: F) -> Self
        where
            F: Fn(&str) -> std::result::Result<String, String> + Send + Sync + 'static,
        {
            Self {
                handler: Box::new(handler),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl CommandExecutor for ScriptedExecutor {
        async fn execute(
            &self,
            command: &str,
            args: &[String],
            allow_failure_pattern: Option<&str>,
        ) -> Result<String> {
            let line = std::iter::once(command.to_string())
                .chain(args.iter().cloned())
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.lock().unwrap().push(line.clone());

            match (self.handler)(&line) {
                Ok(out) => Ok(out),
                Err(stderr) => resolve_failure("exit status: 1", &stderr, allow_failure_pattern),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_failure_is_case_insensitive() {
        let result = resolve_failure("exit status: 1", "Error: NOT FOUND namespace x", Some("Not found"));
        assert_eq!(result.unwrap(), "Allowed failure: Not found");
    }

    #[test]
    fn test_unmatched_failure_keeps_stderr() {
        let err = resolve_failure("exit status: 1", "forbidden\n", Some("Not found")).unwrap_err();
        assert_eq!(err.to_string(), "Exec err exit status: 1 forbidden");
    }

    #[test]
    fn test_invalid_pattern_matches_literally() {
        let result = resolve_failure("exit status: 1", "missing (x", Some("(x"));
        assert_eq!(result.unwrap(), "Allowed failure: (x");
    }

    #[test]
    fn test_redact_args_masks_token() {
        let args: Vec<String> = ["--context", "c-1:p-1", "-t", "key:TOPSECRET", "https://rancher.local"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            redact_args(&args),
            "--context c-1:p-1 -t ******** https://rancher.local"
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let executor = ShellExecutor::with_program("stackpilot-definitely-missing-binary");
        let err = executor.execute("login", &[], None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Command \"stackpilot-definitely-missing-binary\" not found"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_captures_stdout_and_stderr() {
        let executor = ShellExecutor::with_program("sh");

        let out = executor
            .execute("-c", &["echo hello".to_string()], None)
            .await
            .unwrap();
        assert_eq!(out.trim(), "hello");

        let allowed = executor
            .execute("-c", &["echo 'Not Found: ns' >&2; exit 1".to_string()], Some("not found"))
            .await
            .unwrap();
        assert_eq!(allowed, "Allowed failure: not found");

        let err = executor
            .execute("-c", &["echo boom >&2; exit 3".to_string()], None)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::CommandFailed(ref msg) if msg.contains("boom")));
    }
}
