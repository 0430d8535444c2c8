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

use std::sync::Mutex;

/// Receives human-readable progress of a workflow.
pub trait ProgressReporter: Send + Sync {
    fn start(&self, message: &str);

    fn succeed(&self, message: &str);

    fn fail(&self, message: &str);

    fn info(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Start(String),
    Succeed(String),
    Fail(String),
    Info(String),
}

impl ProgressEvent {
    pub fn message(&self) -> &str {
        match self {
            ProgressEvent::Start(m)
            | ProgressEvent::Succeed(m)
            | ProgressEvent::Fail(m)
            | ProgressEvent::Info(m) => m,
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Fail(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events().iter().any(|e| e.message().contains(needle))
    }

    fn push(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressReporter for RecordingReporter {
    fn start(&self, message: &str) {
        self.push(ProgressEvent::Start(message.to_string()));
    }

    fn succeed(&self, message: &str) {
        self.push(ProgressEvent::Succeed(message.to_string()));
    }

    fn fail(&self, message: &str) {
        self.push(ProgressEvent::Fail(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(ProgressEvent::Info(message.to_string()));
    }
}
