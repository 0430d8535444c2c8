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

/// Cluster CLI binary
pub const CLUSTER_CLI: &str = "rancher";

/// Cluster CLI sub-commands
pub const CMD_LOGIN: &str = "login";
pub const CMD_INSPECT: &str = "inspect";
pub const CMD_KUBECTL: &str = "kubectl";
pub const CMD_NAMESPACE: &str = "namespace";
pub const CMD_NAMESPACES: &str = "namespaces";

/// Allow-failure pattern for idempotent deletes
pub const NOT_FOUND_PATTERN: &str = "Not found";
pub const ALLOWED_FAILURE_PREFIX: &str = "Allowed failure: ";

/// Template paths
pub const TEMPLATE_DIRECTORY: &str = "templates";
pub const TEMPLATE_DESTINATION_DIRECTORY: &str = "schemas";
pub const INGRESS_TEMPLATE_FILE: &str = "ingress.yaml";
pub const CERTIFICATE_FILE: &str = "cert.yaml";

/// Token replaced by a fresh UUID at every occurrence
pub const RANDOM_ID_TOKEN: &str = "UUID";

/// Poll sentinels
pub const POLL_MATCHED: &str = "OK";
pub const POLL_EXHAUSTED: &str = "NOK";

/// Poll timing
pub const DEFAULT_RETRY_TIMEOUT_SECS: u64 = 10;
pub const STATE_MISMATCH_PAUSE_MS: u64 = 1000;

/// Upgrade patch
pub const FORCE_UPGRADE_ENV: &str = "FORCE_UPGRADE_BY";
pub const SCHEDULING_KEY: &str = "scheduling";
pub const ACTIVE_STATE: &str = "active";

/// Resource type names
pub const TYPE_INGRESS: &str = "ingress";
pub const TYPE_DEPLOYMENT: &str = "deployment";
pub const TYPE_STATEFULSET: &str = "statefulset";
pub const TYPE_NAMESPACE: &str = "namespace";

/// Replica status keys
pub const DEPLOYMENT_REPLICAS_KEY: &str = "deploymentStatus.availableReplicas";
pub const STATEFULSET_REPLICAS_KEY: &str = "statefulSetStatus.readyReplicas";

/// Default check policy timings
pub const INGRESS_MAX_RETRIES: u32 = 20;
pub const INGRESS_INITIAL_WAIT_MS: u64 = 15000;
pub const WORKLOAD_MAX_RETRIES: u32 = 20;
pub const WORKLOAD_INITIAL_WAIT_MS: u64 = 3000;

/// Log redaction
pub const MASKED_VALUE: &str = "********";
pub const TOKEN_FLAGS: [&str; 2] = ["-t", "--token"];

/// Environment variables
pub const LOG_ENV: &str = "STACKPILOT_LOG";
