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

//! Resource orchestration workflows

pub mod context;
pub mod exec;
pub mod fanout;
pub mod ingress;
pub mod namespace;
pub mod service;
pub mod services;
pub mod stack;
pub mod steps;

pub use self::context::{ResourceResult, WorkflowContext};
pub use self::exec::{exec_in_service, ExecResult};
pub use self::fanout::join_all_or_fail;
pub use self::ingress::{deploy_ingress, remove_ingress};
pub use self::namespace::{ensure_namespace, remove_namespace};
pub use self::service::upgrade_service;
pub use self::services::{pair_services_with_images, upgrade_services};
pub use self::stack::{check_stack, copy_certificate, deploy_stack, StackDeployment};
pub use self::steps::{run_step, StepValue};
