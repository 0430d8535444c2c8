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

pub mod descriptor;
pub mod manifest;
pub mod upgrade;

pub use self::descriptor::{IngressDescriptor, ResourceDescriptor, ResourceType};
pub use self::manifest::{scan_deployable_items, StackItem};
pub use self::upgrade::{
    check_state_before_upgrade, force_upgrade_patch, parse_name_list, upgrade_payload,
};
