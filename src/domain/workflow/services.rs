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

use crate::domain::resource::ResourceDescriptor;
use crate::domain::workflow::context::{ResourceResult, WorkflowContext};
use crate::domain::workflow::fanout::join_all_or_fail;
use crate::domain::workflow::service::upgrade_service;
use crate::shared::error::{DeployError, Result};

/// Pair every service with its image. An empty image list means "keep images".
pub fn pair_services_with_images(
    services: &[String],
    images: &[String],
) -> Result<Vec<(String, Option<String>)>> {
    if services.is_empty() {
        return Err(DeployError::validation(
            "Services list cannot be empty. Ensure to define services as JSON array in command",
        ));
    }

    if !images.is_empty() && images.len() != services.len() {
        return Err(DeployError::validation(
            "Images are defined for service list but the number of images provided doesn't match the number of services to be upgraded",
        ));
    }

    Ok(services
        .iter()
        .enumerate()
        .map(|(i, service)| (service.clone(), images.get(i).cloned()))
        .collect())
}

/// Upgrade several services concurrently. Fails as soon as one branch fails.
pub async fn upgrade_services(
    ctx: &WorkflowContext,
    descriptor: &ResourceDescriptor,
    services: &[String],
    images: &[String],
) -> Result<Vec<ResourceResult>> {
    let pairs = pair_services_with_images(services, images)?;

    let branches: Vec<_> = pairs
        .into_iter()
        .map(|(service, image)| {
            let ctx = ctx.clone();
            let branch = descriptor.for_service(&service, image);
            async move { upgrade_service(&ctx, &branch).await }
        })
        .collect();

    ctx.reporter().info("Tasks starting...");
    let results = join_all_or_fail(branches).await?;
    ctx.reporter().info("Upgrade tasks ended with result:");

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pairing() {
        let pairs = pair_services_with_images(&names(&["a", "b"]), &names(&["x", "y"])).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), Some("x".to_string())),
                ("b".to_string(), Some("y".to_string())),
            ]
        );

        let keep = pair_services_with_images(&names(&["a"]), &[]).unwrap();
        assert_eq!(keep, vec![("a".to_string(), None)]);
    }

    #[test]
    fn test_pairing_rejects_invalid_lists() {
        let empty = pair_services_with_images(&[], &[]).unwrap_err();
        assert!(empty.to_string().contains("Services list cannot be empty"));

        let mismatch = pair_services_with_images(&names(&["a", "b"]), &names(&["x"])).unwrap_err();
        assert!(mismatch
            .to_string()
            .contains("the number of images provided doesn't match"));
    }
}
