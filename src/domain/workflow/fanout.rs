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

use crate::shared::error::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// Run every branch on its own task and collect the results in input order.
///
/// The first branch to fail fails the whole group. Branches still running at
/// that point are detached, not aborted, and their results are discarded.
pub async fn join_all_or_fail<T, Fut>(branches: Vec<Fut>) -> Result<Vec<T>>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let total = branches.len();
    let mut pending: FuturesUnordered<_> = branches
        .into_iter()
        .enumerate()
        .map(|(index, branch)| {
            let handle = tokio::spawn(branch);
            async move { (index, handle.await) }
        })
        .collect();

    let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
    while let Some((index, joined)) = pending.next().await {
        results[index] = Some(joined??);
    }

    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::DeployError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, Instant};

    #[tokio::test(start_paused = true)]
    async fn test_results_keep_input_order() {
        let branches: Vec<_> = [3u64, 1, 2]
            .into_iter()
            .map(|secs| async move {
                sleep(Duration::from_secs(secs)).await;
                Ok(secs)
            })
            .collect();

        let started = Instant::now();
        assert_eq!(join_all_or_fail(branches).await.unwrap(), vec![3, 1, 2]);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_error_wins_and_siblings_keep_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let slow_flag = finished.clone();

        let slow = Box::pin(async move {
            sleep(Duration::from_secs(100)).await;
            slow_flag.store(true, Ordering::SeqCst);
            Ok::<_, DeployError>("slow".to_string())
        }) as std::pin::Pin<Box<dyn Future<Output = Result<String>> + Send>>;
        let failing = Box::pin(async {
            sleep(Duration::from_secs(1)).await;
            Err(DeployError::CommandFailed("boom".to_string()))
        }) as std::pin::Pin<Box<dyn Future<Output = Result<String>> + Send>>;

        let started = Instant::now();
        let err = join_all_or_fail(vec![slow, failing]).await.unwrap_err();
        assert_eq!(err.to_string(), "Exec err boom");
        assert_eq!(started.elapsed(), Duration::from_secs(1));

        sleep(Duration::from_secs(200)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_branch_is_a_task_failure() {
        let branches = vec![async {
            if true {
                panic!("branch exploded");
            }
            Ok(1u32)
        }];

        let err = join_all_or_fail(branches).await.unwrap_err();
        assert!(matches!(err, DeployError::TaskFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_group() {
        let branches: Vec<std::future::Ready<Result<u8>>> = Vec::new();
        assert!(join_all_or_fail(branches).await.unwrap().is_empty());
    }
}
