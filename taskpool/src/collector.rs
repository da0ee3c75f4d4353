// Copyright (c) 2026 the taskpool authors
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

use tokio::sync::mpsc;
use tokio::time::timeout;

use taskpool_common::{Offset, ResultRecord, WorkerOutcome};

use crate::config::ControllerConfig;

const LOG_TARGET: &str = "taskpool::collector";

/// Drain the result stream into an offset-indexed, input-ordered vector.
///
/// Reads until the channel idles for longer than `config.timeout` or is closed by its
/// senders. Offsets whose worker never wrote a result (purged from pending before
/// launch, or killed before it could report) are left `None`.
pub async fn drain(
    total: usize,
    mut result_rx: mpsc::Receiver<ResultRecord>,
    config: &ControllerConfig,
) -> Vec<Option<WorkerOutcome>> {
    let mut results: Vec<Option<WorkerOutcome>> = vec![None; total];

    loop {
        match timeout(config.timeout, result_rx.recv()).await {
            Ok(Some(ResultRecord { offset, outcome })) => {
                set_at(&mut results, offset, outcome);
            }
            Ok(None) => {
                tracing::debug!(target: LOG_TARGET, "result stream closed");
                break;
            }
            Err(_elapsed) => {
                tracing::debug!(target: LOG_TARGET, "result drain idle timeout elapsed");
                break;
            }
        }
    }

    results
}

fn set_at(results: &mut [Option<WorkerOutcome>], offset: Offset, outcome: WorkerOutcome) {
    let index = offset.as_usize();
    if let Some(slot) = results.get_mut(index) {
        *slot = Some(outcome);
    } else {
        tracing::warn!(target: LOG_TARGET, %offset, "result for out-of-range offset discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn reindexes_out_of_order_results_by_offset() {
        let (tx, rx) = mpsc::channel(8);
        let config = ControllerConfig { timeout: std::time::Duration::from_millis(50), ..Default::default() };

        tx.send(ResultRecord { offset: Offset::new(2), outcome: WorkerOutcome::Ok(json!("c")) })
            .await
            .unwrap();
        tx.send(ResultRecord { offset: Offset::new(0), outcome: WorkerOutcome::Ok(json!("a")) })
            .await
            .unwrap();
        tx.send(ResultRecord { offset: Offset::new(1), outcome: WorkerOutcome::Err(json!("boom")) })
            .await
            .unwrap();
        drop(tx);

        let results = drain(3, rx, &config).await;
        assert_eq!(results[0], Some(WorkerOutcome::Ok(json!("a"))));
        assert_eq!(results[1], Some(WorkerOutcome::Err(json!("boom"))));
        assert_eq!(results[2], Some(WorkerOutcome::Ok(json!("c"))));
    }

    #[tokio::test]
    async fn missing_offsets_stay_none_after_idle_timeout() {
        let (tx, rx) = mpsc::channel(8);
        let config = ControllerConfig { timeout: std::time::Duration::from_millis(20), ..Default::default() };

        tx.send(ResultRecord { offset: Offset::new(0), outcome: WorkerOutcome::Ok(json!(1)) })
            .await
            .unwrap();

        let results = drain(2, rx, &config).await;
        assert_eq!(results[0], Some(WorkerOutcome::Ok(json!(1))));
        assert_eq!(results[1], None);
    }
}
