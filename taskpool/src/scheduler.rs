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

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use taskpool_common::{ControlKind, Frame, Offset, ProtocolError};

use crate::config::ControllerConfig;
use crate::error::{ControllerError, LaunchError};
use crate::launcher::{self, MessageItem};
use crate::observer::Observer;
use crate::terminate;
use crate::worker_record::WorkerRecord;

const LOG_TARGET: &str = "taskpool::scheduler";

/// Outcome of running the scheduler loop to completion.
pub struct SchedulerReport {
    /// Per-offset duration, for workers that completed normally. Offsets whose worker
    /// was never launched (purged from pending after an `ERROR`) are absent.
    pub durations: HashMap<Offset, std::time::Duration>,
}

/// Drive the pending queue / active set / message dispatch to completion.
///
/// Launches at most `processes_to_start` workers concurrently, replenishing from
/// `pending` as each completes, until both are empty. Returns once every launched
/// worker has emitted `DONE` and been joined, or once cancelled.
pub async fn run(
    worker_id: &str,
    process_data: Vec<Value>,
    shared_data: Value,
    config: &ControllerConfig,
    observer: &Arc<dyn Observer>,
    result_tx: mpsc::Sender<taskpool_common::ResultRecord>,
    cancellation: &CancellationToken,
) -> Result<SchedulerReport, ControllerError> {
    let total = process_data.len();
    let concurrency = effective_concurrency(total, config.processes_to_start);

    let mut pending: VecDeque<(Offset, Value)> = process_data
        .into_iter()
        .enumerate()
        .map(|(i, record)| (Offset::new(i), record))
        .collect();

    let mut active: HashMap<Offset, WorkerRecord> = HashMap::new();
    let mut durations = HashMap::new();
    let mut purged = false;

    let (message_tx, mut message_rx) = mpsc::channel::<MessageItem>(256);

    for _ in 0..concurrency.min(pending.len()) {
        if let Err(err) = launch_next(
            worker_id,
            &mut pending,
            &mut active,
            shared_data.clone(),
            config,
            observer,
            &message_tx,
            &result_tx,
        )
        .await
        {
            terminate::terminate_all(&mut active).await;
            return Err(err.into());
        }
    }

    loop {
        if pending.is_empty() && active.is_empty() {
            break;
        }

        tokio::select! {
            biased;

            _ = cancellation.cancelled() => {
                tracing::warn!(target: LOG_TARGET, active = active.len(), "cancellation requested; terminating live workers");
                terminate::terminate_all(&mut active).await;
                return Err(ControllerError::Interrupted);
            }

            message = message_rx.recv() => {
                match message {
                    None => {
                        // All senders dropped (every worker's stdout forwarder exited).
                        // Nothing further can arrive; stop waiting on the channel but
                        // keep looping so the termination check above can fire once
                        // `active` drains via other means.
                        if active.is_empty() {
                            break;
                        }
                        continue;
                    }
                    Some(Err(ProtocolError::BadFrame { raw, reason })) => {
                        tracing::error!(target: LOG_TARGET, %raw, reason, "malformed frame on message stream; terminating live workers");
                        terminate::terminate_all(&mut active).await;
                        return Err(ControllerError::Protocol(ProtocolError::BadFrame { raw, reason }));
                    }
                    Some(Ok(Frame::Control { offset, kind: ControlKind::Done })) => {
                        if let Some(mut record) = active.remove(&offset) {
                            let duration = record.mark_stopped();
                            let _ = tokio::time::timeout(config.timeout, record.child.wait()).await;
                            durations.insert(offset, duration);
                            observer.on_complete_process(offset, duration);
                            tracing::debug!(target: LOG_TARGET, %offset, ?duration, "worker complete");
                        }
                        if !purged && !pending.is_empty() {
                            if let Err(err) = launch_next(
                                worker_id,
                                &mut pending,
                                &mut active,
                                shared_data.clone(),
                                config,
                                observer,
                                &message_tx,
                                &result_tx,
                            )
                            .await
                            {
                                terminate::terminate_all(&mut active).await;
                                return Err(err.into());
                            }
                        }
                        if pending.is_empty() && active.is_empty() {
                            break;
                        }
                    }
                    Some(Ok(Frame::Control { offset, kind: ControlKind::Error })) => {
                        tracing::warn!(target: LOG_TARGET, %offset, "worker reported an error; purging pending queue");
                        purged = true;
                        pending.clear();
                    }
                    Some(Ok(Frame::Payload { offset, body })) => {
                        observer.process_message(offset, &body);
                    }
                }
            }
        }
    }

    drop(message_rx);
    Ok(SchedulerReport { durations })
}

/// Clamp the requested concurrency cap to `[1, total]`, treating `None` (and `0`, which
/// would otherwise deadlock the scheduler before it starts) as "one worker per record".
fn effective_concurrency(total: usize, requested: Option<usize>) -> usize {
    match requested {
        None | Some(0) => total.max(1),
        Some(k) => k.min(total.max(1)),
    }
}

async fn launch_next(
    worker_id: &str,
    pending: &mut VecDeque<(Offset, Value)>,
    active: &mut HashMap<Offset, WorkerRecord>,
    shared_data: Value,
    config: &ControllerConfig,
    observer: &Arc<dyn Observer>,
    message_tx: &mpsc::Sender<MessageItem>,
    result_tx: &mpsc::Sender<taskpool_common::ResultRecord>,
) -> Result<(), LaunchError> {
    let Some((offset, record)) = pending.pop_front() else {
        return Ok(());
    };

    let (child, input_file) = launcher::spawn_worker(
        offset,
        record,
        shared_data,
        config.call_style,
        worker_id,
        config.worker_binary.as_ref(),
        message_tx.clone(),
        result_tx.clone(),
    )
    .await?;

    tracing::debug!(target: LOG_TARGET, %offset, pid = child.id(), "worker launched");
    observer.on_start_process(offset);
    active.insert(offset, WorkerRecord::new(child, input_file));
    Ok(())
}
