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

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use taskpool_common::{Offset, WorkerId, WorkerOutcome};

use crate::collector;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::observer::{NoopObserver, Observer};
use crate::scheduler;

const LOG_TARGET: &str = "taskpool::controller";

/// Fans a registered worker function out across `process_data`, running each record in
/// its own OS process, and collects the ordered results.
///
/// Constructed once per run; `execute` consumes it.
pub struct Controller {
    worker: WorkerId,
    process_data: Vec<Value>,
    shared_data: Value,
    config: ControllerConfig,
    observer: Arc<dyn Observer>,
    cancellation: CancellationToken,
}

impl Controller {
    /// Build a controller for `worker` (the registered function id) over `process_data`.
    pub fn new(worker: impl Into<WorkerId>, process_data: Vec<Value>) -> Self {
        Controller {
            worker: worker.into(),
            process_data,
            shared_data: json!({}),
            config: ControllerConfig::default(),
            observer: Arc::new(NoopObserver),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_shared_data(mut self, shared_data: Value) -> Self {
        self.shared_data = shared_data;
        self
    }

    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Run every input record through the registered worker function to completion.
    ///
    /// On `Ctrl-C` mid-run, terminates every live worker and returns
    /// `Err(ControllerError::Interrupted)`. If `raise_if_error` is set and any worker
    /// outcome is `Err`, fails with `ControllerError::Aggregate` naming every offending
    /// offset instead of returning the (otherwise complete) result vector.
    pub async fn execute(&self, raise_if_error: bool) -> Result<Vec<WorkerOutcome>, ControllerError> {
        let observer = Arc::clone(&self.observer);
        let _final_guard = FinalGuard { observer: &observer };

        // Listen for Ctrl-C in the background for the lifetime of this call, rather
        // than racing it against the scheduler loop in a select: the scheduler's own
        // loop already watches `self.cancellation` and does the actual termination
        // work, so all a signal needs to do is flip that token and let the scheduler
        // notice on its own next iteration.
        let ctrl_c_cancellation = self.cancellation.clone();
        let ctrl_c_listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c_cancellation.cancel();
            }
        });

        let total = self.process_data.len();
        let (result_tx, result_rx) = mpsc::channel(total.max(1));

        let run_result = scheduler::run(
            self.worker.as_str(),
            self.process_data.clone(),
            self.shared_data.clone(),
            &self.config,
            &observer,
            result_tx,
            &self.cancellation,
        )
        .await;

        ctrl_c_listener.abort();
        let report = run_result?;

        tracing::info!(target: LOG_TARGET, workers = report.durations.len(), "scheduler loop complete");

        let outcomes = collector::drain(total, result_rx, &self.config).await;

        let mut offending = Vec::new();
        let mut results = Vec::with_capacity(total);
        for (index, outcome) in outcomes.into_iter().enumerate() {
            let offset = Offset::new(index);
            match outcome {
                Some(outcome) => {
                    if outcome.is_err() {
                        offending.push(offset);
                    }
                    results.push(outcome);
                }
                None => {
                    tracing::warn!(target: LOG_TARGET, %offset, "no result recorded for offset; treating as error");
                    offending.push(offset);
                    results.push(WorkerOutcome::Err(json!("no result recorded")));
                }
            }
        }

        if raise_if_error && !offending.is_empty() {
            return Err(ControllerError::Aggregate { offsets: offending });
        }

        Ok(results)
    }

    /// Best-effort termination of every currently-live worker.
    ///
    /// Safe to call from another task while `execute` is in flight (e.g. a signal
    /// handler or a UI extension wired to its own shutdown control) — it only flips the
    /// shared cancellation token; the scheduler loop running inside `execute` observes
    /// it and does the actual `SIGTERM`/`SIGKILL` work.
    pub fn terminate_processes(&self) {
        tracing::warn!(target: LOG_TARGET, "terminating live workers");
        self.cancellation.cancel();
    }
}

/// Runs `observer.on_final()` unconditionally when `execute` returns, success, error,
/// or panic — the moment for a UI extension to restore terminal state.
struct FinalGuard<'a> {
    observer: &'a Arc<dyn Observer>,
}

impl Drop for FinalGuard<'_> {
    fn drop(&mut self) {
        self.observer.on_final();
    }
}
