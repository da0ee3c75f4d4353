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

use std::collections::HashMap;
use std::time::Duration;

use taskpool_common::Offset;

use crate::worker_record::WorkerRecord;

const LOG_TARGET: &str = "taskpool::terminate";

/// Grace period between `SIGTERM` and the `SIGKILL` fallback.
const KILL_GRACE: Duration = Duration::from_millis(500);

/// Send every live worker `SIGTERM`, give it `KILL_GRACE` to exit, then `SIGKILL` any
/// that are still alive.
///
/// Best-effort: a process that already exited between the liveness check and the
/// signal send is not an error.
pub async fn terminate_all(active: &mut HashMap<Offset, WorkerRecord>) {
    for (offset, record) in active.iter_mut() {
        if let Some(pid) = record.pid() {
            signal_term(*offset, pid);
        }
    }

    tokio::time::sleep(KILL_GRACE).await;

    for (offset, record) in active.iter_mut() {
        match tokio::time::timeout(Duration::from_millis(1), record.child.wait()).await {
            Ok(_) => {}
            Err(_still_running) => {
                if let Some(pid) = record.pid() {
                    signal_kill(*offset, pid);
                }
                let _ = record.child.kill().await;
            }
        }
    }
}

#[cfg(unix)]
fn signal_term(offset: Offset, pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    tracing::debug!(target: LOG_TARGET, %offset, pid, "sending SIGTERM");
    if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        tracing::debug!(target: LOG_TARGET, %offset, pid, %err, "SIGTERM failed (process likely already gone)");
    }
}

#[cfg(unix)]
fn signal_kill(offset: Offset, pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    tracing::warn!(target: LOG_TARGET, %offset, pid, "sending SIGKILL after grace period elapsed");
    if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        tracing::debug!(target: LOG_TARGET, %offset, pid, %err, "SIGKILL failed (process likely already gone)");
    }
}

#[cfg(not(unix))]
fn signal_term(_offset: Offset, _pid: u32) {}

#[cfg(not(unix))]
fn signal_kill(_offset: Offset, _pid: u32) {}
