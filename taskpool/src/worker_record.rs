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

use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tokio::process::Child;

/// Per-offset metadata the controller keeps for the lifetime of one worker.
///
/// Retained after completion (moved out of the active set, not dropped) so the
/// controller can report per-worker timing once the whole run is done.
pub struct WorkerRecord {
    pub child: Child,
    pub start_time: Instant,
    pub stop_time: Option<Instant>,
    /// Keeps the worker's JSON input file on disk until the worker no longer needs it.
    /// Dropping (and thus deleting) this before the child process has opened the file
    /// would race a slow-to-start worker against its own input.
    _input_file: NamedTempFile,
}

impl WorkerRecord {
    pub fn new(child: Child, input_file: NamedTempFile) -> Self {
        WorkerRecord { child, start_time: Instant::now(), stop_time: None, _input_file: input_file }
    }

    /// Mark this worker complete "now", and return its duration.
    pub fn mark_stopped(&mut self) -> Duration {
        let stop_time = Instant::now();
        self.stop_time = Some(stop_time);
        stop_time.saturating_duration_since(self.start_time)
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}
