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

use std::path::PathBuf;
use std::time::Duration;

pub use taskpool_common::CallStyle;

/// Default grace period used for both join-after-`DONE` and result-drain idle
/// timeouts, matching the original's `TIMEOUT = 3` constant.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Tunables for a [`crate::Controller`] run.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Upper bound on concurrently-alive worker processes. `None` means "one worker
    /// per input record" (i.e. `processes_to_start = len(process_data)`), matching the
    /// original's default.
    pub processes_to_start: Option<usize>,

    /// Join-after-`DONE` grace period and result-drain idle timeout.
    pub timeout: Duration,

    /// Which calling convention the registered worker function expects.
    pub call_style: CallStyle,

    /// Override the binary re-executed to run each worker. `None` means
    /// `std::env::current_exe()` — the normal case for a real application, where the
    /// worker function was registered in the same binary that constructs the
    /// `Controller`. Tests point this at a small fixture binary instead.
    pub worker_binary: Option<PathBuf>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            processes_to_start: None,
            timeout: DEFAULT_TIMEOUT,
            call_style: CallStyle::default(),
            worker_binary: None,
        }
    }
}
