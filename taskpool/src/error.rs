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

use taskpool_common::{Offset, ProtocolError};

/// Everything that can go wrong spawning one worker process.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to resolve current executable: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("failed to write worker input file: {0}")]
    WriteInput(#[source] std::io::Error),
    #[error("failed to spawn worker process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to capture stdio of worker process")]
    MissingStdio,
}

/// The single fallible surface of [`crate::Controller::execute`].
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// A worker process could not even be started.
    #[error("failed to launch worker: {0}")]
    Launch(#[from] LaunchError),

    /// Something arrived on the message stream that doesn't parse as a frame — a
    /// contract violation of the log bridge, not a recoverable condition.
    #[error("protocol violation on message stream: {0}")]
    Protocol(#[from] ProtocolError),

    /// The run was cancelled (e.g. Ctrl-C) before every worker completed. Live
    /// workers have already been terminated by the time this is returned.
    #[error("execution was interrupted; live workers were terminated")]
    Interrupted,

    /// `raise_if_error` was set and at least one worker's result was an error value.
    #[error("worker(s) at offset(s) {offsets:?} returned an error result")]
    Aggregate { offsets: Vec<Offset> },
}
