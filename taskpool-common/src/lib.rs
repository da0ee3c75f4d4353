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

//! Types and wire formats shared between the taskpool host process and the worker
//! processes it spawns.
//!
//! Nothing in this crate talks to an OS process directly; it only knows how to parse
//! and format the bytes that cross the process boundary. That keeps it usable from
//! both `taskpool` (the host) and `taskpool-worker` (the in-child runtime) without
//! either depending on the other.

mod call;
mod duration;
mod error;
mod frame;
mod offset;
mod outcome;
mod worker_id;

pub use call::{CallArgs, CallStyle};
pub use duration::format_duration;
pub use error::ProtocolError;
pub use frame::{ControlKind, Frame, Severity};
pub use offset::Offset;
pub use outcome::{ResultRecord, WorkerOutcome};
pub use worker_id::WorkerId;

/// Environment variable naming the registered worker function the re-executed child
/// should dispatch to.
pub const ENV_WORKER_ID: &str = "TASKPOOL_WORKER_ID";

/// Environment variable carrying the worker's offset.
pub const ENV_WORKER_OFFSET: &str = "TASKPOOL_WORKER_OFFSET";

/// Environment variable carrying the path to the JSON input document (record +
/// shared_data, already shaped per the configured [`CallStyle`]).
pub const ENV_WORKER_INPUT_PATH: &str = "TASKPOOL_WORKER_INPUT_PATH";
