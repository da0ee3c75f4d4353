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

//! The in-process runtime that a re-exec'd taskpool worker links against: a link-time
//! registry mapping stable string ids to plain `fn` items, an in-band log bridge that
//! frames `tracing` output onto the message stream, and the dispatch entry point a
//! consuming binary calls at the top of its own `main()`.

mod bridge;
mod dispatch;
mod registry;

pub use bridge::BridgeLayer;
pub use dispatch::dispatch_if_worker;
pub use registry::{lookup, WorkerEntry, WorkerFn};

/// Re-exported so the [`worker!`] macro can refer to it as `$crate::inventory`
/// without requiring callers to depend on `inventory` directly.
pub use inventory;
